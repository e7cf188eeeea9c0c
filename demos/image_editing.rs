//! Image editing: a local image plus an instruction, the edited image saved back to disk.

use gemini_samples::driver::{Driver, Options, Prompt};
use gemini_samples::v1beta::ResponseModality;
use gemini_samples::v1beta::request::GenerationConfig;

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_IMAGE_MODEL", "gemini-2.0-flash-exp-image-generation");
    let image = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test_image.jpg".to_string());

    let prompt = Prompt::new(
        "Hi, This is a picture of me. Can you add a llama next to me?",
    )
    .with_image_file_or_placeholder(&image)
    .await?;

    let generated = driver
        .generate_to_files(
            &model,
            prompt,
            Options::new()
                .with_modalities([ResponseModality::Text, ResponseModality::Image])
                .with_generation(GenerationConfig::new().with_temperature(1.0)),
            "edited-image",
        )
        .await?;

    utils::print_collected(&generated.collector);
    Ok(())
}
