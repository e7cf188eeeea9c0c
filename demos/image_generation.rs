//! Native image generation: text and image parts, images saved to the output directory.

use gemini_samples::driver::{Driver, Options, Prompt};
use gemini_samples::v1beta::ResponseModality;
use tracing::info;

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_IMAGE_MODEL", "gemini-2.0-flash-exp-image-generation");

    let contents = "Hi, can you create a 3d rendered image of a pig with wings and a top hat \
                    flying over a happy futuristic scifi city with lots of greenery?";

    let generated = driver
        .generate_to_files(
            &model,
            Prompt::new(contents),
            Options::new().with_modalities([ResponseModality::Text, ResponseModality::Image]),
            "gemini-native-image",
        )
        .await?;

    info!(summary = ?generated.summary, "generation finished");
    utils::print_collected(&generated.collector);
    Ok(())
}
