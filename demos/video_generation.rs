//! Text-to-video with Veo, or image-to-video when an image path is given.

use gemini_samples::dispatch;
use gemini_samples::driver::Driver;
use gemini_samples::v1beta::video::{
    GenerateVideosConfig, GenerateVideosRequest, Image, PersonGeneration,
};

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_VIDEO_MODEL", "veo-2.0-generate-001");

    let mut request = GenerateVideosRequest::new(
        "Panning wide shot of a calico kitten sleeping in the sunshine",
    );
    let mut config = GenerateVideosConfig::new()
        .with_aspect_ratio("16:9")
        .with_number_of_videos(2u32);

    match std::env::args().nth(1) {
        Some(path) => {
            let bytes = tokio::fs::read(&path).await?;
            let mime_type = dispatch::mime_for_path(std::path::Path::new(&path));
            request = request.with_image(Image::new(bytes, mime_type));
        }
        None => {
            config = config.with_person_generation(PersonGeneration::DontAllow);
        }
    }

    let saved = driver
        .generate_videos(&model, request.with_config(config))
        .await?;
    for path in saved {
        println!("saved {}", path.display());
    }
    Ok(())
}
