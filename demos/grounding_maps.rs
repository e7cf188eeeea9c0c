//! Place recommendations grounded with Google Maps around a fixed location.

use gemini_samples::driver::{Driver, Grounding, Options, Prompt};
use gemini_samples::v1beta::request::LatLng;

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_MODEL", "gemini-2.5-flash");

    // Los Angeles
    let here = LatLng::new(34.050481, -118.248526);

    let generated = driver
        .generate_to_files(
            &model,
            Prompt::new("What are the best Italian restaurants within a 15-minute walk from here?"),
            Options::new().with_grounding(Grounding::Maps(here)),
            "grounding-maps",
        )
        .await?;

    utils::print_collected(&generated.collector);
    Ok(())
}
