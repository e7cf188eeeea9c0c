//! Text answer grounded with Google Search, with the sources it cites.

use gemini_samples::driver::{Driver, Grounding, Options, Prompt};
use gemini_samples::v1beta::ResponseModality;

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_MODEL", "gemini-2.0-flash");

    let generated = driver
        .generate_to_files(
            &model,
            Prompt::new("When is the next total solar eclipse in the United States?"),
            Options::new()
                .with_grounding(Grounding::Search)
                .with_modalities([ResponseModality::Text]),
            "grounding",
        )
        .await?;

    utils::print_collected(&generated.collector);
    if let Some(entry) = generated
        .collector
        .grounding
        .as_ref()
        .and_then(|g| g.search_entry_point.as_ref())
        .and_then(|e| e.rendered_content.as_ref())
    {
        println!("search entry point: {} bytes of html", entry.len());
    }
    Ok(())
}
