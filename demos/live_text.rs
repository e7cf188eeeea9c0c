//! One text turn over the Live API, printed as it streams in.

use gemini_samples::driver::Driver;
use gemini_samples::v1beta::live::Error;
use gemini_samples::v1beta::session::TurnHandler;
use gemini_samples::v1beta::ResponseModality;
use std::io::Write;

#[path = "common/utils.rs"]
mod utils;

struct Printer;

impl TurnHandler for Printer {
    fn on_text(&mut self, text: &str) -> Result<(), Error> {
        print!("{text}");
        std::io::stdout()
            .flush()
            .map_err(|e| Error::Handler(Box::new(e)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_LIVE_MODEL", "gemini-2.0-flash-exp");
    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello? Gemini are you there?".to_string());

    let summary = driver
        .live_turn(&model, vec![ResponseModality::Text], &message, &mut Printer)
        .await?;
    println!();

    if let Some(usage) = summary.usage {
        println!("tokens: {:?}", usage.total_token_count);
    }
    Ok(())
}
