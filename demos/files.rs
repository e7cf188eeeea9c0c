//! Files API: upload a local file, wait for it to be processed, prompt with it, then delete it.

use gemini_samples::dispatch;
use gemini_samples::driver::Driver;
use gemini_samples::v1beta::files::FileState;
use gemini_samples::v1beta::request::Request;
use gemini_samples::v1beta::{Content, Part, PartData, Role};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[path = "common/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let client = driver.client(&utils::model("GEMINI_MODEL", "gemini-2.0-flash"));
    let path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "poem.txt".to_string()),
    );

    let bytes = tokio::fs::read(&path).await?;
    let name = path.file_stem().and_then(|s| s.to_str());
    let mut file = client
        .upload_file(bytes, dispatch::mime_for_path(&path), name)
        .await?;

    while file.state == FileState::Processing {
        info!(file = %file.name, "waiting for processing");
        tokio::time::sleep(Duration::from_secs(5)).await;
        file = client.get_file(&file.name).await?;
    }
    let part = file
        .file_data()
        .filter(|_| file.is_active())
        .ok_or_else(|| format!("{} is not usable ({:?})", file.name, file.state))?;

    let response = client
        .generate_content(Request::new(vec![Content::new(
            Role::User,
            vec![
                Part::new(PartData::FileData(part)),
                Part::text("Describe the contents of this file."),
            ],
        )]))
        .await?;
    println!("{}", response.text().unwrap_or_default());

    let page = client.list_files(Some(10), None).await?;
    for listed in &page.files {
        println!("{} {:?}", listed.name, listed.state);
    }

    client.delete_file(&file.name).await?;
    info!(file = %file.name, "deleted");
    Ok(())
}
