//! Routing of response parts to a handler.
//!
//! [`dispatch`] walks [`Response::parts`] in order and hands each
//! [`ResponsePart`] to a [`PartHandler`]. [`Collector`] is the usual handler:
//! it keeps the text, writes media through a [`MediaStore`] and remembers the
//! grounding metadata.

use crate::v1beta::InlineData;
use crate::v1beta::response::{GroundingMetadata, Response, ResponsePart};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PartHandler: Send {
    async fn on_text(&mut self, text: &str) -> Result<(), Error>;

    async fn on_media(&mut self, media: &InlineData) -> Result<(), Error>;

    async fn on_grounding(&mut self, _grounding: &GroundingMetadata) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub texts: usize,
    pub media: usize,
    pub grounded: bool,
}

pub async fn dispatch<H: PartHandler + ?Sized>(
    response: &Response,
    handler: &mut H,
) -> Result<DispatchSummary, Error> {
    let mut summary = DispatchSummary::default();

    for part in response.parts() {
        match part {
            ResponsePart::Text(text) => {
                summary.texts += 1;
                handler.on_text(text).await?;
            }
            ResponsePart::Media(media) => {
                summary.media += 1;
                handler.on_media(media).await?;
            }
            ResponsePart::Grounding(grounding) => {
                summary.grounded = true;
                handler.on_grounding(grounding).await?;
            }
        }
    }

    debug!(?summary, "dispatched response");
    Ok(summary)
}

/// File extension for a MIME type, ignoring parameters such as `;rate=24000`.
///
/// Prefers the extension spelled like the subtype (`image/jpeg` gives `jpeg`).
/// Unknown types give `bin`.
pub fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let subtype = essence.rsplit('/').next().unwrap_or_default();

    match mime_guess::get_mime_extensions_str(&essence) {
        Some(extensions) => extensions
            .iter()
            .find(|ext| **ext == subtype)
            .or_else(|| extensions.first())
            .copied()
            .unwrap_or("bin"),
        None => "bin",
    }
}

/// MIME type for a local media file, guessed from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Writes media files named after a stem into one directory.
///
/// The first file is `{stem}.{ext}`, later ones `{stem}-{n}.{ext}`. The
/// directory is created on first write.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    stem: String,
    written: usize,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self, extension: &str) -> PathBuf {
        let name = match self.written {
            0 => format!("{}.{extension}", self.stem),
            n => format!("{}-{n}.{extension}", self.stem),
        };
        self.dir.join(name)
    }

    pub async fn save(&mut self, bytes: &[u8], mime_type: &str) -> Result<PathBuf, Error> {
        let path = self.next_path(extension_for(mime_type));
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        self.written += 1;
        info!(path = %path.display(), bytes = bytes.len(), "saved media");
        Ok(path)
    }
}

/// Keeps text in order, persists media, remembers grounding.
#[derive(Debug)]
pub struct Collector {
    pub texts: Vec<String>,
    pub saved: Vec<PathBuf>,
    pub grounding: Option<GroundingMetadata>,
    store: MediaStore,
}

impl Collector {
    pub fn new(store: MediaStore) -> Self {
        Self {
            texts: Vec::new(),
            saved: Vec::new(),
            grounding: None,
            store,
        }
    }

    pub fn text(&self) -> String {
        self.texts.concat()
    }
}

#[async_trait]
impl PartHandler for Collector {
    async fn on_text(&mut self, text: &str) -> Result<(), Error> {
        self.texts.push(text.to_string());
        Ok(())
    }

    async fn on_media(&mut self, media: &InlineData) -> Result<(), Error> {
        let path = self.store.save(media.data(), media.mime_type()).await?;
        self.saved.push(path);
        Ok(())
    }

    async fn on_grounding(&mut self, grounding: &GroundingMetadata) -> Result<(), Error> {
        self.grounding = Some(grounding.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: serde_json::Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn text_only_response_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let response = response(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "first"}, {"text": "second"}, {"text": "third"}
            ]}}]
        }));

        let mut collector = Collector::new(MediaStore::new(&out, "penguin"));
        let summary = dispatch(&response, &mut collector).await.unwrap();

        assert_eq!(collector.texts, ["first", "second", "third"]);
        assert_eq!(summary.media, 0);
        assert!(collector.saved.is_empty());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn inline_image_becomes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let response = response(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here is your penguin"},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw=="}}
            ]}}]
        }));

        let mut collector = Collector::new(MediaStore::new(&out, "penguin"));
        dispatch(&response, &mut collector).await.unwrap();

        assert_eq!(collector.saved, [out.join("penguin.png")]);
        let files: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(
            std::fs::read(out.join("penguin.png")).unwrap(),
            [0x89, 0x50, 0x4E, 0x47]
        );
    }

    #[tokio::test]
    async fn grounding_follows_parts() {
        let response = response(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Next eclipse: 2044"}]},
                "groundingMetadata": {
                    "webSearchQueries": ["next total solar eclipse us"],
                    "searchEntryPoint": {"renderedContent": "<div/>"}
                }
            }]
        }));

        let kinds: Vec<&str> = response
            .parts()
            .map(|p| match p {
                ResponsePart::Text(_) => "text",
                ResponsePart::Media(_) => "media",
                ResponsePart::Grounding(_) => "grounding",
            })
            .collect();
        assert_eq!(kinds, ["text", "grounding"]);

        let dir = tempfile::tempdir().unwrap();
        let mut collector = Collector::new(MediaStore::new(dir.path(), "unused"));
        let summary = dispatch(&response, &mut collector).await.unwrap();
        assert!(summary.grounded);
        let grounding = collector.grounding.unwrap();
        assert_eq!(grounding.web_search_queries, ["next total solar eclipse us"]);
    }

    #[tokio::test]
    async fn later_files_get_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MediaStore::new(dir.path(), "video");
        let first = store.save(b"a", "video/mp4").await.unwrap();
        let second = store.save(b"b", "video/mp4").await.unwrap();
        assert_eq!(first.file_name().unwrap(), "video.mp4");
        assert_eq!(second.file_name().unwrap(), "video-1.mp4");
    }

    #[test]
    fn extensions_ignore_parameters() {
        assert_eq!(extension_for("image/webp; q=1"), "webp");
        assert_eq!(extension_for("IMAGE/JPEG"), "jpeg");
        assert_eq!(extension_for("video/mp4"), "mp4");
        assert_eq!(extension_for("application/x-unknown-kind"), "bin");
    }

    #[test]
    fn input_images_are_typed_from_their_extension() {
        assert_eq!(mime_for_path(Path::new("test_image.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("photo.heif")), "image/heif");
        assert_eq!(mime_for_path(Path::new("scan.tiff")), "image/tiff");
        assert_eq!(mime_for_path(Path::new("frame.avif")), "image/avif");
        assert_eq!(mime_for_path(Path::new("no_extension")), "application/octet-stream");
        assert_eq!(extension_for("image/heif"), "heif");
    }
}
