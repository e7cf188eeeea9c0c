//! Request/response driver.
//!
//! [`Driver`] wraps a [`Config`] and a REST client and runs the four flows:
//! grounded text, image generation and editing, long-running video generation,
//! and a single live turn.

use crate::config::{self, Config};
use crate::dispatch::{self, Collector, DispatchSummary, MediaStore};
use crate::v1beta::request::{GenerationConfig, LatLng, Request, RetrievalConfig, Tool, ToolConfig};
use crate::v1beta::response::Response;
use crate::v1beta::session::{self, Connection, TurnHandler, TurnSummary};
use crate::v1beta::video::{GenerateVideosRequest, Poller, Sleep, TokioSleep};
use crate::v1beta::{Content, InlineData, Part, ResponseModality, Role, live, rest};
use derive_new::new;
use derive_setters::Setters;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rest(#[from] rest::Error),
    #[error(transparent)]
    Live(#[from] live::Error),
    #[error(transparent)]
    Dispatch(#[from] dispatch::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("{path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Text, optionally paired with one image.
#[derive(Debug, Clone, new)]
pub struct Prompt {
    #[new(into)]
    text: String,
    #[new(default)]
    image: Option<InlineData>,
}

impl Prompt {
    pub fn with_image(mut self, image: InlineData) -> Self {
        self.image = Some(image);
        self
    }

    /// Attaches the image at `path`, typed from its extension.
    pub async fn with_image_file(self, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let image = InlineData::new(dispatch::mime_for_path(path), bytes);
        Ok(self.with_image(image))
    }

    /// Attaches the image at `path`, first writing a plain gray placeholder
    /// there when the file does not exist.
    pub async fn with_image_file_or_placeholder(self, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path).await.map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        if !exists {
            write_placeholder(path).await?;
        }
        self.with_image_file(path).await
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    fn into_content(self) -> Content {
        let mut parts = vec![Part::text(self.text)];
        if let Some(image) = self.image {
            parts.push(Part::new(crate::v1beta::PartData::InlineData(image)));
        }
        Content::new(Role::User, parts)
    }
}

/// Size of the stand-in image written by [`write_placeholder`].
pub const PLACEHOLDER_SIZE: (u32, u32) = (300, 200);

/// Writes a gray [`PLACEHOLDER_SIZE`] image to `path`, encoded after its
/// extension (JPEG when it has none).
pub async fn write_placeholder(path: &Path) -> Result<(), Error> {
    warn!(path = %path.display(), "input image not found, writing a placeholder");
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let (width, height) = PLACEHOLDER_SIZE;
        let format = ImageFormat::from_path(&target).unwrap_or(ImageFormat::Jpeg);
        RgbImage::from_pixel(width, height, Rgb([128, 128, 128])).save_with_format(&target, format)
    })
    .await??;
    Ok(())
}

/// Retrieval tool attached to a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grounding {
    Search,
    /// Google Maps with the caller's location as retrieval context.
    Maps(LatLng),
}

#[derive(Debug, Clone, Default, new, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Options {
    #[new(default)]
    generation: Option<GenerationConfig>,
    #[new(default)]
    grounding: Option<Grounding>,
    #[new(default)]
    #[setters(skip)]
    modalities: Vec<ResponseModality>,
}

impl Options {
    pub fn with_modalities(mut self, modalities: impl IntoIterator<Item = ResponseModality>) -> Self {
        self.modalities = modalities.into_iter().collect();
        self
    }
}

/// Builds the generation request for `prompt` under `options`.
pub fn build_request(prompt: Prompt, options: Options) -> Request {
    let mut generation = options.generation.unwrap_or_default();
    if !options.modalities.is_empty() {
        generation = generation.with_response_modalities(options.modalities);
    }

    let mut request = Request::new(vec![prompt.into_content()]).with_generation_config(generation);

    match options.grounding {
        Some(Grounding::Search) => {
            request = request.with_tools(vec![Tool::google_search()]);
        }
        Some(Grounding::Maps(lat_lng)) => {
            request = request
                .with_tools(vec![Tool::google_maps()])
                .with_tool_config(
                    ToolConfig::new().with_retrieval_config(RetrievalConfig::new().with_lat_lng(lat_lng)),
                );
        }
        None => {}
    }

    request
}

/// Outcome of a generation whose parts were dispatched to a [`Collector`].
#[derive(Debug)]
pub struct Generated {
    pub response: Response,
    pub collector: Collector,
    pub summary: DispatchSummary,
}

#[derive(Debug, Clone)]
pub struct Driver {
    config: Config,
    client: rest::Client,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        // The REST client is rebound per call with `for_model`.
        let client = rest::Client::new(config.api_key(), "")
            .with_api_base(config.api_base());
        Self { config, client }
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(Config::from_env()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self, model: &str) -> rest::Client {
        self.client.for_model(model)
    }

    pub async fn generate(
        &self,
        model: &str,
        prompt: Prompt,
        options: Options,
    ) -> Result<Response, Error> {
        let request = build_request(prompt, options);
        Ok(self.client(model).generate_content(request).await?)
    }

    /// Generates and routes every part: text is kept, media is saved as
    /// `{stem}.{ext}` under the configured output directory.
    pub async fn generate_to_files(
        &self,
        model: &str,
        prompt: Prompt,
        options: Options,
        stem: &str,
    ) -> Result<Generated, Error> {
        let response = self.generate(model, prompt, options).await?;
        let mut collector = Collector::new(MediaStore::new(self.config.output_dir(), stem));
        let summary = dispatch::dispatch(&response, &mut collector).await?;
        Ok(Generated {
            response,
            collector,
            summary,
        })
    }

    /// Submits a video job, waits for it with the configured interval and
    /// saves each generated video as `video{n}.mp4`.
    pub async fn generate_videos(
        &self,
        model: &str,
        request: GenerateVideosRequest,
    ) -> Result<Vec<PathBuf>, Error> {
        self.generate_videos_with(model, request, TokioSleep).await
    }

    pub async fn generate_videos_with<S: Sleep>(
        &self,
        model: &str,
        request: GenerateVideosRequest,
        sleeper: S,
    ) -> Result<Vec<PathBuf>, Error> {
        let client = self.client(model);
        let operation = client.generate_videos(request).await?;
        let result = Poller::new(&client, sleeper, self.config.poll_interval())
            .wait(operation)
            .await?;

        let dir = self.config.output_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(dispatch::Error::from)?;

        let mut saved = Vec::new();
        for (n, video) in result.generated_samples.iter().enumerate() {
            let Some(uri) = video.uri() else {
                warn!(index = n, "generated video has no uri");
                continue;
            };
            let bytes = client.download(uri).await?;
            let path = dir.join(format!("video{n}.mp4"));
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(dispatch::Error::from)?;
            info!(path = %path.display(), bytes = bytes.len(), "saved video");
            saved.push(path);
        }

        Ok(saved)
    }

    /// Opens a live session for `model`, sends `text` as one complete turn and
    /// streams the reply into `handler`. The session is closed on return.
    pub async fn live_turn<H: TurnHandler>(
        &self,
        model: &str,
        modalities: Vec<ResponseModality>,
        text: &str,
        handler: &mut H,
    ) -> Result<TurnSummary, Error> {
        let setup = live::Setup::for_modalities(model, modalities);
        let connection =
            Connection::open(self.config.api_key(), setup, self.config.live_endpoint()).await?;
        Ok(session::exchange(connection, text, handler).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_grounding_sets_tool_and_location() {
        let request = build_request(
            Prompt::new("Italian restaurants nearby?"),
            Options::new().with_grounding(Grounding::Maps(LatLng::new(34.050481, -118.248526))),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0], serde_json::json!({"googleMaps": {}}));
        assert_eq!(
            json["toolConfig"]["retrievalConfig"]["latLng"]["latitude"],
            34.050481
        );
        assert_eq!(
            json["toolConfig"]["retrievalConfig"]["latLng"]["longitude"],
            -118.248526
        );
    }

    #[test]
    fn search_grounding_and_modalities() {
        let request = build_request(
            Prompt::new("When is the next total solar eclipse?"),
            Options::new()
                .with_grounding(Grounding::Search)
                .with_modalities([ResponseModality::Text]),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0], serde_json::json!({"googleSearch": {}}));
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT"])
        );
        assert!(json.get("toolConfig").is_none());
    }

    #[test]
    fn image_prompt_puts_text_before_image() {
        let prompt = Prompt::new("Add a dragon").with_image(InlineData::new("image/jpeg", vec![7]));
        let request = build_request(
            prompt,
            Options::new()
                .with_modalities([ResponseModality::Text, ResponseModality::Image])
                .with_generation(GenerationConfig::new().with_temperature(0.9).with_top_p(0.8)),
        );
        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Add a dragon");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "Bw==");
        let generation = &json["generationConfig"];
        assert_eq!(generation["responseModalities"], serde_json::json!(["TEXT", "IMAGE"]));
        assert!((generation["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_input_image_is_replaced_by_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_image.jpg");

        let prompt = Prompt::new("Can you add a dragon above the character?")
            .with_image_file_or_placeholder(&path)
            .await
            .unwrap();

        assert!(prompt.has_image());
        assert_eq!(image::image_dimensions(&path).unwrap(), PLACEHOLDER_SIZE);
        let request = build_request(prompt, Options::new());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
    }

    #[tokio::test]
    async fn existing_input_image_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let prompt = Prompt::new("add a llama")
            .with_image_file_or_placeholder(&path)
            .await
            .unwrap();

        assert!(prompt.has_image());
        assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_input_image_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("test_image.jpg");
        let err = Prompt::new("edit")
            .with_image_file(&missing)
            .await
            .unwrap_err();
        match err {
            Error::Input { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
