//! Long-running video generation.
//!
//! `models/{model}:predictLongRunning` returns an [`Operation`] that must be
//! polled until it reports `done` before its result can be read. [`Poller`]
//! drives that loop as a small state machine over [`OperationState`], with the
//! delay between polls supplied through [`Sleep`].

use super::{deserialize_base64, rest, serialize_base64};
use async_trait::async_trait;
use derive_new::new;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Interval the service documentation recommends between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    DontAllow,
    AllowAdult,
    AllowAll,
}

#[derive(Debug, Serialize, Clone, Default, new, Setters)]
#[setters(prefix = "with_", strip_option, into)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideosConfig {
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    person_generation: Option<PersonGeneration>,
    /// `16:9` or `9:16`.
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
    #[new(default)]
    #[serde(rename = "sampleCount", skip_serializing_if = "Option::is_none")]
    number_of_videos: Option<u32>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    enhance_prompt: Option<bool>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
}

/// Seed image for image-to-video generation.
#[derive(Clone, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(
        serialize_with = "serialize_base64",
        deserialize_with = "deserialize_base64"
    )]
    bytes_base64_encoded: Vec<u8>,
    #[new(into)]
    mime_type: String,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes_base64_encoded.len())
            .finish()
    }
}

#[derive(Debug, Clone, new, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct GenerateVideosRequest {
    #[setters(skip)]
    #[new(into)]
    prompt: String,
    #[new(default)]
    image: Option<Image>,
    #[new(default)]
    config: Option<GenerateVideosConfig>,
}

impl Serialize for GenerateVideosRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct Instance<'a> {
            prompt: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            image: Option<&'a Image>,
        }

        #[derive(Serialize)]
        struct Body<'a> {
            instances: [Instance<'a>; 1],
            #[serde(skip_serializing_if = "Option::is_none")]
            parameters: Option<&'a GenerateVideosConfig>,
        }

        Body {
            instances: [Instance {
                prompt: &self.prompt,
                image: self.image.as_ref(),
            }],
            parameters: self.config.as_ref(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    response: Option<OperationResponse>,
    #[serde(default)]
    error: Option<OperationError>,
}

impl Operation {
    /// The generated videos, only once the operation is done and succeeded.
    pub fn result(&self) -> Option<&GenerateVideoResponse> {
        if !self.done || self.error.is_some() {
            return None;
        }
        self.response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
    #[serde(default)]
    pub rai_media_filtered_count: Option<u32>,
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<Video>,
}

impl GeneratedVideo {
    pub fn uri(&self) -> Option<&str> {
        self.video.as_ref().and_then(|v| v.uri.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<OperationError> for rest::Error {
    fn from(error: OperationError) -> Self {
        rest::Error::Operation {
            code: error.code,
            message: error
                .message
                .unwrap_or_else(|| "video generation failed".to_string()),
        }
    }
}

#[derive(Debug)]
pub enum OperationState {
    Submitted(Operation),
    Pending(Operation),
    Done(Operation),
    Failed(OperationError),
}

impl OperationState {
    /// Classifies an operation returned by the submit call.
    pub fn submitted(operation: Operation) -> Self {
        if operation.done {
            Self::finished(operation)
        } else {
            Self::Submitted(operation)
        }
    }

    /// Classifies an operation returned by a poll.
    pub fn polled(operation: Operation) -> Self {
        if operation.done {
            Self::finished(operation)
        } else {
            Self::Pending(operation)
        }
    }

    fn finished(mut operation: Operation) -> Self {
        match operation.error.take() {
            Some(error) => Self::Failed(error),
            None => Self::Done(operation),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn fetch_operation(&self, name: &str) -> Result<Operation, rest::Error>;
}

#[async_trait]
impl OperationSource for rest::Client {
    async fn fetch_operation(&self, name: &str) -> Result<Operation, rest::Error> {
        self.get_operation(name).await
    }
}

#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(new)]
pub struct Poller<'a, O: ?Sized, S> {
    source: &'a O,
    sleeper: S,
    interval: Duration,
}

impl<O, S> Poller<'_, O, S>
where
    O: OperationSource + ?Sized,
    S: Sleep,
{
    /// Sleeps then polls until the operation is done, returning its result.
    #[tracing::instrument(skip_all, fields(operation = %operation.name))]
    pub async fn wait(&self, operation: Operation) -> Result<GenerateVideoResponse, rest::Error> {
        let mut state = OperationState::submitted(operation);
        let mut polls = 0usize;

        loop {
            state = match state {
                OperationState::Submitted(operation) | OperationState::Pending(operation) => {
                    self.sleeper.sleep(self.interval).await;
                    polls += 1;
                    let next = self.source.fetch_operation(&operation.name).await?;
                    debug!(polls, done = next.done, "polled operation");
                    OperationState::polled(next)
                }
                OperationState::Done(operation) => {
                    info!(polls, "operation done");
                    let result = operation.result().cloned().unwrap_or_default();
                    if result.generated_samples.is_empty() {
                        warn!(
                            filtered = ?result.rai_media_filtered_reasons,
                            "operation finished without videos"
                        );
                    }
                    return Ok(result);
                }
                OperationState::Failed(error) => {
                    warn!(polls, code = ?error.code, message = ?error.message, "operation failed");
                    return Err(error.into());
                }
            };
        }
    }
}
