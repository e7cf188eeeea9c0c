use super::request::{GenerationConfig, Tool};
use super::response::GroundingMetadata;
pub use super::{Content, InlineData, ModalityTokenCount, Part, PartData, ResponseModality, Role};
use async_trait::async_trait;
use derive_new::new;
use derive_setters::Setters;
use ezsockets::{
    Bytes, Client as EzClient, ClientConfig, ClientExt, CloseFrame, Error as EzError, Utf8Bytes,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{Sender, channel};
use tokio::sync::oneshot;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Default websocket endpoint for the Live API.
pub const DEFAULT_WS_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";
/// Default channel capacity for message streams.
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Ez(#[from] EzError),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("live session closed")]
    Closed,
    #[error("turn handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Serialize, Clone, new, Setters)]
#[setters(prefix = "with_", strip_option, into)]
#[serde(rename_all = "camelCase")]
/// Parameters sent when opening a new streaming session.
pub struct Setup {
    #[new(into)]
    #[setters(skip)]
    model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(default)]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(default)]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(default)]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(default)]
    output_audio_transcription: Option<AudioTranscriptionConfig>,
}

impl Setup {
    /// A setup for `model` that only asks for the given output modalities.
    ///
    /// Audio output also requests a transcript of what the model says.
    pub fn for_modalities(model: &str, modalities: Vec<ResponseModality>) -> Self {
        let model = format!("models/{}", super::model_id(model));
        let transcribe = modalities.contains(&ResponseModality::Audio);
        let setup = Self::new(model)
            .with_generation_config(GenerationConfig::new().with_response_modalities(modalities));
        if transcribe {
            setup.with_output_audio_transcription(AudioTranscriptionConfig {})
        } else {
            setup
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AudioTranscriptionConfig {}

#[derive(Debug, Serialize, Clone, new, Setters)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    #[setters(skip)]
    turns: Vec<Content>,
    #[new(value = "false")]
    #[setters(rename = "is_turn_completed")]
    turn_complete: bool,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Setup(Setup),
    ClientContent(ClientContent),
}

impl ClientMessage {
    /// A single user text turn marked as complete.
    pub fn user_turn(text: impl Into<String>) -> Self {
        ClientMessage::ClientContent(
            ClientContent::new(vec![Content::user_text(text)]).is_turn_completed(true),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupComplete {}

/// One incremental server update. Any combination of fields may be present,
/// e.g. the last piece of a model turn together with `turn_complete`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default)]
    pub model_turn: Option<Content>,
    #[serde(default)]
    pub turn_complete: bool,
    #[serde(default)]
    pub generation_complete: bool,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    pub output_transcription: Option<Transcription>,
    #[serde(default)]
    pub input_transcription: Option<Transcription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    pub time_left: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i32>,
    pub response_token_count: Option<i32>,
    pub total_token_count: Option<i32>,
    #[serde(default)]
    pub prompt_tokens_details: Vec<ModalityTokenCount>,
    #[serde(default)]
    pub response_tokens_details: Vec<ModalityTokenCount>,
}

#[derive(Debug, Clone)]
pub enum ServerMessage {
    SetupComplete,
    ServerContent {
        server_content: ServerContent,
        usage_metadata: Option<UsageMetadata>,
    },
    GoAway(GoAway),
}

impl ServerMessage {
    pub fn is_turn_complete(&self) -> bool {
        matches!(
            self,
            ServerMessage::ServerContent { server_content, .. } if server_content.turn_complete
        )
    }
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Helper {
            setup_complete: Option<SetupComplete>,
            server_content: Option<ServerContent>,
            usage_metadata: Option<UsageMetadata>,
            go_away: Option<GoAway>,
        }

        let helper = Helper::deserialize(deserializer)?;
        if helper.setup_complete.is_some() {
            Ok(ServerMessage::SetupComplete)
        } else if let Some(content) = helper.server_content {
            Ok(ServerMessage::ServerContent {
                server_content: content,
                usage_metadata: helper.usage_metadata,
            })
        } else if let Some(go) = helper.go_away {
            Ok(ServerMessage::GoAway(go))
        } else if let Some(usage) = helper.usage_metadata {
            // Usage can arrive on its own after the last content chunk.
            Ok(ServerMessage::ServerContent {
                server_content: ServerContent::default(),
                usage_metadata: Some(usage),
            })
        } else {
            Err(serde::de::Error::custom("unsupported server message"))
        }
    }
}

#[derive(Debug, new)]
struct WsClient {
    setup: Setup,
    sender: Sender<ServerMessage>,
    inner: ezsockets::Client<Self>,
    #[new(into)]
    connected_sender: Option<oneshot::Sender<()>>,
}

impl WsClient {
    async fn forward(&mut self, payload: &[u8]) -> Result<(), EzError> {
        let msg = match serde_json::from_slice::<ServerMessage>(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("skipping server message: {}", e);
                return Ok(());
            }
        };

        if self.sender.send(msg).await.is_err() {
            return Err("failed to send message".into());
        }
        Ok(())
    }
}

#[async_trait]
impl ClientExt for WsClient {
    type Call = ClientMessage;

    async fn on_text(&mut self, text: Utf8Bytes) -> Result<(), EzError> {
        debug!("received text message: {}", text);
        self.forward(text.as_bytes()).await
    }

    async fn on_binary(&mut self, bytes: Bytes) -> Result<(), EzError> {
        debug!("received binary message: {} bytes", bytes.len());
        self.forward(bytes.as_ref()).await
    }

    async fn on_call(&mut self, call: Self::Call) -> Result<(), EzError> {
        let msg = serde_json::to_string(&call)?;
        debug!("sending message: {}", msg);
        self.inner
            .text(msg)
            .map_err(|e| Error::from(EzError::from(e)))?;
        Ok(())
    }

    async fn on_connect(&mut self) -> Result<(), EzError> {
        let _ = self.inner.call(ClientMessage::Setup(self.setup.clone()));

        if let Some(tx) = self.connected_sender.take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Client for the Live websocket API.
pub struct Client {
    client: EzClient<WsClient>,
}

impl Client {
    /// Establish a websocket connection to `endpoint` and send `setup`.
    ///
    /// Returns the [`Client`] and a stream of incoming [`ServerMessage`]s.
    #[tracing::instrument(
        skip(api_key, setup),
        fields(endpoint = %endpoint, model = %setup.model)
    )]
    pub async fn connect(
        api_key: impl Into<String>,
        setup: Setup,
        endpoint: &str,
    ) -> Result<(Self, ReceiverStream<ServerMessage>), Error> {
        url::Url::parse(endpoint)?;
        let config = ClientConfig::new(endpoint).query_parameter("key", &api_key.into());
        let (tx, rx) = channel(DEFAULT_CHANNEL_CAPACITY);
        let (tx_connected, rx_connected) = oneshot::channel();
        let (handle, _fut) =
            ezsockets::connect(move |h| WsClient::new(setup, tx, h, tx_connected), config).await;

        if let Err(e) = rx_connected.await {
            error!(?e, "websocket connection failed");
            return Err(Error::Closed);
        }
        info!("websocket connection established");

        Ok((Self { client: handle }, ReceiverStream::new(rx)))
    }

    /// Send a message to the server.
    pub fn call(&self, message: ClientMessage) -> Result<(), Error> {
        Ok(self.client.call(message).map_err(EzError::from)?)
    }

    /// Close the websocket connection.
    pub fn disconnect(self, reason: Option<CloseFrame>) -> Result<(), Error> {
        self.client.close(reason).map_err(EzError::from)?;
        Ok(())
    }
}
