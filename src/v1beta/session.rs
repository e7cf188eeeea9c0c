//! Scoped live sessions.
//!
//! A [`Session`] owns a [`Transport`] and closes it exactly once, either through
//! [`Session::close`] or when dropped. [`exchange`] runs the common one-turn
//! pattern: send a complete user turn, consume chunks until the server marks the
//! turn complete, release the session.

use super::live::{self, ClientMessage, Error, InlineData, PartData, ServerMessage};
use super::response::GroundingMetadata;
use async_trait::async_trait;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Bidirectional message channel to the live endpoint.
#[async_trait]
pub trait Transport: Send {
    fn send(&mut self, message: ClientMessage) -> Result<(), Error>;

    /// Next server message, `None` once the connection is gone.
    async fn recv(&mut self) -> Option<ServerMessage>;

    fn close(&mut self) -> Result<(), Error>;
}

/// A websocket connection opened with [`live::Client`].
#[derive(Debug)]
pub struct Connection {
    client: Option<live::Client>,
    messages: ReceiverStream<ServerMessage>,
}

impl Connection {
    pub async fn open(
        api_key: impl Into<String>,
        setup: live::Setup,
        endpoint: &str,
    ) -> Result<Self, Error> {
        let (client, messages) = live::Client::connect(api_key, setup, endpoint).await?;
        Ok(Self {
            client: Some(client),
            messages,
        })
    }
}

#[async_trait]
impl Transport for Connection {
    fn send(&mut self, message: ClientMessage) -> Result<(), Error> {
        self.client.as_ref().ok_or(Error::Closed)?.call(message)
    }

    async fn recv(&mut self) -> Option<ServerMessage> {
        self.messages.next().await
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.client.take() {
            Some(client) => client.disconnect(None),
            None => Ok(()),
        }
    }
}

/// Receives the content of a model turn as it streams in.
pub trait TurnHandler: Send {
    fn on_text(&mut self, _text: &str) -> Result<(), Error> {
        Ok(())
    }

    fn on_audio(&mut self, _audio: &InlineData) -> Result<(), Error> {
        Ok(())
    }

    fn on_transcription(&mut self, _text: &str) -> Result<(), Error> {
        Ok(())
    }
}

/// Ignores everything; the summary still accumulates text.
impl TurnHandler for () {}

#[derive(Debug, Clone, Default)]
pub struct TurnSummary {
    pub text: String,
    /// Transcript of spoken output, when audio was requested.
    pub transcript: String,
    pub audio_chunks: usize,
    pub audio_bytes: usize,
    pub usage: Option<live::UsageMetadata>,
    pub grounding: Option<GroundingMetadata>,
}

#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    open: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Sends `text` as a complete user turn.
    pub fn send_text(&mut self, text: &str) -> Result<(), Error> {
        if !self.open {
            return Err(Error::Closed);
        }
        self.transport.send(ClientMessage::user_turn(text))
    }

    /// Consumes server messages up to and including the next turn-complete marker.
    ///
    /// Messages queued after the marker are left unread.
    pub async fn receive_turn<H: TurnHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<TurnSummary, Error> {
        let mut summary = TurnSummary::default();

        while let Some(message) = self.transport.recv().await {
            let (content, usage_metadata) = match message {
                ServerMessage::ServerContent {
                    server_content,
                    usage_metadata,
                } => (server_content, usage_metadata),
                ServerMessage::SetupComplete => {
                    debug!("setup complete");
                    continue;
                }
                ServerMessage::GoAway(go_away) => {
                    warn!(time_left = ?go_away.time_left, "server is going away");
                    continue;
                }
            };

            if usage_metadata.is_some() {
                summary.usage = usage_metadata;
            }

            // Content first: the final chunk may carry the marker too.
            if let Some(turn) = &content.model_turn {
                for part in &turn.parts {
                    match &part.data {
                        PartData::Text(text) => {
                            debug!(text = %text, "streaming");
                            summary.text.push_str(text);
                            handler.on_text(text)?;
                        }
                        PartData::InlineData(audio) => {
                            summary.audio_chunks += 1;
                            summary.audio_bytes += audio.data().len();
                            handler.on_audio(audio)?;
                        }
                        other => debug!(part = ?other, "ignoring part"),
                    }
                }
            }
            if let Some(transcription) = &content.output_transcription {
                summary.transcript.push_str(&transcription.text);
                handler.on_transcription(&transcription.text)?;
            }
            if content.grounding_metadata.is_some() {
                summary.grounding = content.grounding_metadata;
            }
            if content.interrupted {
                debug!("generation interrupted");
            }
            if content.generation_complete {
                debug!("generation complete");
            }

            if content.turn_complete {
                info!(
                    text_len = summary.text.len(),
                    audio_chunks = summary.audio_chunks,
                    "turn complete"
                );
                return Ok(summary);
            }
        }

        Err(Error::Closed)
    }

    /// Sends one user turn and waits for the model's complete reply.
    pub async fn turn<H: TurnHandler>(
        &mut self,
        text: &str,
        handler: &mut H,
    ) -> Result<TurnSummary, Error> {
        self.send_text(text)?;
        self.receive_turn(handler).await
    }

    pub fn close(mut self) -> Result<(), Error> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.transport.close()
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "failed to close live session");
        }
    }
}

/// Runs a single turn over `transport` and closes it whatever the outcome.
///
/// Failures are logged before being returned.
pub async fn exchange<T, H>(transport: T, text: &str, handler: &mut H) -> Result<TurnSummary, Error>
where
    T: Transport,
    H: TurnHandler,
{
    let mut session = Session::new(transport);
    let outcome = session.turn(text, handler).await;
    let closed = session.close();

    match (outcome, closed) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(e)) | (Err(e), _) => {
            error!(error = %e, "live exchange failed");
            Err(e)
        }
    }
}

/// Turns 16-bit little-endian PCM chunks into samples.
///
/// The service may split a sample across two chunks; its first byte is held
/// until the next chunk arrives.
#[derive(Debug, Default)]
pub struct Pcm16Decoder {
    pending: Option<u8>,
}

impl Pcm16Decoder {
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(chunk.len().div_ceil(2));
        let mut bytes = chunk;
        if let Some(low) = self.pending.take() {
            match bytes.split_first() {
                Some((&high, rest)) => {
                    samples.push(i16::from_le_bytes([low, high]));
                    bytes = rest;
                }
                None => {
                    self.pending = Some(low);
                    return samples;
                }
            }
        }
        let mut pairs = bytes.chunks_exact(2);
        samples.extend(pairs.by_ref().map(|pair| i16::from_le_bytes([pair[0], pair[1]])));
        self.pending = pairs.remainder().first().copied();
        samples
    }

    /// A byte still waiting for its pair, if the stream ended mid-sample.
    pub fn pending(&self) -> Option<u8> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        closes: Arc<AtomicUsize>,
        sent: Arc<Mutex<Vec<serde_json::Value>>>,
        remaining: Arc<AtomicUsize>,
    }

    struct FakeTransport {
        queue: VecDeque<ServerMessage>,
        recorder: Recorder,
    }

    impl FakeTransport {
        fn new(messages: &[serde_json::Value], recorder: &Recorder) -> Self {
            let queue: VecDeque<ServerMessage> = messages
                .iter()
                .map(|m| serde_json::from_value(m.clone()).unwrap())
                .collect();
            recorder.remaining.store(queue.len(), Ordering::SeqCst);
            Self {
                queue,
                recorder: recorder.clone(),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        fn send(&mut self, message: ClientMessage) -> Result<(), Error> {
            self.recorder
                .sent
                .lock()
                .unwrap()
                .push(serde_json::to_value(&message)?);
            Ok(())
        }

        async fn recv(&mut self) -> Option<ServerMessage> {
            let next = self.queue.pop_front();
            self.recorder.remaining.store(self.queue.len(), Ordering::SeqCst);
            next
        }

        fn close(&mut self) -> Result<(), Error> {
            self.recorder.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn text_chunk(text: &str) -> serde_json::Value {
        serde_json::json!({"serverContent": {"modelTurn": {"parts": [{"text": text}]}}})
    }

    fn audio_chunk() -> serde_json::Value {
        serde_json::json!({"serverContent": {"modelTurn": {"parts": [
            {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AAAAAA=="}}
        ]}}})
    }

    fn last_text_chunk(text: &str) -> serde_json::Value {
        serde_json::json!({"serverContent": {
            "modelTurn": {"parts": [{"text": text}]},
            "generationComplete": true,
            "turnComplete": true
        }})
    }

    fn turn_complete() -> serde_json::Value {
        serde_json::json!({"serverContent": {"turnComplete": true}})
    }

    #[derive(Default)]
    struct TurnRecorder {
        texts: Vec<String>,
        audio: Vec<u8>,
    }

    impl TurnHandler for TurnRecorder {
        fn on_text(&mut self, text: &str) -> Result<(), Error> {
            self.texts.push(text.to_string());
            Ok(())
        }

        fn on_audio(&mut self, audio: &InlineData) -> Result<(), Error> {
            self.audio.extend_from_slice(audio.data());
            Ok(())
        }
    }

    struct FailingSink;

    impl TurnHandler for FailingSink {
        fn on_audio(&mut self, _audio: &InlineData) -> Result<(), Error> {
            Err(Error::Handler("disk full".into()))
        }
    }

    #[tokio::test]
    async fn stops_at_first_turn_complete() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(
            &[
                serde_json::json!({"setupComplete": {}}),
                text_chunk("Once "),
                text_chunk("upon a time"),
                turn_complete(),
                text_chunk("queued after the turn"),
                turn_complete(),
            ],
            &recorder,
        );

        let mut handler = TurnRecorder::default();
        let summary = exchange(transport, "Tell me a story", &mut handler)
            .await
            .unwrap();

        assert_eq!(summary.text, "Once upon a time");
        assert_eq!(handler.texts, ["Once ", "upon a time"]);
        assert_eq!(recorder.remaining.load(Ordering::SeqCst), 2);
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn marker_on_last_content_chunk_keeps_its_text() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(
            &[
                text_chunk("The sky "),
                last_text_chunk("is blue."),
                text_chunk("never read"),
            ],
            &recorder,
        );

        let mut handler = TurnRecorder::default();
        let summary = exchange(transport, "What colour is the sky?", &mut handler)
            .await
            .unwrap();

        assert_eq!(summary.text, "The sky is blue.");
        assert_eq!(handler.texts, ["The sky ", "is blue."]);
        assert_eq!(recorder.remaining.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transcript_grounding_and_usage_are_summarised() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(
            &[
                serde_json::json!({"serverContent": {
                    "outputTranscription": {"text": "Hello "},
                    "groundingMetadata": {"webSearchQueries": ["weather"]}
                }}),
                serde_json::json!({"serverContent": {"outputTranscription": {"text": "there"}}}),
                serde_json::json!({"usageMetadata": {"totalTokenCount": 12}}),
                turn_complete(),
            ],
            &recorder,
        );

        let summary = exchange(transport, "hi", &mut ()).await.unwrap();

        assert_eq!(summary.transcript, "Hello there");
        assert_eq!(
            summary.grounding.unwrap().web_search_queries,
            ["weather"]
        );
        assert_eq!(summary.usage.unwrap().total_token_count, Some(12));
    }

    #[tokio::test]
    async fn sends_one_complete_user_turn() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(&[turn_complete()], &recorder);

        exchange(transport, "hello", &mut ()).await.unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["clientContent"]["turns"][0]["role"], "user");
        assert_eq!(sent[0]["clientContent"]["turns"][0]["parts"][0]["text"], "hello");
        assert_eq!(sent[0]["clientContent"]["turnComplete"], true);
    }

    #[tokio::test]
    async fn forwards_audio_chunks() {
        let recorder = Recorder::default();
        let transport =
            FakeTransport::new(&[audio_chunk(), audio_chunk(), turn_complete()], &recorder);

        let mut handler = TurnRecorder::default();
        let summary = exchange(transport, "speak", &mut handler).await.unwrap();

        assert_eq!(summary.audio_chunks, 2);
        assert_eq!(summary.audio_bytes, 8);
        assert_eq!(handler.audio, vec![0u8; 8]);
        assert!(summary.text.is_empty());
    }

    #[tokio::test]
    async fn closes_after_handler_error() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(&[audio_chunk(), turn_complete()], &recorder);

        let err = exchange(transport, "speak", &mut FailingSink)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_lost_before_turn_complete() {
        let recorder = Recorder::default();
        let transport = FakeTransport::new(&[text_chunk("partial")], &recorder);

        let err = exchange(transport, "hi", &mut ()).await.unwrap_err();

        assert!(matches!(err, Error::Closed));
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes_once() {
        let recorder = Recorder::default();
        {
            let session = Session::new(FakeTransport::new(&[], &recorder));
            assert!(session.is_open());
        }
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);

        let session = Session::new(FakeTransport::new(&[], &recorder));
        session.close().unwrap();
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn odd_chunk_carries_its_last_byte_over() {
        let mut decoder = Pcm16Decoder::default();
        assert_eq!(decoder.decode(&[0x01, 0x00, 0x34]), [1]);
        assert_eq!(decoder.pending(), Some(0x34));
        assert_eq!(decoder.decode(&[0x12, 0xff, 0xff]), [0x1234, -1]);
        assert_eq!(decoder.pending(), None);
    }

    #[test]
    fn single_bytes_pair_up_across_chunks() {
        let mut decoder = Pcm16Decoder::default();
        assert!(decoder.decode(&[0x00]).is_empty());
        assert!(decoder.decode(&[]).is_empty());
        assert_eq!(decoder.pending(), Some(0x00));
        assert_eq!(decoder.decode(&[0x80]), [i16::MIN]);
        assert_eq!(decoder.pending(), None);
    }
}
