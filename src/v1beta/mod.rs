use base64::{Engine as _, engine::general_purpose};
use derive_new::new;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[new(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PartData {
    Text(String),
    InlineData(InlineData),
    FileData(FileData),
    VideoMetadata(VideoMetadata),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
    ExecutableCode(ExecutableCode),
    CodeExecutionResult(CodeExecutionResult),
}

#[derive(Debug, Clone, Deserialize, Serialize, new, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", into, strip_option)]
pub struct Part {
    #[serde(flatten)]
    #[setters(skip)]
    pub data: PartData,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    #[new(default)]
    pub thought: bool,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(PartData::Text(text.into()))
    }

    pub fn inline(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(PartData::InlineData(InlineData::new(mime_type, data)))
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            PartData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_inline_data(&self) -> Option<&InlineData> {
        match &self.data {
            PartData::InlineData(inline) => Some(inline),
            _ => None,
        }
    }
}

/// Binary media carried inside a part.
///
/// The bytes are base64 encoded on the wire and decoded on deserialization,
/// so a received part always holds raw media.
#[derive(Clone, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[new(into)]
    mime_type: String,
    #[serde(
        serialize_with = "serialize_base64",
        deserialize_with = "deserialize_base64"
    )]
    data: Vec<u8>,
}

impl InlineData {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for InlineData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineData")
            .field("mime_type", &self.mime_type)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    #[new(into)]
    mime_type: String,
    #[new(into)]
    file_uri: String,
}

impl FileData {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_uri(&self) -> &str {
        &self.file_uri
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    start_offset: Offset,
    end_offset: Offset,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, new)]
pub struct Offset {
    #[new(default)]
    seconds: i64,
    #[new(default)]
    nanos: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, new)]
pub struct ExecutableCode {
    #[new(into)]
    pub language: String,
    #[new(into)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Enumeration of possible outcomes of the code execution.
pub enum CodeExecutionOutcome {
    #[serde(rename = "OUTCOME_OK")]
    Ok,
    /// stderr should contain the reason.
    #[serde(rename = "OUTCOME_FAILED")]
    Failed,
    /// There may or may not be a partial output present.
    #[serde(rename = "OUTCOME_DEADLINE_EXCEEDED")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Deserialize, Serialize, new, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct CodeExecutionResult {
    pub outcome: CodeExecutionOutcome,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(into)]
    pub id: Option<String>,
    #[new(into)]
    pub name: String,
    #[serde(default)]
    #[new(into)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    #[new(into)]
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionResponseScheduling {
    /// Only add the result to the conversation context, do not interrupt or trigger generation.
    Silent,
    /// Add the result to the conversation context, and prompt to generate output without interrupting ongoing generation.
    WhenIdle,
    /// Add the result to the conversation context, interrupt ongoing generation and prompt to generate output.
    Interrupt,
}

#[derive(Debug, Clone, Serialize, Deserialize, new, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct FunctionResponse {
    #[new(into)]
    #[setters(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[new(into)]
    #[setters(skip)]
    pub name: String,
    #[new(into)]
    #[setters(skip)]
    pub response: FunctionResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[new(default)]
    pub will_continue: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[new(default)]
    pub scheduling: Option<FunctionResponseScheduling>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    ModalityUnspecified,
    Text,
    Image,
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalityTokenCount {
    pub modality: Modality,
    #[serde(default)]
    pub token_count: i32,
}

/// Output modalities a caller may request from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseModality {
    Text,
    Image,
    Audio,
}

/// Strips a leading `models/` so both spellings of a model id produce the same URL.
pub(crate) fn model_id(model: &str) -> &str {
    let trimmed = model.trim().trim_matches('/');
    trimmed.strip_prefix("models/").unwrap_or(trimmed)
}

#[allow(clippy::ptr_arg)]
fn serialize_base64<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
}

fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    general_purpose::STANDARD
        .decode(s)
        .map_err(serde::de::Error::custom)
}

pub mod safety {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum HarmCategory {
        HarmCategoryUnspecified,
        HarmCategorySexuallyExplicit,
        HarmCategoryHateSpeech,
        HarmCategoryHarassment,
        HarmCategoryDangerousContent,
        HarmCategoryCivicIntegrity,
        /// A category this client does not know yet.
        #[serde(other)]
        Unknown,
    }
    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum HarmProbability {
        HarmProbabilityUnspecified,
        Negligible,
        Low,
        Medium,
        High,
        #[serde(other)]
        Unknown,
    }
    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum HarmBlockThreshold {
        HarmBlockThresholdUnspecified,
        BlockNone,
        BlockLowAndAbove,
        BlockMedAndAbove,
        #[serde(rename = "BLOCK_HIGH_AND_ABOVE")]
        BlockOnlyHigh,
    }
}

pub mod request {
    use super::{Content, ResponseModality};
    use derive_new::new;
    use derive_setters::Setters;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Deserialize, Serialize, new, Setters)]
    #[setters(prefix = "with_")]
    #[setters(into, strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct Request {
        #[setters(skip)]
        #[new(into)]
        contents: Vec<Content>,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        #[new(default)]
        tools: Vec<Tool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[new(default)]
        tool_config: Option<ToolConfig>,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        #[new(default)]
        safety_settings: Vec<SafetySettings>,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[new(default)]
        generation_config: Option<GenerationConfig>,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[new(default)]
        system_instruction: Option<Content>,
    }

    impl Request {
        pub fn contents(&self) -> &[Content] {
            &self.contents
        }

        pub fn tools(&self) -> &[Tool] {
            &self.tools
        }
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    #[serde(rename_all = "camelCase")]
    pub enum Tool {
        FunctionDeclarations(Vec<FunctionDeclaration>),
        GoogleSearchRetrieval(GoogleSearchRetrieval),
        CodeExecution(CodeExecution),
        GoogleSearch(GoogleSearch),
        GoogleMaps(GoogleMaps),
    }

    impl Tool {
        pub fn google_search() -> Self {
            Tool::GoogleSearch(GoogleSearch::default())
        }

        pub fn google_maps() -> Self {
            Tool::GoogleMaps(GoogleMaps::default())
        }
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default)]
    pub struct CodeExecution {}

    #[derive(Debug, Serialize, Deserialize, Clone, Default)]
    pub struct GoogleSearch {}

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct GoogleMaps {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        enable_widget: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Copy)]
    pub enum DynamicRetrievalMode {
        #[serde(rename = "MODE_UNSPECIFIED")]
        Unspecified,
        #[serde(rename = "MODE_DYNAMIC")]
        Dynamic,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct DynamicRetrievalConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<DynamicRetrievalMode>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        dynamic_threshold: Option<f32>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct GoogleSearchRetrieval {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        dynamic_retrieval_config: Option<DynamicRetrievalConfig>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum FunctionBehavior {
        /// If set, the system will wait to receive the function response before continuing the conversation.
        #[default]
        Blocking,
        /// If set, the system will not wait to receive the function response. Instead, it will attempt to handle function responses as they become available while maintaining the conversation between the user and the model.
        NonBlocking,
    }

    #[derive(Debug, Clone, Deserialize, Serialize, new, Setters)]
    #[setters(prefix = "with_")]
    #[setters(into, strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct FunctionDeclaration {
        #[setters(skip)]
        #[new(into)]
        name: String,
        #[setters(skip)]
        #[new(into)]
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[new(default)]
        parameters: Option<serde_json::Value>, // OpenAPI Schema
        #[serde(skip_serializing_if = "Option::is_none")]
        #[new(default)]
        response: Option<serde_json::Value>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        behavior: Option<FunctionBehavior>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Copy)]
    pub enum FunctionCallingMode {
        #[serde(rename = "MODE_UNSPECIFIED")]
        Unspecified,
        #[serde(rename = "AUTO")]
        Auto,
        #[serde(rename = "ANY")]
        Any,
        #[serde(rename = "NONE")]
        None,
        #[serde(rename = "VALIDATED")]
        Validated,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct FunctionCallingConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<FunctionCallingMode>,
        #[new(default)]
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        allowed_function_names: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct ToolConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        function_calling_config: Option<FunctionCallingConfig>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        retrieval_config: Option<RetrievalConfig>,
    }

    /// Location context handed to retrieval tools such as Google Maps.
    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option, into)]
    #[serde(rename_all = "camelCase")]
    pub struct RetrievalConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        lat_lng: Option<LatLng>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        language_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, new)]
    pub struct LatLng {
        pub latitude: f64,
        pub longitude: f64,
    }

    #[derive(Debug, Clone, Deserialize, Serialize, new)]
    #[serde(rename_all = "camelCase")]
    pub struct SafetySettings {
        category: super::safety::HarmCategory,
        threshold: super::safety::HarmBlockThreshold,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Copy)]
    pub enum MediaResolution {
        #[serde(rename = "MEDIA_RESOLUTION_UNSPECIFIED")]
        Unspecified,
        #[serde(rename = "MEDIA_RESOLUTION_LOW")]
        Low,
        #[serde(rename = "MEDIA_RESOLUTION_MEDIUM")]
        Medium,
        #[serde(rename = "MEDIA_RESOLUTION_HIGH")]
        High,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option, into)]
    #[serde(rename_all = "camelCase")]
    pub struct PrebuiltVoiceConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        voice_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new)]
    #[serde(rename_all = "camelCase")]
    pub struct VoiceConfig {
        prebuilt_voice_config: PrebuiltVoiceConfig,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option, into)]
    #[serde(rename_all = "camelCase")]
    pub struct SpeechConfig {
        #[setters(skip)]
        voice_config: VoiceConfig,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        language_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct ThinkingConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        include_thoughts: Option<bool>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        thinking_budget: Option<i32>,
    }

    /// Configuration options controlling generation.
    #[derive(Debug, Serialize, Deserialize, Clone, Default, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerationConfig {
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        candidate_count: Option<u32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        max_output_tokens: Option<u32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        temperature: Option<f32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        top_p: Option<f32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        top_k: Option<u32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        stop_sequences: Option<Vec<String>>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        seed: Option<i32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        presence_penalty: Option<f32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        frequency_penalty: Option<f32>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        response_modalities: Option<Vec<ResponseModality>>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        speech_config: Option<SpeechConfig>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        thinking_config: Option<ThinkingConfig>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        media_resolution: Option<MediaResolution>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        response_mime_type: Option<String>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        response_schema: Option<serde_json::Value>, // OpenAPI Schema
    }

    impl GenerationConfig {
        pub fn response_modalities(&self) -> &[ResponseModality] {
            self.response_modalities.as_deref().unwrap_or_default()
        }
    }

    #[derive(Debug, Clone, Serialize, new)]
    #[serde(rename_all = "camelCase")]
    pub struct CountTokensRequest {
        #[new(into)]
        contents: Vec<Content>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Copy)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TaskType {
        TaskTypeUnspecified,
        RetrievalQuery,
        RetrievalDocument,
        SemanticSimilarity,
        Classification,
        Clustering,
    }

    #[derive(Debug, Clone, Serialize, new, Setters)]
    #[setters(prefix = "with_", strip_option)]
    #[serde(rename_all = "camelCase")]
    pub struct EmbedContentRequest {
        #[setters(skip)]
        content: Content,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        task_type: Option<TaskType>,
        #[new(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        output_dimensionality: Option<u32>,
    }
}

pub mod response {
    use super::{Content, InlineData, Part};
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct Response {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
        #[serde(default)]
        pub prompt_feedback: Option<PromptFeedback>,
        #[serde(default)]
        pub usage_metadata: Option<UsageMetadata>,
        #[serde(default)]
        pub model_version: Option<String>,
    }

    /// One element of a response, in the order the caller should see it.
    #[derive(Debug, Clone, Copy)]
    pub enum ResponsePart<'a> {
        Text(&'a str),
        Media(&'a InlineData),
        Grounding(&'a GroundingMetadata),
    }

    impl Response {
        /// Parts of the first candidate, or an empty slice.
        pub fn first_parts(&self) -> &[Part] {
            self.candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.as_slice())
                .unwrap_or_default()
        }

        /// The first candidate's text and media parts in order, followed by its
        /// grounding metadata when present. Parts of other kinds are skipped.
        pub fn parts(&self) -> impl Iterator<Item = ResponsePart<'_>> {
            let grounding = self
                .candidates
                .first()
                .and_then(|c| c.grounding_metadata.as_ref())
                .map(ResponsePart::Grounding);

            self.first_parts()
                .iter()
                .filter(|p| !p.thought)
                .filter_map(|p| {
                    p.as_text()
                        .map(ResponsePart::Text)
                        .or_else(|| p.as_inline_data().map(ResponsePart::Media))
                })
                .chain(grounding)
        }

        /// Concatenated text of the first candidate, `None` if it has no text part.
        pub fn text(&self) -> Option<String> {
            let texts: Vec<&str> = self
                .first_parts()
                .iter()
                .filter(|p| !p.thought)
                .filter_map(Part::as_text)
                .collect();
            (!texts.is_empty()).then(|| texts.concat())
        }

        pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
            self.candidates
                .first()
                .and_then(|c| c.grounding_metadata.as_ref())
        }

        pub fn function_calls(&self) -> impl Iterator<Item = &super::FunctionCall> {
            self.first_parts().iter().filter_map(|p| match &p.data {
                super::PartData::FunctionCall(call) => Some(call),
                _ => None,
            })
        }
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct Candidate {
        #[serde(default)]
        pub content: Option<Content>,
        #[serde(default)]
        pub finish_reason: Option<FinishReason>,
        #[serde(default)]
        pub index: Option<i32>,
        #[serde(default)]
        pub safety_ratings: Vec<SafetyRating>,
        #[serde(default)]
        pub grounding_metadata: Option<GroundingMetadata>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct UsageMetadata {
        pub prompt_token_count: Option<u32>,
        pub candidates_token_count: Option<u32>,
        pub thoughts_token_count: Option<u32>,
        pub total_token_count: Option<u32>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct PromptFeedback {
        #[serde(default)]
        pub block_reason: Option<String>,
        #[serde(default)]
        pub safety_ratings: Vec<SafetyRating>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SafetyRating {
        pub category: super::safety::HarmCategory,
        pub probability: super::safety::HarmProbability,
        #[serde(default)]
        pub blocked: bool,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum FinishReason {
        FinishReasonUnspecified,
        Stop,
        MaxTokens,
        Safety,
        Recitation,
        ImageSafety,
        ProhibitedContent,
        MalformedFunctionCall,
        #[serde(other)]
        Other,
    }

    /// Citations attached to a candidate by a grounding tool.
    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct GroundingMetadata {
        #[serde(default)]
        pub grounding_chunks: Vec<GroundingChunk>,
        #[serde(default, alias = "groundingSupport")]
        pub grounding_supports: Vec<GroundingSupport>,
        #[serde(default)]
        pub web_search_queries: Vec<String>,
        #[serde(default)]
        pub search_entry_point: Option<SearchEntryPoint>,
        #[serde(default)]
        pub google_maps_widget_context_token: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(untagged)]
    pub enum GroundingChunk {
        Web { web: GroundingSource },
        Maps { maps: GroundingSource },
        RetrievedContext {
            #[serde(rename = "retrievedContext")]
            retrieved_context: GroundingSource,
        },
        Other(serde_json::Value),
    }

    impl GroundingChunk {
        pub fn source(&self) -> Option<&GroundingSource> {
            match self {
                GroundingChunk::Web { web } => Some(web),
                GroundingChunk::Maps { maps } => Some(maps),
                GroundingChunk::RetrievedContext { retrieved_context } => Some(retrieved_context),
                GroundingChunk::Other(_) => None,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct GroundingSource {
        #[serde(default)]
        pub uri: Option<String>,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub text: Option<String>,
        #[serde(default)]
        pub place_id: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GroundingSupport {
        #[serde(default)]
        pub segment: Option<Segment>,
        #[serde(default)]
        pub grounding_chunk_indices: Vec<u32>,
        #[serde(default)]
        pub confidence_scores: Vec<f32>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Segment {
        #[serde(default)]
        pub start_index: u32,
        #[serde(default)]
        pub end_index: u32,
        #[serde(default)]
        pub text: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SearchEntryPoint {
        #[serde(default)]
        pub rendered_content: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CountTokensResponse {
        #[serde(default)]
        pub total_tokens: u32,
        #[serde(default)]
        pub cached_content_token_count: Option<u32>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct EmbedContentResponse {
        pub embedding: ContentEmbedding,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ContentEmbedding {
        #[serde(default)]
        pub values: Vec<f32>,
    }
}

pub mod files;
pub mod live;
pub mod rest;
pub mod session;
pub mod video;
