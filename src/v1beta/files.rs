//! Uploaded media held by the Files API.
//!
//! A file is uploaded once and then referenced from prompts through its
//! `uri` as a [`FileData`] part. Large media (video in particular) is
//! processed after upload and can only be used once its state is
//! [`FileState::Active`].

use super::FileData;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Resource name, `files/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Sent as a decimal string.
    #[serde(default)]
    pub size_bytes: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub expiration_time: Option<String>,
}

impl File {
    pub fn is_active(&self) -> bool {
        self.state == FileState::Active
    }

    pub fn size(&self) -> Option<u64> {
        self.size_bytes.as_deref()?.parse().ok()
    }

    /// A prompt part referencing this file, once it has a URI and a type.
    pub fn file_data(&self) -> Option<FileData> {
        Some(FileData::new(self.mime_type.as_deref()?, self.uri.as_deref()?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadFileResponse {
    pub file: File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Accepts `files/abc` or a bare `abc`.
pub(crate) fn resource_name(name: &str) -> String {
    let trimmed = name.trim().trim_matches('/');
    if trimmed.starts_with("files/") {
        trimmed.to_string()
    } else {
        format!("files/{trimmed}")
    }
}
