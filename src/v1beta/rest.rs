use super::files::{self, File, ListFilesResponse, UploadFileResponse};
use super::video::{GenerateVideosRequest, Operation};
use super::{API_BASE, Content, model_id, request, response};
use derive_new::new;
use derive_setters::Setters;
use eventsource_stream::Eventsource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::{debug, info};

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    ApiError(String),
    #[error("operation failed ({code:?}): {message}")]
    Operation { code: Option<i32>, message: String },
    #[error("event stream: {0}")]
    Stream(String),
    #[error("upload: {0}")]
    Upload(String),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone, new, Setters)]
#[setters(prefix = "with_", into, strip_option)]
pub struct Client {
    #[setters(skip)]
    #[new(into)]
    api_key: String,
    #[setters(skip)]
    #[new(into)]
    model: String,
    #[new(value = "API_BASE.to_string()")]
    api_base: String,
    #[new(value = "reqwest::Client::new()")]
    client: reqwest::Client,
}

impl Client {
    /// Same credentials and endpoint, bound to another model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self, method: &str) -> String {
        format!(
            "{api_base}/models/{model}:{method}",
            api_base = self.api_base.trim_end_matches('/'),
            model = model_id(&self.model),
        )
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, Error> {
        debug!(%url, "sending request");
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .header(reqwest::header::USER_AGENT, env!("CARGO_CRATE_NAME"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, Error> {
        let response = self.post(&self.model_url(method), body, &[]).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, url: url::Url) -> Result<reqwest::Response, Error> {
        debug!(url = %url.as_str().split('?').next().unwrap_or_default(), "fetching");
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .header(reqwest::header::USER_AGENT, env!("CARGO_CRATE_NAME"))
            .send()
            .await?;
        check_status(response).await
    }

    async fn delete(&self, url: url::Url) -> Result<reqwest::Response, Error> {
        debug!(%url, "deleting");
        let response = self
            .client
            .delete(url)
            .query(&[("key", self.api_key.as_str())])
            .header(reqwest::header::USER_AGENT, env!("CARGO_CRATE_NAME"))
            .send()
            .await?;
        check_status(response).await
    }

    fn resource_url(&self, name: &str) -> Result<url::Url, Error> {
        Ok(url::Url::parse(&format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            name.trim_start_matches('/')
        ))?)
    }

    /// `{host}/upload/{version}/files`, next to the configured API base.
    fn upload_endpoint(&self) -> Result<url::Url, Error> {
        let mut url = url::Url::parse(&self.api_base)?;
        let path = format!("/upload/{}/files", url.path().trim_matches('/'));
        url.set_path(&path);
        Ok(url)
    }

    pub async fn generate_content(
        &self,
        request: request::Request,
    ) -> Result<response::Response, Error> {
        self.post_json("generateContent", &request).await
    }

    pub async fn stream_content(
        &self,
        request: request::Request,
    ) -> Result<impl tokio_stream::Stream<Item = Result<response::Response, Error>>, Error> {
        let response = self
            .post(
                &self.model_url("streamGenerateContent"),
                &request,
                &[("alt", "sse")],
            )
            .await?;

        Ok(response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| match event {
                Ok(event) if event.data.trim().is_empty() => None,
                Ok(event) => Some(
                    serde_json::from_str::<response::Response>(&event.data).map_err(Error::from),
                ),
                Err(e) => Some(Err(Error::Stream(e.to_string()))),
            }))
    }

    pub async fn count_tokens(
        &self,
        contents: Vec<Content>,
    ) -> Result<response::CountTokensResponse, Error> {
        self.post_json("countTokens", &request::CountTokensRequest::new(contents))
            .await
    }

    pub async fn embed_content(
        &self,
        request: request::EmbedContentRequest,
    ) -> Result<response::EmbedContentResponse, Error> {
        self.post_json("embedContent", &request).await
    }

    /// Submits a video generation job and returns the long-running operation.
    pub async fn generate_videos(&self, request: GenerateVideosRequest) -> Result<Operation, Error> {
        let operation: Operation = self.post_json("predictLongRunning", &request).await?;
        debug!(operation = %operation.name, "video generation submitted");
        Ok(operation)
    }

    /// Fetches the current state of an operation by resource name (`models/.../operations/...`).
    pub async fn get_operation(&self, name: &str) -> Result<Operation, Error> {
        let url = self.resource_url(name)?;
        Ok(self.get(url).await?.json().await?)
    }

    /// Uploads `bytes` with the resumable protocol: one request opens the
    /// session, a second sends the content and finalizes it.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> Result<File, Error> {
        let metadata = match display_name {
            Some(name) => serde_json::json!({"file": {"displayName": name}}),
            None => serde_json::json!({"file": {}}),
        };
        let start = self
            .client
            .post(self.upload_endpoint()?)
            .query(&[("key", self.api_key.as_str())])
            .header(reqwest::header::USER_AGENT, env!("CARGO_CRATE_NAME"))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await?;
        let start = check_status(start).await?;
        let session = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Upload(format!("response carried no {UPLOAD_URL_HEADER} header")))?;
        let session = url::Url::parse(session)?;

        let response = self
            .client
            .post(session)
            .header(reqwest::header::USER_AGENT, env!("CARGO_CRATE_NAME"))
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadFileResponse = check_status(response).await?.json().await?;
        info!(file = %uploaded.file.name, state = ?uploaded.file.state, "file uploaded");
        Ok(uploaded.file)
    }

    pub async fn get_file(&self, name: &str) -> Result<File, Error> {
        let url = self.resource_url(&files::resource_name(name))?;
        Ok(self.get(url).await?.json().await?)
    }

    /// One page of the project's files; pass the returned
    /// `next_page_token` back to continue.
    pub async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListFilesResponse, Error> {
        let mut url = self.resource_url("files")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(size) = page_size {
                query.append_pair("pageSize", &size.to_string());
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(self.get(url).await?.json().await?)
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), Error> {
        let name = files::resource_name(name);
        self.delete(self.resource_url(&name)?).await?;
        debug!(file = %name, "file deleted");
        Ok(())
    }

    /// Downloads a file URI returned by the service, e.g. a generated video.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, Error> {
        let url = url::Url::parse(uri)?;
        let bytes = self.get(url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
    debug!(%status, "request rejected");
    Err(Error::ApiError(format!("{status}: {error_body}")))
}
