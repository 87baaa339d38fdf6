//! HTTP implementation of the remote collaboration-service API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use docvault_core::config::mirror::MirrorConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;

use crate::api::{RemoteDocService, RemoteError};

/// Identifier-bearing responses from the remote API.
#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    document_id: String,
}

/// reqwest-backed client for the collaboration service's REST API.
#[derive(Debug, Clone)]
pub struct HttpRemoteDocService {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpRemoteDocService {
    /// Create a new client from configuration.
    pub fn new(config: &MirrorConfig) -> AppResult<Self> {
        if config.base_url.is_empty() {
            return Err(AppError::configuration(
                "Mirror base_url is required when mirroring is enabled",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds,
            ))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    docvault_core::error::ErrorKind::Configuration,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Classify an HTTP status into the remote error taxonomy.
    fn classify_status(status: StatusCode, body: String) -> RemoteError {
        match status {
            StatusCode::UNAUTHORIZED => RemoteError::Auth(body),
            // Permission and quota rejections are placement-specific.
            StatusCode::FORBIDDEN
            | StatusCode::PAYLOAD_TOO_LARGE
            | StatusCode::INSUFFICIENT_STORAGE => RemoteError::Placement(body),
            StatusCode::TOO_MANY_REQUESTS => RemoteError::Transient(body),
            s if s.is_server_error() => RemoteError::Transient(body),
            _ => RemoteError::Api(format!("{status}: {body}")),
        }
    }

    fn classify_request_error(e: reqwest::Error) -> RemoteError {
        if e.is_timeout() || e.is_connect() {
            RemoteError::Transient(e.to_string())
        } else {
            RemoteError::Api(e.to_string())
        }
    }

    async fn handle<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Api(format!("Malformed response: {e}")))
    }
}

#[async_trait]
impl RemoteDocService for HttpRemoteDocService {
    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        parent: Option<&str>,
    ) -> Result<String, RemoteError> {
        debug!(name, parent = ?parent, bytes = data.len(), "Uploading to remote service");

        let mut request = self
            .client
            .post(self.url("/files"))
            .bearer_auth(&self.api_token)
            .query(&[("name", name)])
            .body(data.to_vec());

        if let Some(parent) = parent {
            request = request.query(&[("parent", parent)]);
        }

        let response = request
            .send()
            .await
            .map_err(Self::classify_request_error)?;
        let parsed: IdResponse = Self::handle(response).await?;
        Ok(parsed.id)
    }

    async fn convert(&self, remote_id: &str) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(self.url(&format!("/files/{remote_id}/convert")))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(Self::classify_request_error)?;
        let parsed: ConvertResponse = Self::handle(response).await?;
        Ok(parsed.document_id)
    }

    async fn share(
        &self,
        remote_id: &str,
        recipient: &str,
        role: &str,
    ) -> Result<bool, RemoteError> {
        let response = self
            .client
            .post(self.url(&format!("/files/{remote_id}/permissions")))
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "recipient": recipient, "role": role }))
            .send()
            .await
            .map_err(Self::classify_request_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::classify_status(status, body))
        }
    }

    async fn ensure_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(self.url("/folders"))
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "name": name, "parent": parent }))
            .send()
            .await
            .map_err(Self::classify_request_error)?;
        let parsed: IdResponse = Self::handle(response).await?;
        Ok(parsed.id)
    }
}
