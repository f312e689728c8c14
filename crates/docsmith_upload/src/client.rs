//! Client for the host's file-storage API.
//!
//! Upload: `POST {base}/api/v1/files/?process=false` (multipart field `file`)
//! returning JSON with an `id`. Download: `GET
//! {base}/api/v1/files/{id}/content/{filename}`.
//! Auth: `Authorization: Bearer <token>` forwarded from the incoming request.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::UploadError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Path of the upload endpoint relative to the base URL.
const UPLOAD_PATH: &str = "/api/v1/files/";

/// Download path for a stored file, relative to a base URL.
pub fn download_path(file_id: &str, filename: &str) -> String {
    format!("/api/v1/files/{file_id}/content/{filename}")
}

#[derive(Deserialize)]
struct UploadResponse {
    id: Option<serde_json::Value>,
}

/// Uploads finished documents to file storage.
#[derive(Debug, Clone)]
pub struct FileStorageClient {
    base_url: String,
    client: Client,
}

impl FileStorageClient {
    /// Create a client for the storage API at `base_url` (server-side
    /// address, usually `http://localhost:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { base_url, client }
    }

    /// Return the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upload URL, including the `process=false` query.
    pub fn upload_url(&self) -> Result<url::Url, UploadError> {
        let mut url = url::Url::parse(&format!("{}{UPLOAD_PATH}", self.base_url))
            .map_err(|e| UploadError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        url.query_pairs_mut().append_pair("process", "false");
        Ok(url)
    }

    /// Upload the file at `path` under `filename` and return its identifier.
    ///
    /// Fails with [`UploadError::MissingToken`] before any network traffic
    /// when `token` is absent.
    pub async fn upload(
        &self,
        path: &Path,
        filename: &str,
        mime: &str,
        token: Option<&str>,
    ) -> Result<String, UploadError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(UploadError::MissingToken)?;

        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| UploadError::Other(format!("Invalid MIME type {mime}: {e}")))?;
        let form = Form::new().part("file", part);
        let url = self.upload_url()?;

        debug!(%url, filename, size, "uploading file");

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => UploadError::NotAuthenticated,
                code => UploadError::Http { status: code, body },
            });
        }

        let data: UploadResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(format!("Failed to parse upload response: {e}")))?;

        let file_id = match data.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(UploadError::InvalidResponse(
                    "Upload response has no 'id' field".into(),
                ));
            }
        };

        info!(filename, file_id = %file_id, "file uploaded");
        Ok(file_id)
    }
}
