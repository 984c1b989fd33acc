//! HTTP client for the subhub server.

use std::time::Instant;

use reqwest::StatusCode;
use subhub_shared::constants::{SUB_ROUTE_PREFIX, UPLOAD_ROUTE};
use subhub_shared::protocol::{UploadRequest, UploadResponse};
use subhub_shared::FileId;
use tracing::{debug, info};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct SubhubClient {
    http: reqwest::Client,
    server_url: String,
}

impl SubhubClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            server_url,
        }
    }

    /// Upload `content` and return the link it can be fetched from.
    ///
    /// With `old_id`, the server deletes that file once the new one is
    /// written.
    pub async fn upload_sub_content(&self, content: &str, old_id: Option<&FileId>) -> Result<String> {
        if content.trim().is_empty() {
            return Err(ClientError::EmptyContent);
        }

        let started = Instant::now();
        let body = UploadRequest::new(content, old_id.map(FileId::to_string));

        let res = self
            .http
            .post(format!("{}{}", self.server_url, UPLOAD_ROUTE))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        debug!(
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            size = content.len(),
            "upload finished"
        );
        if status != StatusCode::OK {
            return Err(ClientError::Status(status));
        }

        let data: UploadResponse = res.json().await?;
        if !data.is_success() {
            return Err(ClientError::Rejected(data.message));
        }
        let url = data.url.ok_or(ClientError::MissingUrl)?;

        info!(url = %url, replaced = old_id.is_some(), "subscription uploaded");
        Ok(url)
    }

    /// Stored text for `id`, or `None` when the server has no such file.
    pub async fn fetch(&self, id: &FileId) -> Result<Option<String>> {
        let res = self
            .http
            .get(format!("{}{}{}", self.server_url, SUB_ROUTE_PREFIX, id))
            .send()
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(res.text().await?)),
            status => Err(ClientError::Status(status)),
        }
    }
}
