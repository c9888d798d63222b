//! File host upload client.
//!
//! Uploads generated audio to tmpfiles.org (or a compatible host) and turns
//! the returned landing-page URL into its direct-download form.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload returned status {0}")]
    Status(StatusCode),

    #[error("Upload failed")]
    MissingUrl,
}

#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Store `audio` upstream and return its direct-download URL.
    async fn upload(&self, audio: Bytes, filename: &str) -> Result<String, UploadError>;
}

// --- Response types ---

#[derive(Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Deserialize)]
struct UploadData {
    url: Option<String>,
}

/// Rewrite a landing-page URL to the raw file URL.
///
/// Replaces the first occurrence of `public_root` with `{public_root}dl/`;
/// URLs without the prefix are returned unchanged.
pub fn direct_download_url(url: &str, public_root: &str) -> String {
    url.replacen(public_root, &format!("{public_root}dl/"), 1)
}

pub struct TmpfilesClient {
    config: UploadConfig,
    client: Client,
}

impl TmpfilesClient {
    pub fn new(config: UploadConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl UploadClient for TmpfilesClient {
    async fn upload(&self, audio: Bytes, filename: &str) -> Result<String, UploadError> {
        let size = audio.len();
        let part = Part::bytes(audio.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("accept", "*/*")
            .header("referer", &self.config.referer)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!("Upload returned status {}", resp.status());
            return Err(UploadError::Status(resp.status()));
        }

        let body: UploadResponse = resp.json().await?;
        let page_url = body
            .data
            .and_then(|d| d.url)
            .filter(|u| !u.is_empty())
            .ok_or(UploadError::MissingUrl)?;

        let url = direct_download_url(&page_url, &self.config.public_root);
        info!("Uploaded {size} bytes as {filename} -> {url}");
        Ok(url)
    }
}
