//! Streaming relay for cached audio.
//!
//! Upstream bytes are forwarded chunk by chunk as the client consumes them;
//! the full file is never held in memory. A failure after the first chunk
//! simply ends the response body.

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProxyConfig;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream fetch failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct AudioProxy {
    client: Client,
    user_agent: String,
    default_content_type: HeaderValue,
}

impl AudioProxy {
    pub fn new(config: &ProxyConfig) -> Self {
        let client = Client::new();

        let default_content_type = HeaderValue::from_str(&config.default_content_type)
            .unwrap_or_else(|_| {
                warn!(
                    "Invalid default content type {:?}, using audio/mpeg",
                    config.default_content_type
                );
                HeaderValue::from_static("audio/mpeg")
            });

        Self {
            client,
            user_agent: config.user_agent.clone(),
            default_content_type,
        }
    }

    /// Fetch `url` and relay it as a streaming 200 response.
    ///
    /// Errors only cover failures before any byte is sent: transport errors
    /// and non-2xx upstream statuses.
    pub async fn relay(&self, url: &str) -> Result<Response, ProxyError> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| self.default_content_type.clone());
        debug!("Relaying {url} as {content_type:?}");

        let source = url.to_string();
        let stream = resp
            .bytes_stream()
            .inspect_err(move |e| warn!("Audio stream from {source} broke off: {e}"));

        Ok((
            StatusCode::OK,
            [(CONTENT_TYPE, content_type)],
            Body::from_stream(stream),
        )
            .into_response())
    }
}
