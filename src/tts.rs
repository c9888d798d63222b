//! TTS generation client.
//!
//! Posts text, voice, vibe and rendered prompt as a multipart form to the
//! generation service and returns the raw audio bytes it answers with.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::TtsConfig;
use crate::prompt::{render_prompt, Prompt};

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("TTS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("TTS service returned status {0}")]
    Status(StatusCode),
}

/// Fields sent to the generation service, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub input: String,
    pub prompt: String,
    pub voice: String,
    pub vibe: String,
}

impl SpeechRequest {
    /// Lowercases the voice and renders the prompt; text and vibe pass through.
    pub fn new(text: &str, voice: &str, vibe: &str, prompt: &Prompt) -> Self {
        Self {
            input: text.to_string(),
            prompt: render_prompt(prompt),
            voice: voice.to_lowercase(),
            vibe: vibe.to_string(),
        }
    }

    /// Input length in characters, for logging.
    pub fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn into_form(self) -> Form {
        Form::new()
            .text("input", self.input)
            .text("prompt", self.prompt)
            .text("voice", self.voice)
            .text("vibe", self.vibe)
    }
}

#[async_trait]
pub trait TtsClient: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Bytes, TtsError>;
}

pub struct OpenAiFmClient {
    config: TtsConfig,
    client: Client,
}

impl OpenAiFmClient {
    pub fn new(config: TtsConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl TtsClient for OpenAiFmClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Bytes, TtsError> {
        debug!(
            "Requesting speech: voice={} vibe={} ({} chars)",
            request.voice,
            request.vibe,
            request.char_count()
        );

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("origin", &self.config.origin)
            .header("referer", &self.config.referer)
            .multipart(request.into_form())
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!("TTS service returned status {}", resp.status());
            return Err(TtsError::Status(resp.status()));
        }

        let audio = resp.bytes().await?;
        debug!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiFmClient {
        OpenAiFmClient::new(TtsConfig {
            endpoint: format!("{}/api/generate", server.uri()),
            ..TtsConfig::default()
        })
    }

    fn request() -> SpeechRequest {
        let prompt = match json!({"identity": "x", "affect": "y"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        SpeechRequest::new("Hello there", "Coral", "Santa", &prompt)
    }

    #[test]
    fn test_speech_request_normalizes_voice_only() {
        let req = request();
        assert_eq!(req.voice, "coral");
        assert_eq!(req.vibe, "Santa");
        assert_eq!(req.input, "Hello there");
        assert_eq!(req.prompt, "Identity: x\n\nAffect: y");
    }

    #[test]
    fn test_char_count_is_not_byte_count() {
        let req = SpeechRequest::new("héllo ✓", "Ash", "Robot", &Prompt::new());
        assert_eq!(req.char_count(), 7);
        assert_eq!(req.input.len(), 10);
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(header("origin", "https://www.openai.fm"))
            .and(header("referer", "https://www.openai.fm/"))
            .and(body_string_contains("name=\"voice\"\r\n\r\ncoral"))
            .and(body_string_contains("Identity: x\n\nAffect: y"))
            .and(body_string_contains("name=\"vibe\"\r\n\r\nSanta"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client_for(&server).synthesize(request()).await.unwrap();
        assert_eq!(audio.as_ref(), &[1u8, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_synthesize_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).synthesize(request()).await.unwrap_err();
        assert!(matches!(err, TtsError::Status(s) if s == StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_synthesize_connection_failure() {
        let client = OpenAiFmClient::new(TtsConfig {
            endpoint: "http://127.0.0.1:9/api/generate".into(),
            ..TtsConfig::default()
        });
        let err = client.synthesize(request()).await.unwrap_err();
        assert!(matches!(err, TtsError::Request(_)));
    }
}
