//! Generation pipeline: validate → synthesize → upload → derive code → cache.
//!
//! Each stage returns a `Result` and the first failure ends the run. The cache
//! is only written after every earlier stage succeeded, so a failed run never
//! leaves an entry behind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cache::ResourceCache;
use crate::code::derive_code;
use crate::prompt::Prompt;
use crate::tts::{SpeechRequest, TtsClient, TtsError};
use crate::upload::{UploadClient, UploadError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Text exceeds maximum length of {0} characters")]
    TextTooLong(usize),

    #[error(transparent)]
    Tts(#[from] TtsError),

    #[error("Failed to upload audio: {0}")]
    Upload(#[from] UploadError),
}

/// Body of `POST /api/generate-tts`; echoed back as `params` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub voice: String,
    pub vibe: String,
    #[serde(default)]
    pub prompt: Prompt,
}

/// A cached audio resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAudio {
    pub code: String,
    pub upstream_url: String,
}

pub struct GenerationPipeline {
    tts: Arc<dyn TtsClient>,
    uploader: Arc<dyn UploadClient>,
    cache: ResourceCache,
    max_text_len: usize,
    filename: String,
}

impl GenerationPipeline {
    pub fn new(
        tts: Arc<dyn TtsClient>,
        uploader: Arc<dyn UploadClient>,
        cache: ResourceCache,
        max_text_len: usize,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            tts,
            uploader,
            cache,
            max_text_len,
            filename: filename.into(),
        }
    }

    /// Length as the browser client counts it (UTF-16 code units).
    pub fn text_len(text: &str) -> usize {
        text.encode_utf16().count()
    }

    pub fn validate(&self, request: &GenerateRequest) -> Result<(), PipelineError> {
        if Self::text_len(&request.text) > self.max_text_len {
            return Err(PipelineError::TextTooLong(self.max_text_len));
        }
        Ok(())
    }

    pub async fn run(&self, request: &GenerateRequest) -> Result<GeneratedAudio, PipelineError> {
        self.validate(request)?;

        let speech = SpeechRequest::new(
            &request.text,
            &request.voice,
            &request.vibe,
            &request.prompt,
        );
        let audio = self.tts.synthesize(speech).await?;

        let upstream_url = self.uploader.upload(audio, &self.filename).await?;

        let code = derive_code(&upstream_url);
        self.cache.put(code.clone(), upstream_url.clone());
        info!("Cached audio {code} ({} entries)", self.cache.len());

        Ok(GeneratedAudio { code, upstream_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingTts {
        calls: AtomicUsize,
        last: Mutex<Option<SpeechRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl TtsClient for RecordingTts {
        async fn synthesize(&self, request: SpeechRequest) -> Result<Bytes, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = Some(request);
            if self.fail {
                return Err(TtsError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(Bytes::from_static(b"mp3-bytes"))
        }
    }

    struct FixedUpload {
        calls: AtomicUsize,
        result: Option<String>,
    }

    #[async_trait]
    impl UploadClient for FixedUpload {
        async fn upload(&self, audio: Bytes, filename: &str) -> Result<String, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(audio.as_ref(), b"mp3-bytes");
            assert_eq!(filename, "voicegen.mp3");
            self.result.clone().ok_or(UploadError::MissingUrl)
        }
    }

    const URL: &str = "https://tmpfiles.org/dl/123456/voicegen.mp3";

    fn setup(
        tts_fails: bool,
        upload_url: Option<&str>,
    ) -> (GenerationPipeline, Arc<RecordingTts>, Arc<FixedUpload>, ResourceCache) {
        let tts = Arc::new(RecordingTts {
            fail: tts_fails,
            ..RecordingTts::default()
        });
        let upload = Arc::new(FixedUpload {
            calls: AtomicUsize::new(0),
            result: upload_url.map(str::to_string),
        });
        let cache = ResourceCache::default();
        let pipeline = GenerationPipeline::new(
            tts.clone(),
            upload.clone(),
            cache.clone(),
            1003,
            "voicegen.mp3",
        );
        (pipeline, tts, upload, cache)
    }

    fn request(text: String) -> GenerateRequest {
        serde_json::from_value(serde_json::json!({
            "text": text,
            "voice": "Alloy",
            "vibe": "Robot",
            "prompt": {"identity": "x", "affect": "y"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_caches_derived_code() {
        let (pipeline, tts, upload, cache) = setup(false, Some(URL));
        let out = pipeline.run(&request("hello".into())).await.unwrap();

        assert_eq!(out.code, "3c3766182a");
        assert_eq!(out.upstream_url, URL);
        assert_eq!(cache.get("3c3766182a").unwrap(), URL);
        assert_eq!(tts.calls.load(Ordering::SeqCst), 1);
        assert_eq!(upload.calls.load(Ordering::SeqCst), 1);

        let sent = tts.last.lock().clone().unwrap();
        assert_eq!(sent.voice, "alloy");
        assert_eq!(sent.vibe, "Robot");
        assert_eq!(sent.prompt, "Identity: x\n\nAffect: y");
    }

    #[tokio::test]
    async fn test_text_over_limit_calls_nothing() {
        let (pipeline, tts, upload, cache) = setup(false, Some(URL));
        let err = pipeline.run(&request("a".repeat(1004))).await.unwrap_err();

        assert!(matches!(err, PipelineError::TextTooLong(1003)));
        assert_eq!(err.to_string(), "Text exceeds maximum length of 1003 characters");
        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
        assert_eq!(upload.calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_text_at_limit_is_accepted() {
        let (pipeline, tts, _, _) = setup(false, Some(URL));
        pipeline.run(&request("a".repeat(1003))).await.unwrap();
        assert_eq!(tts.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_text_len_counts_utf16_units() {
        assert_eq!(GenerationPipeline::text_len("abc"), 3);
        assert_eq!(GenerationPipeline::text_len("é"), 1);
        // Astral characters count as a surrogate pair.
        assert_eq!(GenerationPipeline::text_len("🎤"), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_cache_empty() {
        let (pipeline, _, upload, cache) = setup(false, None);
        let err = pipeline.run(&request("hello".into())).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to upload audio: Upload failed");
        assert_eq!(upload.calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_tts_failure_skips_upload() {
        let (pipeline, _, upload, cache) = setup(true, Some(URL));
        let err = pipeline.run(&request("hello".into())).await.unwrap_err();

        assert!(matches!(err, PipelineError::Tts(_)));
        assert_eq!(upload.calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_runs_converge_on_same_code() {
        let (pipeline, _, _, cache) = setup(false, Some(URL));
        let a = pipeline.run(&request("one".into())).await.unwrap();
        let b = pipeline.run(&request("two".into())).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }
}
