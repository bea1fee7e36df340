//! `SpeechClient` — text-to-speech over an OpenAI-compatible `/audio/speech`.
//!
//! The response body is the raw audio; it is saved by
//! [`crate::tts::voice_file::write`] into the shared temp directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::client::{endpoint, HttpTransport, RetryPolicy, TransportError};
use crate::config::TtsConfig;
use crate::tts::voice_file::{self, VoiceFileError};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur during speech synthesis.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The TTS API key is empty or still the placeholder.
    #[error("TTS API key is not configured")]
    MissingApiKey,

    /// Every attempt failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The endpoint answered with a non-2xx status.
    #[error("TTS API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request body could not be encoded.
    #[error("failed to encode TTS request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The audio could not be saved, or was empty.
    #[error(transparent)]
    VoiceFile(#[from] VoiceFileError),
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Body of a `/audio/speech` request.
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

// ---------------------------------------------------------------------------
// SpeechClient
// ---------------------------------------------------------------------------

/// Synthesizes arbitrary text and stores the audio as a voice file.
pub struct SpeechClient {
    transport: Arc<dyn HttpTransport>,
    config: TtsConfig,
    tmp_dir: PathBuf,
    retry: RetryPolicy,
}

impl SpeechClient {
    /// `tmp_dir` is where voice files are written; it is created on demand.
    pub fn new(transport: Arc<dyn HttpTransport>, config: TtsConfig, tmp_dir: PathBuf) -> Self {
        Self {
            transport,
            config,
            tmp_dir,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Synthesize `text`, naming the file after `word`.
    ///
    /// Returns the saved file's path, or `None` on any failure (logged).
    pub async fn synthesize(&self, text: &str, word: &str) -> Option<PathBuf> {
        match self.try_synthesize(text, word).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("tts: speech for {word:?} failed: {e}");
                None
            }
        }
    }

    /// Synthesize `text`, returning the saved file's path or a typed error.
    pub async fn try_synthesize(&self, text: &str, word: &str) -> Result<PathBuf, SpeechError> {
        if !self.config.has_usable_key() {
            return Err(SpeechError::MissingApiKey);
        }

        let request = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: &self.config.voice,
            response_format: &self.config.response_format,
        };
        let body = serde_json::to_value(&request)?;
        log::debug!("tts: request {body}");

        let url = endpoint(&self.config.base, "audio/speech");
        let response = self
            .retry
            .post_json(
                self.transport.as_ref(),
                "tts",
                &url,
                &self.config.api_key,
                &body,
                Duration::from_secs(self.config.timeout_secs),
            )
            .await?;

        if !response.is_success() {
            return Err(SpeechError::Status {
                status: response.status,
                body: response.text(),
            });
        }

        let path = voice_file::write(
            &self.tmp_dir,
            word,
            &self.config.response_format,
            &response.body,
        )
        .await?;

        log::info!(
            "tts: voice saved to {} ({:.2} KB)",
            path.display(),
            response.body.len() as f64 / 1024.0
        );
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpResponse, ReqwestTransport, ScriptedTransport};
    use tempfile::{tempdir, TempDir};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_key: &str) -> TtsConfig {
        TtsConfig {
            base: "http://tts.local/v1".into(),
            api_key: api_key.into(),
            ..TtsConfig::default()
        }
    }

    fn client(transport: &Arc<ScriptedTransport>, api_key: &str) -> (SpeechClient, TempDir) {
        let dir = tempdir().expect("temp dir");
        let client = SpeechClient::new(transport.clone(), config(api_key), dir.path().into());
        (client, dir)
    }

    fn files_in(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let transport = Arc::new(ScriptedTransport::unreachable());

        for key in ["", crate::config::settings::TTS_KEY_PLACEHOLDER] {
            let (client, _dir) = client(&transport, key);
            assert!(client.synthesize("quit.", "quit").await.is_none());
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn saves_audio_and_sends_config_fields() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            200,
            b"ID3fake-mp3".to_vec(),
        ))]));
        let (client, dir) = client(&transport, "sk-tts");

        let path = client
            .synthesize("quit. She decided to quit.", "quit")
            .await
            .expect("voice file");

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3fake-mp3");

        let requests = transport.requests();
        let (url, body) = &requests[0];
        assert_eq!(url, "http://tts.local/v1/audio/speech");
        assert_eq!(
            body,
            &serde_json::json!({
                "model": "FunAudioLLM/CosyVoice2-0.5B",
                "input": "quit. She decided to quit.",
                "voice": "FunAudioLLM/CosyVoice2-0.5B:diana",
                "response_format": "mp3",
            })
        );
    }

    #[tokio::test]
    async fn zero_byte_response_leaves_no_file() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(200, Vec::new()))]));
        let (client, dir) = client(&transport, "sk-tts");

        let err = client
            .try_synthesize("quit.", "quit")
            .await
            .expect_err("empty audio");

        assert!(matches!(err, SpeechError::VoiceFile(VoiceFileError::Empty)));
        assert_eq!(files_in(&dir), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            Ok(HttpResponse::new(200, b"audio".to_vec())),
        ]));
        let (client, _dir) = client(&transport, "sk-tts");
        let started = tokio::time::Instant::now();

        assert!(client.synthesize("quit.", "quit").await.is_some());
        assert_eq!(transport.calls(), 3);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn three_failures_return_none() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Connect("refused".into())),
            Err(TransportError::Connect("refused".into())),
            Err(TransportError::Connect("refused".into())),
            Ok(HttpResponse::new(200, b"audio".to_vec())),
        ]));
        let (client, dir) = client(&transport, "sk-tts");

        assert!(client.synthesize("quit.", "quit").await.is_none());
        assert_eq!(transport.calls(), 3);
        assert_eq!(files_in(&dir), 0);
    }

    #[tokio::test]
    async fn error_status_returns_none_without_retry() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(HttpResponse::new(403, "forbidden")),
            Ok(HttpResponse::new(200, b"audio".to_vec())),
        ]));
        let (client, dir) = client(&transport, "sk-tts");

        let err = client.try_synthesize("quit.", "quit").await.expect_err("403");

        assert!(matches!(err, SpeechError::Status { status: 403, .. }));
        assert_eq!(transport.calls(), 1);
        assert_eq!(files_in(&dir), 0);
    }

    #[tokio::test]
    async fn round_trip_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer sk-live"))
            .and(body_json(serde_json::json!({
                "model": "FunAudioLLM/CosyVoice2-0.5B",
                "input": "tomorrow.",
                "voice": "FunAudioLLM/CosyVoice2-0.5B:diana",
                "response_format": "wav",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFwav".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().expect("temp dir");
        let config = TtsConfig {
            base: format!("{}/v1", server.uri()),
            api_key: "sk-live".into(),
            response_format: "wav".into(),
            ..TtsConfig::default()
        };
        let client = SpeechClient::new(Arc::new(ReqwestTransport::new()), config, dir.path().into());

        let path = client.synthesize("tomorrow.", "tomorrow").await.expect("voice");

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFFwav");
    }
}
