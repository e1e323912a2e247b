//! Remote speech service client.
//!
//! Audio rides inside JSON bodies as base64; the service answers with plain
//! text fields. One request per call, no retries; a failed call is fatal to
//! whatever pipeline issued it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechTask {
    Transcribe,
    Translate,
}

impl SpeechTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechTask::Transcribe => "transcribe",
            SpeechTask::Translate => "translate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    pub task: SpeechTask,
    pub language: Option<String>,
    pub mime: String,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            task: SpeechTask::Transcribe,
            language: None,
            mime: "audio/wav".to_string(),
        }
    }
}

/// Remote operations the pipelines depend on. Abstracted so tests can swap in
/// an offline double.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Submit one audio payload, get its transcript back.
    async fn transcribe(
        &self,
        audio: &[u8],
        opts: &TranscribeOptions,
    ) -> Result<String, ServiceError>;

    /// Synthesize speech; returns raw little-endian 16-bit PCM at 24 kHz mono
    /// (not a WAV container).
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ServiceError>;

    /// Rewrite a transcript according to an instruction.
    async fn refine(&self, text: &str, instruction: &str) -> Result<String, ServiceError>;
}

/// Delegating impl so a shared handle (`Arc<B>`) can be used wherever a
/// `SpeechBackend` is required.
#[async_trait]
impl<B: SpeechBackend + ?Sized> SpeechBackend for Arc<B> {
    async fn transcribe(
        &self,
        audio: &[u8],
        opts: &TranscribeOptions,
    ) -> Result<String, ServiceError> {
        (**self).transcribe(audio, opts).await
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ServiceError> {
        (**self).synthesize(text, voice).await
    }

    async fn refine(&self, text: &str, instruction: &str) -> Result<String, ServiceError> {
        (**self).refine(text, instruction).await
    }
}

#[derive(Serialize)]
struct TranscribeRequest {
    audio_b64: String,
    mime: String,
    task: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

#[derive(Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Serialize)]
struct SynthesizeRequest {
    text: String,
    voice: String,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    audio_b64: String,
}

#[derive(Serialize)]
struct RefineRequest {
    text: String,
    instruction: String,
}

/// HTTP implementation of [`SpeechBackend`].
#[derive(Clone)]
pub struct HttpSpeechService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSpeechService {
    pub fn new(config: &ServiceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl SpeechBackend for HttpSpeechService {
    async fn transcribe(
        &self,
        audio: &[u8],
        opts: &TranscribeOptions,
    ) -> Result<String, ServiceError> {
        debug!(
            bytes = audio.len(),
            task = opts.task.as_str(),
            "submitting audio"
        );

        let request = TranscribeRequest {
            audio_b64: BASE64.encode(audio),
            mime: opts.mime.clone(),
            task: opts.task.as_str(),
            language: opts.language.clone(),
        };

        let response: TextResponse = self.post_json("/v1/audio/transcribe", &request).await?;
        Ok(response.text)
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ServiceError> {
        let request = SynthesizeRequest {
            text: text.to_string(),
            voice: voice.to_string(),
        };

        let response: SynthesizeResponse = self.post_json("/v1/audio/speech", &request).await?;
        BASE64
            .decode(&response.audio_b64)
            .map_err(|e| ServiceError::MalformedPayload(e.to_string()))
    }

    async fn refine(&self, text: &str, instruction: &str) -> Result<String, ServiceError> {
        let request = RefineRequest {
            text: text.to_string(),
            instruction: instruction.to_string(),
        };

        let response: TextResponse = self.post_json("/v1/text/refine", &request).await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_names_match_the_wire_contract() {
        assert_eq!(SpeechTask::Transcribe.as_str(), "transcribe");
        assert_eq!(SpeechTask::Translate.as_str(), "translate");
    }

    #[test]
    fn transcribe_request_omits_absent_language() {
        let request = TranscribeRequest {
            audio_b64: BASE64.encode(b"abc"),
            mime: "audio/wav".to_string(),
            task: SpeechTask::Transcribe.as_str(),
            language: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("language").is_none());
        assert_eq!(value["task"], "transcribe");
        assert_eq!(value["mime"], "audio/wav");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = ServiceConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ServiceConfig::default()
        };
        let service = HttpSpeechService::new(&config);
        assert_eq!(service.base_url, "http://localhost:8080");
    }
}
