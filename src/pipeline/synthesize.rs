//! Speech synthesis: text in, playable or downloadable audio out.

use tracing::info;

use crate::audio::wav::{dequantize_sample, encode_wav_i16};
use crate::audio::PcmBuffer;
use crate::config::AudioConfig;
use crate::error::{PipelineError, ServiceError};
use crate::services::SpeechBackend;

pub struct SynthesisPipeline<B> {
    backend: B,
    sample_rate: u32,
}

impl<B: SpeechBackend> SynthesisPipeline<B> {
    pub fn new(backend: B, audio: &AudioConfig) -> Self {
        Self {
            backend,
            sample_rate: audio.synthesis_sample_rate,
        }
    }

    /// Synthesize into a WAV byte buffer suitable for saving or download.
    pub async fn synthesize_wav(&self, text: &str, voice: &str) -> Result<Vec<u8>, PipelineError> {
        let samples = self.fetch_samples(text, voice).await?;
        Ok(encode_wav_i16(&samples, self.sample_rate)?)
    }

    /// Synthesize into a float buffer for direct playback.
    pub async fn synthesize_buffer(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<PcmBuffer, PipelineError> {
        let samples = self.fetch_samples(text, voice).await?;
        let floats: Vec<f32> = samples.into_iter().map(dequantize_sample).collect();
        Ok(PcmBuffer::new(floats, self.sample_rate))
    }

    async fn fetch_samples(&self, text: &str, voice: &str) -> Result<Vec<i16>, PipelineError> {
        let pcm = self
            .backend
            .synthesize(text, voice)
            .await
            .map_err(PipelineError::Synthesis)?;

        let samples = pcm_bytes_to_samples(&pcm).map_err(PipelineError::Synthesis)?;
        info!(
            chars = text.len(),
            frames = samples.len(),
            rate = self.sample_rate,
            "speech synthesized"
        );
        Ok(samples)
    }
}

/// Reframe raw little-endian 16-bit PCM bytes as samples.
pub fn pcm_bytes_to_samples(bytes: &[u8]) -> Result<Vec<i16>, ServiceError> {
    if bytes.len() % 2 != 0 {
        return Err(ServiceError::MalformedPayload(format!(
            "odd PCM byte count: {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
