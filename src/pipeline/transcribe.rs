//! The transcription pipeline: decode, chunk, submit sequentially, assemble.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::account::UsageGate;
use crate::audio::chunker::chunk_spans;
use crate::audio::decode::decode_asset;
use crate::audio::wav::encode_wav_f32;
use crate::audio::{AudioAsset, PcmBuffer};
use crate::config::AudioConfig;
use crate::error::{DecodeError, PipelineError};
use crate::services::{SpeechBackend, TranscribeOptions};

use super::assemble::assemble_transcript;
use super::event::{emit, PipelineEvent};

/// The assembled result of one transcription job.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub job_id: Uuid,
    /// One segment per chunk, in chunk order. Silent chunks are empty strings.
    pub segments: Vec<String>,
    /// Segments joined with single spaces and trimmed.
    pub text: String,
}

pub struct TranscriptionPipeline<B> {
    backend: B,
    target_rate: u32,
    max_chunk_secs: f64,
    gate: Option<UsageGate>,
}

impl<B: SpeechBackend> TranscriptionPipeline<B> {
    pub fn new(backend: B, audio: &AudioConfig) -> Self {
        Self {
            backend,
            target_rate: audio.target_sample_rate,
            max_chunk_secs: audio.max_chunk_secs,
            gate: None,
        }
    }

    /// Enforce a usage allowance before each run and record consumption after.
    pub fn with_gate(mut self, gate: UsageGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Decode an asset off the async runtime, then transcribe it.
    pub async fn transcribe_asset(
        &self,
        asset: AudioAsset,
        opts: &TranscribeOptions,
        cancel: &CancellationToken,
        progress: Option<mpsc::Sender<PipelineEvent>>,
    ) -> Result<Transcript, PipelineError> {
        // Fail fast on the capture layer's duration hint before paying for a
        // full decode; the authoritative check runs on the decoded duration.
        if let (Some(gate), Some(hint)) = (&self.gate, asset.duration_hint) {
            gate.check(hint)?;
        }

        let target_rate = self.target_rate;
        let buffer = tokio::task::spawn_blocking(move || decode_asset(asset, target_rate))
            .await
            .map_err(|e| DecodeError::Malformed(format!("decode task failed: {e}")))??;

        self.transcribe_buffer(&buffer, opts, cancel, progress).await
    }

    /// Transcribe an already-decoded buffer.
    ///
    /// Chunks are dispatched strictly one at a time; each request starts only
    /// after the previous response returned. A failed chunk aborts the run and
    /// discards every completed segment. Cancellation is honored between
    /// chunks, never mid-request.
    pub async fn transcribe_buffer(
        &self,
        buffer: &PcmBuffer,
        opts: &TranscribeOptions,
        cancel: &CancellationToken,
        progress: Option<mpsc::Sender<PipelineEvent>>,
    ) -> Result<Transcript, PipelineError> {
        let job_id = Uuid::new_v4();
        let duration_secs = buffer.duration_secs();

        if let Some(gate) = &self.gate {
            gate.check(duration_secs)?;
        }

        let spans = chunk_spans(buffer.samples.len(), buffer.sample_rate, self.max_chunk_secs);
        let total = spans.len();

        info!(%job_id, duration_secs, chunks = total, "transcription started");
        emit(
            &progress,
            PipelineEvent::Decoded {
                job_id,
                duration_secs,
                chunk_count: total,
            },
        );

        // Results land in index-addressed slots so chunk order survives even
        // if dispatch is ever made concurrent.
        let mut slots: Vec<Option<String>> = vec![None; total];

        for span in &spans {
            if cancel.is_cancelled() {
                info!(%job_id, at_chunk = span.index, "transcription cancelled");
                emit(
                    &progress,
                    PipelineEvent::Failed {
                        job_id,
                        chunk_index: Some(span.index),
                    },
                );
                return Err(PipelineError::Cancelled);
            }

            emit(
                &progress,
                PipelineEvent::ChunkStarted {
                    job_id,
                    index: span.index,
                    total,
                },
            );

            let wav = encode_wav_f32(buffer.span(span), buffer.sample_rate).map_err(|e| {
                emit(
                    &progress,
                    PipelineEvent::Failed {
                        job_id,
                        chunk_index: Some(span.index),
                    },
                );
                e
            })?;

            match self.backend.transcribe(&wav, opts).await {
                Ok(text) => {
                    slots[span.index] = Some(text);
                    emit(
                        &progress,
                        PipelineEvent::ChunkFinished {
                            job_id,
                            index: span.index,
                            total,
                        },
                    );
                }
                Err(source) => {
                    // Completed segments die with the job.
                    warn!(%job_id, chunk = span.index, error = %source, "chunk failed");
                    emit(
                        &progress,
                        PipelineEvent::Failed {
                            job_id,
                            chunk_index: Some(span.index),
                        },
                    );
                    return Err(PipelineError::Service {
                        chunk_index: span.index,
                        source,
                    });
                }
            }
        }

        if let Some(gate) = &self.gate {
            gate.record(duration_secs)?;
        }

        let segments: Vec<String> = slots
            .into_iter()
            .map(|slot| slot.unwrap_or_default())
            .collect();
        let text = assemble_transcript(&segments);

        info!(%job_id, chars = text.len(), "transcription complete");
        emit(
            &progress,
            PipelineEvent::Completed {
                job_id,
                chunk_count: total,
            },
        );

        Ok(Transcript {
            job_id,
            segments,
            text,
        })
    }
}
