//! Normalized mono PCM buffer shared across the chunking and encoding stages.

use super::chunker::ChunkSpan;

/// A contiguous block of mono PCM samples at a known sample rate.
///
/// Produced once by the decode stage and read-only afterwards; all chunk
/// slicing borrows from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (16000 for transcription input, 24000 for synthesis output).
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Returns the duration of this buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the samples covered by a chunk span.
    pub fn span(&self, span: &ChunkSpan) -> &[f32] {
        &self.samples[span.start_sample..span.end_sample]
    }
}
