//! Mono sample-rate conversion on top of rubato's sinc resampler.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::error::DecodeError;

use super::buffer::PcmBuffer;

const CHUNK_FRAMES: usize = 1024;

/// Fixed-ratio mono resampler. Feeds the sinc stage in fixed-size chunks and
/// zero-pads the tail, trimming the output back to the valid length.
pub struct MonoResampler {
    inner: SincFixedIn<f32>,
    from_rate: u32,
    to_rate: u32,
}

impl MonoResampler {
    pub fn new(from_rate: u32, to_rate: u32) -> Result<Self, DecodeError> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let inner = SincFixedIn::<f32>::new(
            to_rate as f64 / from_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

        Ok(Self {
            inner,
            from_rate,
            to_rate,
        })
    }

    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>, DecodeError> {
        let ratio = self.to_rate as f64 / self.from_rate as f64;
        let mut output = Vec::with_capacity((input.len() as f64 * ratio) as usize + CHUNK_FRAMES);

        for chunk in input.chunks(CHUNK_FRAMES) {
            if chunk.len() == CHUNK_FRAMES {
                let waves_out = self
                    .inner
                    .process(&[chunk.to_vec()], None)
                    .map_err(|e| DecodeError::Resample(e.to_string()))?;
                output.extend_from_slice(&waves_out[0]);
            } else {
                // Tail: pad to the fixed frame count, keep only the part that
                // corresponds to real input.
                let mut padded = chunk.to_vec();
                padded.resize(CHUNK_FRAMES, 0.0);
                let waves_out = self
                    .inner
                    .process(&[padded], None)
                    .map_err(|e| DecodeError::Resample(e.to_string()))?;
                let valid = (chunk.len() as f64 * ratio) as usize;
                output.extend_from_slice(&waves_out[0][..valid.min(waves_out[0].len())]);
            }
        }

        Ok(output)
    }
}

/// Bring a buffer to `target_rate`, passing it through untouched when the
/// rate already matches.
pub fn to_target_rate(buffer: PcmBuffer, target_rate: u32) -> Result<PcmBuffer, DecodeError> {
    if buffer.sample_rate == target_rate || buffer.is_empty() {
        return Ok(PcmBuffer::new(buffer.samples, target_rate));
    }

    debug!(
        from = buffer.sample_rate,
        to = target_rate,
        frames = buffer.samples.len(),
        "resampling"
    );

    let mut resampler = MonoResampler::new(buffer.sample_rate, target_rate)?;
    let samples = resampler.resample(&buffer.samples)?;
    Ok(PcmBuffer::new(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_tracks_ratio() {
        let input: Vec<f32> = (0..48_000)
            .map(|i| (i as f32 * 0.01).sin() * 0.5)
            .collect();
        let mut resampler = MonoResampler::new(48_000, 16_000).unwrap();
        let output = resampler.resample(&input).unwrap();

        let expected = input.len() / 3;
        let tolerance = CHUNK_FRAMES;
        assert!(
            output.len().abs_diff(expected) <= tolerance,
            "expected ~{} samples, got {}",
            expected,
            output.len()
        );
    }

    #[test]
    fn matching_rate_is_a_passthrough() {
        let buf = PcmBuffer::new(vec![0.25; 1000], 16_000);
        let out = to_target_rate(buf.clone(), 16_000).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn empty_buffer_is_a_passthrough() {
        let out = to_target_rate(PcmBuffer::new(Vec::new(), 44_100), 16_000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate, 16_000);
    }
}
