//! Canonical 16-bit mono WAV encode/decode.
//!
//! The byte layout is the fixed 44-byte RIFF header followed by little-endian
//! i16 PCM. Existing consumers depend on the exact quantization map below, so
//! both directions mirror it.

use std::io::Cursor;

use crate::error::{DecodeError, EncodeError};

use super::buffer::PcmBuffer;

/// Fixed RIFF/fmt/data header size for the canonical layout.
pub const WAV_HEADER_LEN: usize = 44;

/// Map a float sample to i16.
///
/// Clamped to [-1, 1], then scaled by 32768 when negative and 32767 otherwise,
/// so -1.0 lands exactly on i16::MIN and +1.0 on i16::MAX without clipping.
pub fn quantize_sample(s: f32) -> i16 {
    let s = s.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0).round() as i16
    } else {
        (s * 32767.0).round() as i16
    }
}

/// Inverse of [`quantize_sample`]; exact on quantized values.
pub fn dequantize_sample(v: i16) -> f32 {
    if v < 0 {
        v as f32 / 32768.0
    } else {
        v as f32 / 32767.0
    }
}

/// Serialize float samples as a mono 16-bit WAV byte buffer.
pub fn encode_wav_f32(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
    let quantized: Vec<i16> = samples.iter().copied().map(quantize_sample).collect();
    encode_wav_i16(&quantized, sample_rate)
}

/// Serialize i16 samples as a mono 16-bit WAV byte buffer.
pub fn encode_wav_i16(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    let bytes = cursor.into_inner();

    verify_header(&bytes, samples.len())?;
    Ok(bytes)
}

/// Check the header-declared sizes against the payload actually written.
///
/// A mismatch is an internal bug, not a recoverable condition.
fn verify_header(bytes: &[u8], sample_count: usize) -> Result<(), EncodeError> {
    let data_len = (sample_count * 2) as u32;

    if bytes.len() != WAV_HEADER_LEN + sample_count * 2 {
        return Err(EncodeError::HeaderMismatch {
            declared: data_len,
            actual: bytes.len().saturating_sub(WAV_HEADER_LEN) as u32,
        });
    }

    let riff_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let declared_data = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
    if riff_len != 36 + data_len || declared_data != data_len {
        return Err(EncodeError::HeaderMismatch {
            declared: declared_data,
            actual: data_len,
        });
    }

    Ok(())
}

/// Parse a WAV byte buffer back into a mono [`PcmBuffer`].
///
/// Multi-channel input keeps only the first channel; no averaging is done.
pub fn decode_wav(bytes: &[u8]) -> Result<PcmBuffer, DecodeError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| DecodeError::UnrecognizedFormat(e.to_string()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .collect::<Result<Vec<i16>, _>>()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?
            .into_iter()
            .step_by(channels)
            .map(dequantize_sample)
            .collect(),
        (hound::SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?
            .into_iter()
            .step_by(channels)
            .map(|s| s.clamp(-1.0, 1.0))
            .collect(),
        (_, bits) => {
            return Err(DecodeError::Malformed(format!(
                "unsupported WAV sample layout: {} bits",
                bits
            )));
        }
    };

    Ok(PcmBuffer::new(samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_map_is_asymmetric() {
        assert_eq!(quantize_sample(0.0), 0);
        assert_eq!(quantize_sample(1.0), 32767);
        assert_eq!(quantize_sample(-1.0), -32768);
        assert_eq!(quantize_sample(1.5), 32767);
        assert_eq!(quantize_sample(-1.5), -32768);

        let half = quantize_sample(0.5);
        assert!(half == 16383 || half == 16384, "got {}", half);
    }

    #[test]
    fn three_sample_scenario_byte_layout() {
        let bytes = encode_wav_f32(&[0.0, 0.5, -1.0], 16_000).unwrap();
        assert_eq!(bytes.len(), 50);

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 42);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 16_000);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 32_000);
        assert_eq!(u16::from_le_bytes(bytes[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 6);

        let s1 = i16::from_le_bytes(bytes[44..46].try_into().unwrap());
        let s2 = i16::from_le_bytes(bytes[46..48].try_into().unwrap());
        let s3 = i16::from_le_bytes(bytes[48..50].try_into().unwrap());
        assert_eq!(s1, 0);
        assert!(s2 == 16383 || s2 == 16384);
        assert_eq!(s3, -32768);
    }

    #[test]
    fn header_sizes_track_sample_count() {
        for n in [0usize, 1, 7, 1024] {
            let samples = vec![0i16; n];
            let bytes = encode_wav_i16(&samples, 24_000).unwrap();
            assert_eq!(bytes.len(), 44 + 2 * n);
            let riff = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
            let data = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
            assert_eq!(riff, 36 + 2 * n as u32);
            assert_eq!(data, 2 * n as u32);
        }
    }

    #[test]
    fn round_trip_within_one_quantization_step() {
        let samples: Vec<f32> = (0..2048)
            .map(|i| ((i as f32 * 0.37).sin() * 0.9).clamp(-1.0, 1.0))
            .collect();
        let bytes = encode_wav_f32(&samples, 16_000).unwrap();
        let decoded = decode_wav(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, 16_000);
        assert_eq!(decoded.samples.len(), samples.len());
        for (orig, back) in samples.iter().zip(decoded.samples.iter()) {
            assert!(
                (orig - back).abs() <= 1.0 / 32768.0,
                "orig={} back={}",
                orig,
                back
            );
        }
    }

    #[test]
    fn i16_round_trip_is_exact() {
        let samples: Vec<i16> = vec![i16::MIN, -1, 0, 1, 12_345, i16::MAX];
        let bytes = encode_wav_i16(&samples, 24_000).unwrap();
        let decoded = decode_wav(&bytes).unwrap();
        let requantized: Vec<i16> = decoded.samples.iter().map(|&s| quantize_sample(s)).collect();
        assert_eq!(requantized, samples);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_wav(&[0u8; 16]).is_err());
    }
}
