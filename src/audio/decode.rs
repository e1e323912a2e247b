//! Container/codec decoding into normalized mono PCM.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::error::DecodeError;

use super::asset::AudioAsset;
use super::buffer::PcmBuffer;
use super::resample::to_target_rate;

/// Decode an asset and bring it to `target_rate`.
///
/// The asset is consumed; decoding happens exactly once per capture. Multi-
/// channel sources keep only the first channel. Any probe or packet failure
/// is fatal to the whole attempt; there is no partial decode.
pub fn decode_asset(asset: AudioAsset, target_rate: u32) -> Result<PcmBuffer, DecodeError> {
    let mime = asset.mime.clone();
    let native = decode_native(asset)?;
    info!(
        source_rate = native.sample_rate,
        duration_secs = native.duration_secs(),
        mime = %mime,
        "decoded audio"
    );
    to_target_rate(native, target_rate)
}

/// Decode an asset to mono f32 at its native sample rate.
pub fn decode_native(asset: AudioAsset) -> Result<PcmBuffer, DecodeError> {
    let mut hint = Hint::new();
    if let Some(ext) = asset.extension() {
        hint.with_extension(ext);
    }

    let source = Cursor::new(asset.bytes);
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnrecognizedFormat(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnrecognizedFormat(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Malformed(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);

        let needs_new = match &sample_buf {
            Some(buf) => buf.capacity() < decoded.capacity() * channels,
            None => true,
        };
        if needs_new {
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }

        let buf = sample_buf.as_mut().unwrap();
        buf.copy_interleaved_ref(decoded);

        // First channel only; the remaining channels are dropped, not averaged.
        samples.extend(
            buf.samples()
                .iter()
                .step_by(channels)
                .map(|&s| s.clamp(-1.0, 1.0)),
        );
    }

    debug!(frames = samples.len(), rate = sample_rate, "decode complete");
    Ok(PcmBuffer::new(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::encode_wav_f32;

    #[test]
    fn wav_asset_round_trips_through_probe() {
        let original: Vec<f32> = (0..4_000).map(|i| (i as f32 * 0.02).sin() * 0.8).collect();
        let bytes = encode_wav_f32(&original, 16_000).unwrap();
        let asset = AudioAsset::new(bytes, "audio/wav");

        let decoded = decode_asset(asset, 16_000).unwrap();
        assert_eq!(decoded.sample_rate, 16_000);
        assert_eq!(decoded.samples.len(), original.len());
        for (a, b) in original.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 1e-3, "a={} b={}", a, b);
        }
    }

    #[test]
    fn stereo_input_keeps_first_channel_only() {
        // Interleaved stereo: left is a ramp, right is its negation.
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..1_000i16 {
                writer.write_sample(i * 8).unwrap();
                writer.write_sample(-(i * 8)).unwrap();
            }
            writer.finalize().unwrap();
        }
        let asset = AudioAsset::new(cursor.into_inner(), "audio/wav");

        let decoded = decode_native(asset).unwrap();
        assert_eq!(decoded.samples.len(), 1_000);
        // Left channel is non-negative by construction.
        assert!(decoded.samples.iter().skip(1).all(|&s| s > 0.0));
    }

    #[test]
    fn garbage_bytes_fail_the_probe() {
        let asset = AudioAsset::new(
            vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
            "application/octet-stream",
        );
        assert!(decode_native(asset).is_err());
    }
}
