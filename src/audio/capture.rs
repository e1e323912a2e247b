//! Microphone capture into an in-memory PCM buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use tracing::{error, info};

use crate::error::CaptureError;

use super::buffer::PcmBuffer;

/// A running microphone recording session.
///
/// Samples flow from the cpal callback into a lock-free ring; `stop()` tears
/// the stream down and drains whatever was captured. When the ring fills up,
/// newer samples are dropped, so the ring capacity is the bound on recording
/// length.
pub struct Recorder {
    _stream: cpal::Stream,
    consumer: HeapCons<f32>,
    sample_rate: u32,
}

impl Recorder {
    /// Open the default input device and start capturing, keeping at most
    /// `max_secs` of audio.
    pub fn start(max_secs: f64) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        info!(
            device = %device.name().unwrap_or_default(),
            "opening input device"
        );

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceConfig(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;

        let capacity = (sample_rate as f64 * max_secs).ceil() as usize;
        let ring = HeapRb::<f32>::new(capacity.max(1));
        let (mut producer, consumer) = ring.split();

        let err_fn = |err| error!("input stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &_| {
                        // First channel only.
                        for &sample in data.iter().step_by(channels) {
                            let _ = producer.try_push(sample);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| CaptureError::StreamBuild(e.to_string()))?,
            cpal::SampleFormat::I16 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &_| {
                        for &sample in data.iter().step_by(channels) {
                            let _ = producer.try_push(sample as f32 / i16::MAX as f32);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| CaptureError::StreamBuild(e.to_string()))?,
            other => {
                return Err(CaptureError::UnsupportedFormat(format!("{:?}", other)));
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        info!(rate = sample_rate, channels, "capture started");

        Ok(Self {
            _stream: stream,
            consumer,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stop the stream and drain the captured samples at the device rate.
    pub fn stop(mut self) -> PcmBuffer {
        // Dropping the stream stops the callback before the drain.
        drop(self._stream);

        let mut samples = Vec::with_capacity(self.consumer.occupied_len());
        while let Some(sample) = self.consumer.try_pop() {
            samples.push(sample);
        }

        info!(frames = samples.len(), "capture stopped");
        PcmBuffer::new(samples, self.sample_rate)
    }
}
