//! cpal output stream fed from the fragment ring.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::consumer::FragmentConsumer;

/// Audio output handler that owns the cpal stream.
///
/// The stream callback runs on the audio-rendering thread and drains the
/// fragment ring through the consumer half.
pub struct AudioOutput {
    _stream: Stream,
}

impl AudioOutput {
    /// Build and start an output stream rendering from `consumer`.
    ///
    /// Returns `None` if no audio device is available.
    pub fn new(sample_rate: u32, mut consumer: FragmentConsumer) -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    consumer.fill(data);
                },
                |err| log::warn!("audio stream error: {err}"),
                None,
            )
            .ok()?;

        stream.play().ok()?;

        Some(Self { _stream: stream })
    }
}
