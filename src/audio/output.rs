// Audio output - Handles audio playback using cpal
//
// The cpal callback runs on the backend's own thread. It drains the APU's
// sample stream through a `StreamReader` and never waits for the producer:
// when no samples are available the device gets silence.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::stream::StreamReader;
use crate::config::AudioConfig;

/// Errors raised by the playback backend
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no output device available")]
    NoDevice,

    #[error("failed to query device configurations: {0}")]
    QueryConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("device does not support {sample_rate} Hz with {channels} channel(s)")]
    UnsupportedConfig { sample_rate: u32, channels: u16 },

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("failed to pause audio stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}

/// Callback-side state: pulls mono i16 samples and writes interleaved f32 frames
struct PlaybackQueue {
    reader: StreamReader,
    pending: VecDeque<i16>,
    channels: usize,
    volume: f32,
    /// Mirror of `pending.len()` for the owning thread
    pending_len: Arc<AtomicUsize>,
}

impl PlaybackQueue {
    fn new(reader: StreamReader, channels: u16, volume: f32) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            channels: channels.max(1) as usize,
            volume: volume.clamp(0.0, 1.0),
            pending_len: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fill one device buffer, padding with silence when the stream runs dry
    fn fill(&mut self, data: &mut [f32]) {
        let frames = data.len() / self.channels;
        if self.pending.len() < frames {
            if let Some(samples) = self.reader.pull() {
                self.pending.extend(samples);
            }
        }

        for frame in data.chunks_mut(self.channels) {
            let value = self
                .pending
                .pop_front()
                .map(|sample| sample as f32 / i16::MAX as f32 * self.volume)
                .unwrap_or(0.0);
            frame.fill(value);
        }

        self.pending_len.store(self.pending.len(), Ordering::Relaxed);
    }
}

/// Audio output handle
///
/// Owns the cpal stream; dropping it stops playback.
pub struct AudioOutput {
    /// Audio configuration
    config: AudioConfig,

    /// Audio stream
    stream: Stream,

    /// Samples pulled from the stream but not yet played
    pending: Arc<AtomicUsize>,
}

impl AudioOutput {
    /// Open the default output device and start playing from `reader`
    ///
    /// # Arguments
    ///
    /// * `config` - Audio configuration (rate, device channels, volume)
    /// * `reader` - Consumer side of the APU sample stream
    pub fn new(config: AudioConfig, reader: StreamReader) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

        log::info!("Audio device: {}", device.name().unwrap_or_default());

        let supported = device.supported_output_configs()?.any(|range| {
            range.channels() == config.channels
                && range.min_sample_rate().0 <= config.sample_rate
                && range.max_sample_rate().0 >= config.sample_rate
        });
        if !supported {
            return Err(OutputError::UnsupportedConfig {
                sample_rate: config.sample_rate,
                channels: config.channels,
            });
        }

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut queue = PlaybackQueue::new(reader, config.channels, config.volume);
        let pending = Arc::clone(&queue.pending_len);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| queue.fill(data),
            move |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        log::info!(
            "Audio output initialized: {} Hz, {} channel(s)",
            config.sample_rate,
            config.channels
        );

        Ok(Self {
            config,
            stream,
            pending,
        })
    }

    /// Get the audio configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Samples pulled from the stream that the device has not played yet
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), OutputError> {
        Ok(self.stream.pause()?)
    }

    /// Resume audio playback
    pub fn resume(&self) -> Result<(), OutputError> {
        Ok(self.stream.play()?)
    }
}
