// Audio module - mixing, resampling and sample delivery
//
// This module provides:
// - The lookup-table NES mixer
// - Downsampling from the CPU clock to the host sample rate
// - The bounded sample stream shared with the playback thread
// - Cross-platform audio output using cpal (feature `audio`)
//
// # Usage
//
// ```no_run
// use nes_apu::apu::Apu;
// use nes_apu::audio::AudioOutput;
// use nes_apu::config::AudioConfig;
//
// let config = AudioConfig::default();
// let mut apu = Apu::with_config(&config);
// let output = AudioOutput::new(config, apu.stream_reader()).unwrap();
//
// // In the emulator loop, once per CPU cycle:
// apu.step();
// ```

pub mod mixer;
#[cfg(feature = "audio")]
pub mod output;
pub mod resampler;
pub mod stream;

pub use mixer::Mixer;
#[cfg(feature = "audio")]
pub use output::{AudioOutput, OutputError};
pub use resampler::Resampler;
pub use stream::{StreamBuffer, StreamReader};

/// Sample production statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioStats {
    /// CPU cycles stepped, including those before any reset
    pub cycles: u64,
    /// Samples produced by the resampler
    pub samples_emitted: u64,
    /// Samples rejected by a full stream buffer
    pub samples_dropped: u64,
    /// Samples waiting for the consumer
    pub buffered: usize,
}

impl AudioStats {
    /// Fraction of emitted samples that were dropped (0.0-1.0)
    pub fn drop_ratio(&self) -> f64 {
        if self.samples_emitted == 0 {
            return 0.0;
        }
        self.samples_dropped as f64 / self.samples_emitted as f64
    }
}
