// NES APU Library
// Cycle-accurate emulation of the 2A03 sound hardware

// Public modules
pub mod apu;
pub mod audio;
pub mod bus;
pub mod config;

// Re-export main types for convenience
pub use apu::{Apu, ApuSaveState, ChannelId, Register, SaveStateError};
pub use audio::{AudioStats, Mixer, Resampler, StreamBuffer, StreamReader};
#[cfg(feature = "audio")]
pub use audio::{AudioOutput, OutputError};
pub use bus::MemoryMappedDevice;
pub use config::{ApuConfig, AudioConfig, ConfigError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let apu = Apu::new();
        let _reader = apu.stream_reader();
        let _mixer = Mixer::new();
        let _config = ApuConfig::default();
        assert_eq!(apu.stats(), AudioStats::default());
    }
}
