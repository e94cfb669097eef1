// Configuration management
//
// Handles APU/audio settings and their persistence as TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::apu::constants::DEFAULT_SAMPLE_RATE;

/// Default configuration file path used by the binary
pub const CONFIG_FILE: &str = "apu_config.toml";

/// Accepted output sample rates in Hz
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=192_000;

/// Accepted stream buffer capacities in samples
pub const BUFFER_CAPACITY_RANGE: RangeInclusive<usize> = 1..=(1 << 24);

/// Accepted device channel counts
pub const CHANNELS_RANGE: RangeInclusive<u16> = 1..=8;

/// Errors that can occur while loading or saving the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApuConfig {
    /// Audio settings
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Number of device output channels (the APU itself is mono)
    pub channels: u16,

    /// Stream buffer capacity in samples
    pub buffer_capacity: usize,

    /// Playback volume (0.0-1.0)
    pub volume: f32,

    /// Enable playback
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            buffer_capacity: 50_000,
            volume: 1.0,
            enabled: true,
        }
    }
}

impl AudioConfig {
    /// Create a default audio configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output sample rate (clamped to [`SAMPLE_RATE_RANGE`])
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self.clamped()
    }

    /// Set the number of device output channels
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self.clamped()
    }

    /// Set the stream buffer capacity in samples (clamped to [`BUFFER_CAPACITY_RANGE`])
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self.clamped()
    }

    /// Set the playback volume (clamped to 0.0-1.0)
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self.clamped()
    }

    /// Pull every field into the range the APU and the device can use
    ///
    /// A zero sample rate would stop sample production and a huge buffer
    /// capacity would abort on allocation, so out-of-range values are
    /// replaced by the nearest accepted one.
    pub fn clamped(mut self) -> Self {
        let sample_rate = self
            .sample_rate
            .clamp(*SAMPLE_RATE_RANGE.start(), *SAMPLE_RATE_RANGE.end());
        if sample_rate != self.sample_rate {
            log::warn!("Sample rate {} Hz out of range, using {} Hz", self.sample_rate, sample_rate);
            self.sample_rate = sample_rate;
        }

        let capacity = self
            .buffer_capacity
            .clamp(*BUFFER_CAPACITY_RANGE.start(), *BUFFER_CAPACITY_RANGE.end());
        if capacity != self.buffer_capacity {
            log::warn!(
                "Buffer capacity {} out of range, using {}",
                self.buffer_capacity,
                capacity
            );
            self.buffer_capacity = capacity;
        }

        self.channels = self
            .channels
            .clamp(*CHANNELS_RANGE.start(), *CHANNELS_RANGE.end());
        self.volume = if self.volume.is_nan() {
            1.0
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        self
    }
}

impl ApuConfig {
    /// Load configuration from file or fall back to defaults
    ///
    /// If the file is missing or invalid, the default configuration is
    /// returned and written back to `path` (best effort).
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            log::debug!("Using default configuration ({}): {}", path.display(), e);
            let config = Self::default();
            if let Err(e) = config.save(path) {
                log::debug!("Could not write default configuration: {}", e);
            }
            config
        })
    }

    /// Load configuration from file
    ///
    /// Out-of-range audio values are clamped, see [`AudioConfig::clamped`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.audio = config.audio.clamped();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nes_apu_{}_{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = ApuConfig::default();
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.audio.channels, 1);
        assert_eq!(config.audio.buffer_capacity, 50_000);
        assert_eq!(config.audio.volume, 1.0);
        assert!(config.audio.enabled);
    }

    #[test]
    fn test_builder_setters() {
        let audio = AudioConfig::new()
            .with_sample_rate(48_000)
            .with_channels(2)
            .with_buffer_capacity(1024)
            .with_volume(3.0);

        assert_eq!(audio.sample_rate, 48_000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.buffer_capacity, 1024);
        assert_eq!(audio.volume, 1.0);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let audio = AudioConfig {
            sample_rate: 0,
            channels: 0,
            buffer_capacity: usize::MAX,
            volume: f32::NAN,
            enabled: true,
        }
        .clamped();

        assert_eq!(audio.sample_rate, *SAMPLE_RATE_RANGE.start());
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.buffer_capacity, *BUFFER_CAPACITY_RANGE.end());
        assert_eq!(audio.volume, 1.0);

        let audio = AudioConfig::new()
            .with_sample_rate(1_000_000)
            .with_buffer_capacity(0);
        assert_eq!(audio.sample_rate, *SAMPLE_RATE_RANGE.end());
        assert_eq!(audio.buffer_capacity, 1);
    }

    #[test]
    fn test_load_clamps_file_values() {
        let path = temp_config_path("clamp");
        fs::write(
            &path,
            "[audio]\nsample_rate = 0\nbuffer_capacity = 9223372036854775807\n",
        )
        .expect("Failed to write");

        let loaded = ApuConfig::load(&path).expect("Failed to load");
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.audio.sample_rate, *SAMPLE_RATE_RANGE.start());
        assert_eq!(loaded.audio.buffer_capacity, *BUFFER_CAPACITY_RANGE.end());
    }

    #[test]
    fn test_config_serialization() {
        let config = ApuConfig {
            audio: AudioConfig::new().with_sample_rate(48_000),
        };
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: ApuConfig = toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ApuConfig =
            toml::from_str("[audio]\nsample_rate = 22050\n").expect("Failed to parse");
        assert_eq!(config.audio.sample_rate, 22_050);
        assert_eq!(config.audio.buffer_capacity, 50_000);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_config_path("save_load");
        let config = ApuConfig {
            audio: AudioConfig::new().with_volume(0.25),
        };

        config.save(&path).expect("Failed to save");
        let loaded = ApuConfig::load(&path).expect("Failed to load");
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.audio.volume, 0.25);
    }

    #[test]
    fn test_load_invalid_file() {
        let path = temp_config_path("invalid");
        fs::write(&path, "audio = 3").expect("Failed to write");

        let result = ApuConfig::load(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default_writes_missing_file() {
        let path = temp_config_path("missing");
        let _ = fs::remove_file(&path);

        let config = ApuConfig::load_or_default(&path);

        assert_eq!(config, ApuConfig::default());
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }
}
