//! Envelope generator for controlling volume over time

use serde::{Deserialize, Serialize};

use super::Divider;

/// Envelope generator
///
/// Either outputs a constant volume or a sawtooth that decays from 15 to 0.
/// The 4-bit volume field doubles as the divider's reload value, so in
/// constant-volume mode the divider period is also the output level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Start flag - set by a write to the channel's fourth register
    pub(crate) start: bool,
    /// Loop flag (register bit 5)
    pub(crate) loop_flag: bool,
    /// Constant volume flag (register bit 4)
    pub(crate) constant_volume: bool,
    /// Decay level counter (0-15)
    pub(crate) decay_level: u8,
    divider: Divider,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            start: false,
            loop_flag: false,
            constant_volume: false,
            decay_level: 0,
            divider: Divider::new(),
        }
    }

    /// Write the envelope bits of register 0 (--LC VVVV)
    pub fn write_control(&mut self, data: u8) {
        self.set_loop((data & 0x20) != 0);
        self.set_constant_volume_mode((data & 0x10) != 0);
        self.set_volume(data & 0x0F);
    }

    pub fn set_loop(&mut self, loop_flag: bool) {
        self.loop_flag = loop_flag;
    }

    pub fn set_constant_volume_mode(&mut self, constant: bool) {
        self.constant_volume = constant;
    }

    /// Set the constant volume, which is also the decay rate
    pub fn set_volume(&mut self, volume: u8) {
        self.divider.set_period((volume & 0x0F) as u16);
    }

    /// Arm a restart; the next clock reloads the decay level
    pub fn restart(&mut self) {
        self.start = true;
    }

    /// Clock the envelope (quarter frame)
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider.reset_counter();
        } else if self.divider.clock() {
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        }
    }

    /// Get the current volume (0-15)
    pub fn volume(&self) -> u8 {
        let volume = if self.constant_volume {
            self.divider.period() as u8
        } else {
            self.decay_level
        };
        debug_assert!(volume <= 15);
        volume
    }

    /// Volume, decay level and divider all fit in 4 bits
    pub fn is_in_range(&self) -> bool {
        self.decay_level <= 15 && self.divider.period() <= 15 && self.divider.counter() <= 15
    }
}
