//! Waveform generators stepped by a channel's timer
//!
//! Each generator holds a phase that advances once per timer firing and
//! derives its output level from that phase.

use serde::{Deserialize, Serialize};

use crate::apu::constants::{DUTY_PATTERNS, TRIANGLE_SEQUENCE};

/// Common interface of the per-channel phase sequencers
pub trait WaveformGenerator {
    /// Advance one step (called when the bound timer fires)
    fn clock(&mut self);

    /// Current raw output level
    fn output(&self) -> u8;
}

/// 8-step duty cycle sequencer of the pulse channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseSequencer {
    /// Duty cycle selector (0-3)
    pub(crate) duty: u8,
    /// Position in the duty sequence (0-7)
    pub(crate) step: u8,
}

impl PulseSequencer {
    pub fn new() -> Self {
        Self { duty: 0, step: 0 }
    }

    pub fn set_duty(&mut self, duty: u8) {
        debug_assert!(duty < 4);
        self.duty = duty & 0x03;
    }

    /// Restart the sequence from its first step
    pub fn restart(&mut self) {
        self.step = 0;
    }

    /// Duty selector and step are both inside their tables
    pub fn is_in_range(&self) -> bool {
        self.duty < 4 && self.step < 8
    }
}

impl WaveformGenerator for PulseSequencer {
    fn clock(&mut self) {
        self.step = (self.step + 1) % 8;
    }

    /// 0 or 1
    fn output(&self) -> u8 {
        DUTY_PATTERNS[self.duty as usize][self.step as usize]
    }
}

/// 32-step triangle sequencer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleSequencer {
    /// Position in the sequence (0-31)
    pub(crate) step: u8,
}

impl TriangleSequencer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn is_in_range(&self) -> bool {
        (self.step as usize) < TRIANGLE_SEQUENCE.len()
    }
}

impl WaveformGenerator for TriangleSequencer {
    fn clock(&mut self) {
        self.step = (self.step + 1) % 32;
    }

    /// 0-15
    fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[self.step as usize]
    }
}

/// 15-bit linear feedback shift register of the noise channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseShiftRegister {
    pub(crate) lfsr: u16,
    /// Short mode: feedback from bit 6 instead of bit 1
    pub(crate) short_mode: bool,
}

impl NoiseShiftRegister {
    pub fn new() -> Self {
        Self {
            lfsr: 1,
            short_mode: false,
        }
    }

    pub fn set_short_mode(&mut self, short_mode: bool) {
        self.short_mode = short_mode;
    }

    /// 15-bit register; all zeroes would lock the sequence up
    pub fn is_in_range(&self) -> bool {
        self.lfsr != 0 && self.lfsr <= 0x7FFF
    }
}

impl Default for NoiseShiftRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformGenerator for NoiseShiftRegister {
    fn clock(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let feedback = (self.lfsr ^ (self.lfsr >> tap)) & 0x01;
        self.lfsr = (self.lfsr >> 1) | (feedback << 14);
    }

    /// 1 when the channel should sound (bit 0 clear)
    fn output(&self) -> u8 {
        (!self.lfsr & 0x01) as u8
    }
}
