//! Timer for controlling the frequency of waveforms

use serde::{Deserialize, Serialize};

use super::Divider;

/// Channel timer
///
/// A divider whose period is the channel's 11-bit frequency value, plus a
/// minimum-period gate that keeps ultrasonic periods from clocking the
/// waveform generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    divider: Divider,
    /// Periods below this value ignore clocks
    min_period: u16,
}

impl Timer {
    pub fn new() -> Self {
        Self::with_min_period(0)
    }

    /// Create a timer that stays idle while its period is below `min_period`
    pub fn with_min_period(min_period: u16) -> Self {
        Self {
            divider: Divider::new(),
            min_period,
        }
    }

    /// Clock the timer
    /// Returns true when the bound waveform generator should advance
    pub fn clock(&mut self) -> bool {
        if self.divider.period() < self.min_period {
            return false;
        }
        self.divider.clock()
    }

    /// Current period
    pub fn period(&self) -> u16 {
        self.divider.period()
    }

    /// Write the low 8 bits of the period; the phase keeps running
    pub fn set_period_low8(&mut self, low: u8) {
        let period = (self.divider.period() & 0x0700) | low as u16;
        self.divider.set_period(period);
    }

    /// Write the high 3 bits of the period and restart the phase
    pub fn set_period_high3(&mut self, high: u8) {
        let period = (self.divider.period() & 0x00FF) | ((high as u16 & 0x07) << 8);
        self.divider.set_period(period);
        self.divider.reset_counter();
    }

    /// Period fits the 11-bit register
    pub fn is_in_range(&self) -> bool {
        self.divider.period() <= 0x7FF && self.divider.counter() <= 0x7FF
    }

    /// Set the period directly (sweep updates, table-driven channels)
    pub fn set_period(&mut self, period: u16) {
        self.divider.set_period(period);
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
