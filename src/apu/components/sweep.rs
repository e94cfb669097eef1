//! Sweep unit for pitch bending

use serde::{Deserialize, Serialize};

use super::{Divider, Timer};

/// Which adder wiring the sweep unit uses when negating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegateMode {
    /// Pulse 1: subtracts the change plus one
    OnesComplement,
    /// Pulse 2: subtracts the change
    TwosComplement,
}

/// Sweep unit for pitch bending
///
/// The target period is recomputed from the timer's live period whenever
/// either changes, so `is_silencing` always reflects the latest write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweep {
    /// Enabled flag
    pub(crate) enabled: bool,
    /// Negate flag (pitch bend direction)
    pub(crate) negate: bool,
    /// Reload flag, set by writes to register 1
    pub(crate) reload: bool,
    /// Shift amount (0-7)
    pub(crate) shift: u8,
    /// Extra amount subtracted when negating (1 for pulse 1, 0 for pulse 2)
    subtract_extra: u16,
    divider: Divider,
    /// Period the timer would be set to on the next update
    target_period: u16,
    /// Mute flag derived from the current and target periods
    silence: bool,
}

impl Sweep {
    pub fn new(mode: NegateMode) -> Self {
        Self {
            enabled: false,
            negate: false,
            reload: false,
            shift: 0,
            subtract_extra: match mode {
                NegateMode::OnesComplement => 1,
                NegateMode::TwosComplement => 0,
            },
            divider: Divider::new(),
            target_period: 0,
            silence: true,
        }
    }

    /// Adder wiring of this unit
    pub fn negate_mode(&self) -> NegateMode {
        if self.subtract_extra == 1 {
            NegateMode::OnesComplement
        } else {
            NegateMode::TwosComplement
        }
    }

    /// Write the sweep control register (EPPP NSSS)
    ///
    /// Sets the reload flag and recomputes the target from the timer.
    pub fn write_control(&mut self, data: u8, timer: &Timer) {
        self.enabled = (data & 0x80) != 0;
        self.divider.set_period(((data >> 4) & 0x07) as u16);
        self.negate = (data & 0x08) != 0;
        self.shift = data & 0x07;
        self.reload = true;
        self.track_period(timer.period());
    }

    /// Calculate the target period for a given current period
    pub fn calculate_target_period(&self, current_period: u16) -> u16 {
        let change = current_period >> self.shift;
        if self.negate {
            current_period
                .saturating_sub(change)
                .saturating_sub(self.subtract_extra)
        } else {
            current_period + change
        }
    }

    /// Recompute the target period and the mute flag
    pub fn track_period(&mut self, current_period: u16) {
        self.target_period = self.calculate_target_period(current_period);
        self.silence = current_period < 8 || self.target_period > 0x7FF;
    }

    /// Period the next adjustment would apply
    pub fn target_period(&self) -> u16 {
        self.target_period
    }

    /// Check if the sweep unit is muting the channel (independent of `enabled`)
    pub fn is_silencing(&self) -> bool {
        self.silence
    }

    /// Clock the sweep unit (half frame)
    pub fn clock(&mut self, timer: &mut Timer) {
        // Mute and target are taken from the period before this adjustment
        self.track_period(timer.period());

        if self.reload {
            if self.divider.clock() && self.should_adjust() {
                timer.set_period(self.target_period);
            }
            self.divider.reset_counter();
            self.reload = false;
        } else if self.divider.clock() && self.should_adjust() {
            timer.set_period(self.target_period);
        }

        self.track_period(timer.period());
    }

    /// Shift and divider period fit in 3 bits
    pub fn is_in_range(&self) -> bool {
        self.shift <= 7 && self.divider.period() <= 7 && self.divider.counter() <= 7
    }

    fn should_adjust(&self) -> bool {
        self.enabled && self.shift > 0 && !self.silence
    }
}
