//! Length counter for controlling note duration

use serde::{Deserialize, Serialize};

use crate::apu::constants::LENGTH_COUNTER_TABLE;

/// Length counter for controlling note duration
///
/// The channel is silenced exactly when the counter reads 0. Disabling the
/// counter (through the status register) clears it and blocks loads until
/// it is enabled again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LengthCounter {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Halt flag (shares its register bit with envelope loop / linear control)
    pub(crate) halt: bool,
    /// Counter value
    pub(crate) counter: u8,
}

impl LengthCounter {
    pub fn new() -> Self {
        Self {
            enabled: false,
            halt: false,
            counter: 0,
        }
    }

    /// Enable or disable the counter; disabling clears it immediately
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.counter = 0;
        }
    }

    /// Set the halt flag
    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Load a new counter value from the length table (ignored while disabled)
    pub fn load(&mut self, index: u8) {
        if self.enabled {
            self.counter = LENGTH_COUNTER_TABLE[(index & 0x1F) as usize];
        }
    }

    /// Clock the length counter (half frame)
    pub fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Current counter value
    pub fn value(&self) -> u8 {
        self.counter
    }

    /// Check if the counter has run out
    pub fn is_silenced(&self) -> bool {
        self.counter == 0
    }

    /// Check if the length counter is non-zero
    pub fn is_active(&self) -> bool {
        self.counter > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counter_load_from_table() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);

        lc.load(0);
        assert_eq!(lc.value(), 10);
        lc.load(1);
        assert_eq!(lc.value(), 254);
        lc.load(31);
        assert_eq!(lc.value(), 30);
    }

    #[test]
    fn test_length_counter_disable_clears_and_blocks_loads() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load(1);
        assert_eq!(lc.value(), 254);

        lc.set_enabled(false);
        assert_eq!(lc.value(), 0);
        assert!(lc.is_silenced());

        // Loads are no-ops while disabled
        lc.load(1);
        assert_eq!(lc.value(), 0);

        lc.set_enabled(true);
        lc.load(3);
        assert_eq!(lc.value(), 2);
    }

    #[test]
    fn test_length_counter_clock_decrements_to_zero() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load(3); // 2

        lc.clock();
        assert_eq!(lc.value(), 1);
        lc.clock();
        assert_eq!(lc.value(), 0);
        lc.clock();
        assert_eq!(lc.value(), 0);
        assert!(lc.is_silenced());
    }

    #[test]
    fn test_length_counter_halt_freezes_value() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.set_halt(true);
        lc.load(0);

        for _ in 0..100 {
            lc.clock();
        }
        assert_eq!(lc.value(), 10);

        // Loads still work while halted
        lc.load(2);
        assert_eq!(lc.value(), 20);
    }
}
