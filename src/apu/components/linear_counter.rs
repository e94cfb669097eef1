//! Linear counter for the triangle channel

use serde::{Deserialize, Serialize};

/// Linear counter for the triangle channel
///
/// A finer-grained duration gate clocked every quarter frame. It reloads
/// while the reload flag is set and the flag is only released once the
/// control bit is cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearCounter {
    /// Counter value
    pub(crate) counter: u8,
    /// Reload value (register bits 6-0)
    pub(crate) reload_value: u8,
    /// Control flag (register bit 7, doubles as length counter halt)
    pub(crate) control_flag: bool,
    /// Reload flag - set when register 3 is written
    pub(crate) reload_flag: bool,
}

impl LinearCounter {
    pub fn new() -> Self {
        Self {
            counter: 0,
            reload_value: 0,
            control_flag: false,
            reload_flag: false,
        }
    }

    /// Clock the linear counter (quarter frame)
    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !self.control_flag {
            self.reload_flag = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    /// Write the linear counter control register (CRRR RRRR)
    pub fn write_control(&mut self, data: u8) {
        self.control_flag = (data & 0x80) != 0;
        self.reload_value = data & 0x7F;
    }

    pub fn set_reload_flag(&mut self) {
        self.reload_flag = true;
    }

    pub fn is_in_range(&self) -> bool {
        self.counter <= 0x7F && self.reload_value <= 0x7F
    }
}
