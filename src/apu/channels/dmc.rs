//! DMC (Delta Modulation Channel) implementation for sample playback
//!
//! The channel never touches memory itself. The host polls
//! [`DmcChannel::sample_request`] and answers with
//! [`DmcChannel::load_sample`] once it has fetched the byte.

use serde::{Deserialize, Serialize};

use super::{require, Channel, RangeCheck, TimerCadence};
use crate::apu::components::Timer;
use crate::apu::constants::DMC_RATE_TABLE;

/// DMC channel for sample playback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmcChannel {
    /// Raw register bytes
    pub(crate) registers: [u8; 4],

    /// IRQ enable flag
    pub(crate) irq_enabled: bool,

    /// Loop flag
    pub(crate) loop_flag: bool,

    /// Rate timer
    pub(crate) timer: Timer,

    /// Sample address ($C000 + address * 64)
    pub(crate) sample_address: u16,

    /// Sample length (length * 16 + 1 bytes)
    pub(crate) sample_length: u16,

    /// Address of the next byte to fetch
    pub(crate) current_address: u16,

    /// Bytes left to fetch
    pub(crate) bytes_remaining: u16,

    /// One-byte sample buffer filled by the host
    pub(crate) sample_buffer: Option<u8>,

    /// Output shift register
    pub(crate) shift_register: u8,

    /// Bits left in the current output cycle (1-8)
    pub(crate) bits_remaining: u8,

    /// Output level (7-bit counter, 0-127)
    pub(crate) output_level: u8,

    /// Silence flag
    pub(crate) silence: bool,

    /// IRQ pending flag
    pub(crate) irq_flag: bool,
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DmcChannel {
    const CADENCE: TimerCadence = TimerCadence::ApuCycle;

    /// Create a new DMC channel
    pub fn new() -> Self {
        let mut timer = Timer::new();
        timer.set_period(Self::timer_period(0));

        Self {
            registers: [0; 4],
            irq_enabled: false,
            loop_flag: false,
            timer,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            output_level: 0,
            silence: true,
            irq_flag: false,
        }
    }

    /// Divider period for a rate index (table is in CPU cycles)
    fn timer_period(index: u8) -> u16 {
        DMC_RATE_TABLE[(index & 0x0F) as usize] / 2 - 1
    }

    pub fn check_ranges(&self) -> RangeCheck {
        require(self.timer.is_in_range(), "timer")?;
        require((1..=8).contains(&self.bits_remaining), "bits_remaining")?;
        require(self.output_level <= 0x7F, "output_level")?;
        require(self.current_address >= 0x8000, "current_address")?;
        require(self.sample_address >= 0xC000, "sample_address")?;
        require(self.sample_length <= 0xFF1, "sample_length")
    }

    /// Restart the sample from its first byte
    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Check if an IRQ is pending
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Acknowledge the IRQ (done by any $4015 write)
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Address the host should read next, if the sample buffer is empty
    pub fn sample_request(&self) -> Option<u16> {
        if self.sample_buffer.is_none() && self.bytes_remaining > 0 {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Deliver the byte read from the address returned by [`Self::sample_request`]
    pub fn load_sample(&mut self, byte: u8) {
        if self.bytes_remaining == 0 {
            log::trace!("DMC sample byte ignored, no bytes remaining");
            return;
        }

        self.sample_buffer = Some(byte);

        // Address space wraps from $FFFF back to $8000
        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };

        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    /// Clock the output unit (called when the timer fires)
    fn clock_output_unit(&mut self) {
        if !self.silence {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }

        self.shift_register >>= 1;
        self.bits_remaining -= 1;

        if self.bits_remaining == 0 {
            // Start a new output cycle
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(byte) => {
                    self.shift_register = byte;
                    self.silence = false;
                }
                None => self.silence = true,
            }
        }
    }
}

impl Channel for DmcChannel {
    fn write_register(&mut self, index: u8, data: u8) {
        let index = index & 0x03;
        self.registers[index as usize] = data;

        match index {
            0 => {
                // IL-- RRRR
                self.irq_enabled = (data & 0x80) != 0;
                self.loop_flag = (data & 0x40) != 0;
                if !self.irq_enabled {
                    self.irq_flag = false;
                }
                self.timer.set_period(Self::timer_period(data));
            }
            1 => self.output_level = data & 0x7F,
            2 => self.sample_address = 0xC000 | ((data as u16) << 6),
            _ => self.sample_length = ((data as u16) << 4) + 1,
        }
    }

    fn registers(&self) -> &[u8; 4] {
        &self.registers
    }

    fn clock_timer(&mut self, cpu_cycle: u64) {
        if Self::CADENCE.is_due(cpu_cycle) && self.timer.clock() {
            self.clock_output_unit();
        }
    }

    fn clock_quarter_frame(&mut self) {}

    fn clock_half_frame(&mut self) {}

    fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// 0-127
    fn output(&self) -> u8 {
        self.output_level
    }
}
