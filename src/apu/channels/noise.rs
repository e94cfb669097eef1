//! Noise channel implementation for percussion and sound effects

use serde::{Deserialize, Serialize};

use super::{require, Channel, RangeCheck, TimerCadence};
use crate::apu::components::{
    Envelope, LengthCounter, NoiseShiftRegister, Timer, WaveformGenerator,
};
use crate::apu::constants::NOISE_PERIOD_TABLE;

/// Noise channel for percussion and sound effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseChannel {
    /// Raw register bytes
    pub(crate) registers: [u8; 4],
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// 15-bit linear feedback shift register
    pub(crate) shift_register: NoiseShiftRegister,
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseChannel {
    const CADENCE: TimerCadence = TimerCadence::ApuCycle;

    /// Create a new noise channel
    pub fn new() -> Self {
        let mut timer = Timer::new();
        timer.set_period(Self::timer_period(0));

        Self {
            registers: [0; 4],
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            timer,
            shift_register: NoiseShiftRegister::new(),
        }
    }

    /// Divider period for a table index
    /// The table is in CPU cycles and the timer is clocked on APU cycles
    fn timer_period(index: u8) -> u16 {
        NOISE_PERIOD_TABLE[(index & 0x0F) as usize] / 2 - 1
    }

    pub fn check_ranges(&self) -> RangeCheck {
        require(self.envelope.is_in_range(), "envelope")?;
        require(self.shift_register.is_in_range(), "shift_register")?;
        require(self.timer.is_in_range(), "timer")
    }
}

impl Channel for NoiseChannel {
    fn write_register(&mut self, index: u8, data: u8) {
        let index = index & 0x03;
        self.registers[index as usize] = data;

        match index {
            0 => {
                self.length_counter.set_halt((data & 0x20) != 0);
                self.envelope.write_control(data);
            }
            1 => {} // unused
            2 => {
                self.shift_register.set_short_mode((data & 0x80) != 0);
                self.timer.set_period(Self::timer_period(data));
            }
            _ => {
                self.length_counter.load(data >> 3);
                self.envelope.restart();
            }
        }
    }

    fn registers(&self) -> &[u8; 4] {
        &self.registers
    }

    fn clock_timer(&mut self, cpu_cycle: u64) {
        if Self::CADENCE.is_due(cpu_cycle) && self.timer.clock() {
            self.shift_register.clock();
        }
    }

    fn clock_quarter_frame(&mut self) {
        self.envelope.clock();
    }

    fn clock_half_frame(&mut self) {
        self.length_counter.clock();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.length_counter.set_enabled(enabled);
    }

    fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// 0 or the envelope volume
    fn output(&self) -> u8 {
        if self.length_counter.is_silenced() {
            return 0;
        }
        self.envelope.volume() * self.shift_register.output()
    }
}
