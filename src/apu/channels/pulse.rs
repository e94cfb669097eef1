//! Pulse wave channel implementation

use serde::{Deserialize, Serialize};

use super::{require, Channel, RangeCheck, TimerCadence};
use crate::apu::components::{
    Envelope, LengthCounter, NegateMode, PulseSequencer, Sweep, Timer, WaveformGenerator,
};

/// Pulse wave channel (used for both Pulse 1 and Pulse 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseChannel {
    /// Raw register bytes
    pub(crate) registers: [u8; 4],
    /// Duty cycle sequencer
    pub(crate) sequencer: PulseSequencer,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Sweep unit
    pub(crate) sweep: Sweep,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
}

impl PulseChannel {
    const CADENCE: TimerCadence = TimerCadence::ApuCycle;

    /// Create a new pulse channel
    /// The negate mode selects the pulse 1 or pulse 2 sweep adder wiring
    pub fn new(negate_mode: NegateMode) -> Self {
        Self {
            registers: [0; 4],
            sequencer: PulseSequencer::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(negate_mode),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
        }
    }

    /// Pulse 1 ($4000-$4003)
    pub fn pulse1() -> Self {
        Self::new(NegateMode::OnesComplement)
    }

    /// Pulse 2 ($4004-$4007)
    pub fn pulse2() -> Self {
        Self::new(NegateMode::TwosComplement)
    }

    /// Check state that did not come through the registers (save states)
    pub fn check_ranges(&self) -> RangeCheck {
        require(self.sequencer.is_in_range(), "sequencer")?;
        require(self.envelope.is_in_range(), "envelope")?;
        require(self.sweep.is_in_range(), "sweep")?;
        require(self.timer.is_in_range(), "timer")
    }

    /// Register 0: DDLC VVVV (duty, halt/loop, constant volume, volume)
    fn write_control(&mut self, data: u8) {
        self.sequencer.set_duty((data >> 6) & 0x03);
        // Same bit for length counter halt and envelope loop
        self.length_counter.set_halt((data & 0x20) != 0);
        self.envelope.write_control(data);
    }

    /// Register 3: LLLL LHHH (length index, timer high)
    fn write_length_and_timer_high(&mut self, data: u8) {
        self.timer.set_period_high3(data & 0x07);
        self.sweep.track_period(self.timer.period());
        self.length_counter.load(data >> 3);

        self.envelope.restart();
        self.sequencer.restart();
    }
}

impl Channel for PulseChannel {
    fn write_register(&mut self, index: u8, data: u8) {
        let index = index & 0x03;
        self.registers[index as usize] = data;

        match index {
            0 => self.write_control(data),
            1 => self.sweep.write_control(data, &self.timer),
            2 => {
                self.timer.set_period_low8(data);
                self.sweep.track_period(self.timer.period());
            }
            _ => self.write_length_and_timer_high(data),
        }
    }

    fn registers(&self) -> &[u8; 4] {
        &self.registers
    }

    fn clock_timer(&mut self, cpu_cycle: u64) {
        if Self::CADENCE.is_due(cpu_cycle) && self.timer.clock() {
            self.sequencer.clock();
        }
    }

    fn clock_quarter_frame(&mut self) {
        self.envelope.clock();
    }

    fn clock_half_frame(&mut self) {
        self.length_counter.clock();
        self.sweep.clock(&mut self.timer);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.length_counter.set_enabled(enabled);
    }

    fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    fn output(&self) -> u8 {
        if self.sweep.is_silencing() || self.length_counter.is_silenced() {
            return 0;
        }

        let value = self.envelope.volume() * self.sequencer.output();
        debug_assert!(value < 16);
        value
    }
}
