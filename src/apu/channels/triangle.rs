//! Triangle wave channel implementation

use serde::{Deserialize, Serialize};

use super::{require, Channel, RangeCheck, TimerCadence};
use crate::apu::components::{
    LengthCounter, LinearCounter, Timer, TriangleSequencer, WaveformGenerator,
};

/// Periods below this are ultrasonic; the sequencer is frozen and the channel muted
const MIN_TIMER_PERIOD: u16 = 2;

/// Triangle wave channel for bass and melody sounds
///
/// Has no volume control. The sequencer only advances while both the
/// linear counter and the length counter are non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleChannel {
    /// Raw register bytes
    pub(crate) registers: [u8; 4],
    /// Linear counter
    pub(crate) linear_counter: LinearCounter,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// 32-step sequencer
    pub(crate) sequencer: TriangleSequencer,
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleChannel {
    const CADENCE: TimerCadence = TimerCadence::CpuCycle;

    /// Create a new triangle channel
    pub fn new() -> Self {
        Self {
            registers: [0; 4],
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::with_min_period(MIN_TIMER_PERIOD),
            sequencer: TriangleSequencer::new(),
        }
    }

    fn is_gated_open(&self) -> bool {
        self.linear_counter.is_active() && self.length_counter.is_active()
    }

    pub fn check_ranges(&self) -> RangeCheck {
        require(self.sequencer.is_in_range(), "sequencer")?;
        require(self.linear_counter.is_in_range(), "linear_counter")?;
        require(self.timer.is_in_range(), "timer")
    }
}

impl Channel for TriangleChannel {
    fn write_register(&mut self, index: u8, data: u8) {
        let index = index & 0x03;
        self.registers[index as usize] = data;

        match index {
            0 => {
                // Control bit doubles as length counter halt
                self.length_counter.set_halt((data & 0x80) != 0);
                self.linear_counter.write_control(data);
            }
            1 => {} // unused
            2 => self.timer.set_period_low8(data),
            _ => {
                self.timer.set_period_high3(data & 0x07);
                self.length_counter.load(data >> 3);
                self.linear_counter.set_reload_flag();
            }
        }
    }

    fn registers(&self) -> &[u8; 4] {
        &self.registers
    }

    fn clock_timer(&mut self, cpu_cycle: u64) {
        if Self::CADENCE.is_due(cpu_cycle) && self.timer.clock() && self.is_gated_open() {
            self.sequencer.clock();
        }
    }

    fn clock_quarter_frame(&mut self) {
        self.linear_counter.clock();
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

    /// 0-15
    fn output(&self) -> u8 {
        if !self.is_gated_open() || self.timer.period() < MIN_TIMER_PERIOD {
            return 0;
        }
        self.sequencer.output()
    }
}
