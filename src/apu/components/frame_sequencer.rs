//! Frame sequencer for the APU
//!
//! The frame sequencer divides the CPU clock into low-frequency control
//! clocks that drive the envelopes, linear counter, length counters and
//! sweep units.
//!
//! It operates in two modes:
//! - 4-step mode: quarter frames at ~240 Hz, raises the frame IRQ
//! - 5-step mode: quarter frames at ~192 Hz, never raises the IRQ

use serde::{Deserialize, Serialize};

use crate::apu::constants::{
    FRAME_SEQUENCER_4_STEP_CYCLES, FRAME_SEQUENCER_4_STEP_PERIOD, FRAME_SEQUENCER_5_STEP_CYCLES,
    FRAME_SEQUENCER_5_STEP_PERIOD,
};

/// Control clocks produced by one sequencer position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Quarter frame - clock envelopes and the linear counter
    QuarterFrame,
    /// Quarter frame plus half frame - additionally clock length counters and sweep units
    HalfFrame,
}

impl FrameEvent {
    pub fn is_half_frame(self) -> bool {
        self == FrameEvent::HalfFrame
    }
}

/// Frame sequencer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameMode {
    /// 4-step mode (default)
    FourStep,
    /// 5-step mode
    FiveStep,
}

impl FrameMode {
    fn step_cycles(self) -> &'static [u32] {
        match self {
            FrameMode::FourStep => &FRAME_SEQUENCER_4_STEP_CYCLES,
            FrameMode::FiveStep => &FRAME_SEQUENCER_5_STEP_CYCLES,
        }
    }

    fn period(self) -> u32 {
        match self {
            FrameMode::FourStep => FRAME_SEQUENCER_4_STEP_PERIOD,
            FrameMode::FiveStep => FRAME_SEQUENCER_5_STEP_PERIOD,
        }
    }

    /// Event fired at a given position
    fn event(self, step: usize) -> Option<FrameEvent> {
        match (self, step) {
            (_, 0) | (_, 2) => Some(FrameEvent::QuarterFrame),
            (_, 1) => Some(FrameEvent::HalfFrame),
            (FrameMode::FourStep, 3) => Some(FrameEvent::HalfFrame),
            (FrameMode::FiveStep, 3) => None,
            (FrameMode::FiveStep, 4) => Some(FrameEvent::HalfFrame),
            _ => None,
        }
    }
}

/// Frame sequencer, clocked once per CPU cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSequencer {
    /// Current mode (4-step or 5-step)
    mode: FrameMode,
    /// CPU cycles since the start of the current sequence
    cycle: u32,
    /// Next position in the sequence (0-3 for 4-step, 0-4 for 5-step)
    step: usize,
    /// IRQ inhibit flag (bit 6 of $4017)
    irq_inhibit: bool,
    /// Frame interrupt flag
    irq_pending: bool,
}

impl FrameSequencer {
    /// Create a new frame sequencer in 4-step mode
    pub fn new() -> Self {
        Self {
            mode: FrameMode::FourStep,
            cycle: 0,
            step: 0,
            irq_inhibit: false,
            irq_pending: false,
        }
    }

    /// Reset the frame sequencer to its power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write to the frame sequencer control register ($4017)
    ///
    /// Bit 7: Mode (0 = 4-step, 1 = 5-step)
    /// Bit 6: IRQ inhibit flag
    ///
    /// The sequence restarts immediately. Selecting 5-step mode also clocks
    /// a quarter and a half frame right away, which the returned event reports.
    pub fn write_control(&mut self, value: u8) -> Option<FrameEvent> {
        let mode = if (value & 0x80) != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        if mode != self.mode {
            log::debug!("Frame sequencer switched to {:?}", mode);
        }

        self.mode = mode;
        self.irq_inhibit = (value & 0x40) != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }

        self.cycle = 0;
        self.step = 0;

        match self.mode {
            FrameMode::FiveStep => Some(FrameEvent::HalfFrame),
            FrameMode::FourStep => None,
        }
    }

    /// Clock the frame sequencer (called every CPU cycle)
    pub fn clock(&mut self) -> Option<FrameEvent> {
        self.cycle += 1;

        let cycles = self.mode.step_cycles();
        let mut event = None;
        if self.step < cycles.len() && self.cycle == cycles[self.step] {
            event = self.mode.event(self.step);

            // The last 4-step position raises the frame interrupt
            if self.mode == FrameMode::FourStep && self.step == 3 && !self.irq_inhibit {
                self.irq_pending = true;
            }
            self.step += 1;
        }

        if self.cycle >= self.mode.period() {
            self.cycle = 0;
            self.step = 0;
        }

        event
    }

    /// Check if there's a pending frame IRQ
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Clear the IRQ flag (on a $4015 read)
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn irq_inhibited(&self) -> bool {
        self.irq_inhibit
    }
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock `count` times and collect (cycle, event) pairs
    fn run(fs: &mut FrameSequencer, count: u32) -> Vec<(u32, FrameEvent)> {
        (1..=count)
            .filter_map(|n| fs.clock().map(|event| (n, event)))
            .collect()
    }

    #[test]
    fn test_frame_sequencer_init() {
        let fs = FrameSequencer::new();
        assert_eq!(fs.mode(), FrameMode::FourStep);
        assert_eq!(fs.cycle(), 0);
        assert_eq!(fs.step(), 0);
        assert!(!fs.irq_pending());
        assert!(!fs.irq_inhibited());
    }

    #[test]
    fn test_4_step_sequence() {
        let mut fs = FrameSequencer::new();
        let events = run(&mut fs, FRAME_SEQUENCER_4_STEP_PERIOD);

        assert_eq!(
            events,
            vec![
                (7457, FrameEvent::QuarterFrame),
                (14913, FrameEvent::HalfFrame),
                (22371, FrameEvent::QuarterFrame),
                (29829, FrameEvent::HalfFrame),
            ]
        );
        assert!(fs.irq_pending());
        assert_eq!(fs.cycle(), 0);
        assert_eq!(fs.step(), 0);
    }

    #[test]
    fn test_4_step_irq_not_before_last_step() {
        let mut fs = FrameSequencer::new();
        run(&mut fs, 29828);
        assert!(!fs.irq_pending());
        fs.clock();
        assert!(fs.irq_pending());
    }

    #[test]
    fn test_4_step_sequence_repeats() {
        let mut fs = FrameSequencer::new();
        let events = run(&mut fs, FRAME_SEQUENCER_4_STEP_PERIOD * 3);
        assert_eq!(events.len(), 12);
        assert_eq!(events[4].0, FRAME_SEQUENCER_4_STEP_PERIOD + 7457);
    }

    #[test]
    fn test_5_step_sequence() {
        let mut fs = FrameSequencer::new();
        assert_eq!(fs.write_control(0x80), Some(FrameEvent::HalfFrame));

        let events = run(&mut fs, FRAME_SEQUENCER_5_STEP_PERIOD);
        assert_eq!(
            events,
            vec![
                (7457, FrameEvent::QuarterFrame),
                (14913, FrameEvent::HalfFrame),
                (22371, FrameEvent::QuarterFrame),
                (37281, FrameEvent::HalfFrame),
            ]
        );
        assert!(!fs.irq_pending());
    }

    #[test]
    fn test_irq_inhibit() {
        let mut fs = FrameSequencer::new();
        assert_eq!(fs.write_control(0x40), None);

        run(&mut fs, FRAME_SEQUENCER_4_STEP_PERIOD * 2);
        assert!(!fs.irq_pending());
    }

    #[test]
    fn test_inhibit_write_clears_pending_irq() {
        let mut fs = FrameSequencer::new();
        run(&mut fs, 29829);
        assert!(fs.irq_pending());

        fs.write_control(0x40);
        assert!(!fs.irq_pending());
    }

    #[test]
    fn test_irq_clear_on_read() {
        let mut fs = FrameSequencer::new();
        run(&mut fs, 29829);

        assert!(fs.irq_pending());
        fs.clear_irq();
        assert!(!fs.irq_pending());
    }

    #[test]
    fn test_write_resets_sequence() {
        let mut fs = FrameSequencer::new();
        run(&mut fs, 7000);
        assert_eq!(fs.cycle(), 7000);

        fs.write_control(0x00);
        assert_eq!(fs.cycle(), 0);
        assert_eq!(fs.step(), 0);

        // The first quarter frame is a full 7457 cycles after the write
        let events = run(&mut fs, 7457);
        assert_eq!(events, vec![(7457, FrameEvent::QuarterFrame)]);
    }

    #[test]
    fn test_mode_switch() {
        let mut fs = FrameSequencer::new();

        fs.write_control(0x80);
        assert_eq!(fs.mode(), FrameMode::FiveStep);

        fs.write_control(0x00);
        assert_eq!(fs.mode(), FrameMode::FourStep);
    }

    #[test]
    fn test_reset() {
        let mut fs = FrameSequencer::new();
        fs.write_control(0xC0);
        run(&mut fs, 100);

        fs.reset();
        assert_eq!(fs.mode(), FrameMode::FourStep);
        assert_eq!(fs.cycle(), 0);
        assert!(!fs.irq_inhibited());
    }
}
