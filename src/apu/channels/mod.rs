//! APU channel implementations
//!
//! All five channels share one capability interface, [`Channel`], which the
//! APU uses to fan out register writes, timer clocks and frame clocks.

pub mod dmc;
pub mod noise;
pub mod pulse;
pub mod triangle;

pub use dmc::DmcChannel;
pub use noise::NoiseChannel;
pub use pulse::PulseChannel;
pub use triangle::TriangleChannel;

/// Name of the first field found outside the range its register allows
pub type RangeCheck = Result<(), &'static str>;

fn require(in_range: bool, field: &'static str) -> RangeCheck {
    if in_range {
        Ok(())
    } else {
        Err(field)
    }
}

/// How often a channel's timer is clocked relative to the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCadence {
    /// Every CPU cycle (triangle)
    CpuCycle,
    /// Every second CPU cycle (pulse, noise, DMC)
    ApuCycle,
}

impl TimerCadence {
    /// Check whether the timer is due on the given CPU cycle
    pub fn is_due(self, cpu_cycle: u64) -> bool {
        match self {
            TimerCadence::CpuCycle => true,
            TimerCadence::ApuCycle => cpu_cycle % 2 == 0,
        }
    }
}

/// Common interface of the five sound channels
pub trait Channel {
    /// Decode a write to one of the channel's 4 registers (index 0-3)
    fn write_register(&mut self, index: u8, data: u8);

    /// Raw bytes last written to the channel's registers
    fn registers(&self) -> &[u8; 4];

    /// Clock the channel timer; each channel decides whether `cpu_cycle` is one of its cycles
    fn clock_timer(&mut self, cpu_cycle: u64);

    /// Quarter frame clock (envelope, linear counter)
    fn clock_quarter_frame(&mut self);

    /// Half frame clock (length counter, sweep)
    fn clock_half_frame(&mut self);

    /// Enable flag from $4015
    fn set_enabled(&mut self, enabled: bool);

    /// Status bit reported by $4015 reads
    fn is_active(&self) -> bool;

    /// Current output level (0-15, or 0-127 for the DMC)
    fn output(&self) -> u8;
}
