// Common test utilities for APU integration tests
//
// Stands in for the host CPU: replays register writes at fixed cycles and
// steps the APU in between, the way a CPU core would.

#![allow(dead_code)]

use nes_apu::{Apu, MemoryMappedDevice};

/// One register write issued at a given CPU cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedWrite {
    pub cycle: u64,
    pub addr: u16,
    pub data: u8,
}

/// A cycle-ordered script of register writes
#[derive(Debug, Clone, Default)]
pub struct RegisterScript {
    writes: Vec<TimedWrite>,
}

impl RegisterScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a write at `cycle`
    pub fn write(mut self, cycle: u64, addr: u16, data: u8) -> Self {
        self.writes.push(TimedWrite { cycle, addr, data });
        self.writes.sort_by_key(|w| w.cycle);
        self
    }

    /// Run the script until `end_cycle`, calling `observe` after every step
    ///
    /// Writes scheduled before the APU's current cycle were issued by an
    /// earlier call and are skipped.
    pub fn run<F>(&self, apu: &mut Apu, end_cycle: u64, mut observe: F)
    where
        F: FnMut(&Apu),
    {
        let start = apu.cycle();
        let mut pending = self
            .writes
            .iter()
            .filter(|w| w.cycle >= start)
            .peekable();

        while apu.cycle() < end_cycle {
            let now = apu.cycle();
            while let Some(write) = pending.next_if(|w| w.cycle <= now) {
                apu.write(write.addr, write.data);
            }
            apu.step();
            observe(apu);
        }
    }
}

/// Pulse 1 playing a constant-volume tone
///
/// duty 1, constant volume 10, timer period 0x40, halt clear
pub fn pulse_tone_script(length_index: u8) -> RegisterScript {
    RegisterScript::new()
        .write(0, 0x4015, 0x01)
        .write(0, 0x4000, 0b0101_1010)
        .write(0, 0x4002, 0x40)
        .write(0, 0x4003, length_index << 3)
}
