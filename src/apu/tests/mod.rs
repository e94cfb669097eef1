//! APU-level tests driven through the register interface

mod noise_dmc_tests;

use crate::apu::Apu;

/// Advance the APU by `cycles` CPU cycles
pub(super) fn run_cycles(apu: &mut Apu, cycles: u32) {
    for _ in 0..cycles {
        apu.step();
    }
}
