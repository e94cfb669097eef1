// Audio mixer - NES APU non-linear mixing
//
// The 2A03 sums its channels through a resistor network whose output is not
// linear in the channel levels. Both halves of the network are approximated
// with lookup tables computed once per process.

use std::sync::LazyLock;

use crate::apu::constants::{PULSE_TABLE_LEN, TND_TABLE_LEN};

/// Pulse mixer table, indexed by pulse1 + pulse2 (0-30)
static PULSE_TABLE: LazyLock<[f32; PULSE_TABLE_LEN]> = LazyLock::new(|| {
    let mut table = [0.0; PULSE_TABLE_LEN];
    for (n, entry) in table.iter_mut().enumerate().skip(1) {
        *entry = 95.52 / (8128.0 / n as f32 + 100.0);
    }
    table
});

/// Triangle/noise/DMC mixer table, indexed by 3 * triangle + 2 * noise + dmc (0-202)
static TND_TABLE: LazyLock<[f32; TND_TABLE_LEN]> = LazyLock::new(|| {
    let mut table = [0.0; TND_TABLE_LEN];
    for (n, entry) in table.iter_mut().enumerate().skip(1) {
        *entry = 163.67 / (24329.0 / n as f32 + 100.0);
    }
    table
});

/// APU mixer using the lookup-table approximation of the NES mixer
///
/// ```text
/// pulse_out = pulse_table[pulse1 + pulse2]
/// tnd_out   = tnd_table[3 * triangle + 2 * noise + dmc]
/// output    = pulse_out + tnd_out
/// ```
///
/// The output is in [0.0, 1.0], with silence at exactly 0.0.
#[derive(Debug, Clone, Copy)]
pub struct Mixer {
    pulse_table: &'static [f32; PULSE_TABLE_LEN],
    tnd_table: &'static [f32; TND_TABLE_LEN],
}

impl Mixer {
    /// Create a new mixer, building the tables on first use
    pub fn new() -> Self {
        Self {
            pulse_table: &PULSE_TABLE,
            tnd_table: &TND_TABLE,
        }
    }

    /// Mix all APU channels
    ///
    /// # Arguments
    ///
    /// * `pulse1` - Pulse channel 1 output (0-15)
    /// * `pulse2` - Pulse channel 2 output (0-15)
    /// * `triangle` - Triangle channel output (0-15)
    /// * `noise` - Noise channel output (0-15)
    /// * `dmc` - DMC channel output (0-127)
    ///
    /// # Returns
    ///
    /// Mixed level in range [0.0, 1.0]
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        self.pulse_out(pulse1, pulse2) + self.tnd_out(triangle, noise, dmc)
    }

    /// Pulse half of the mixer
    pub fn pulse_out(&self, pulse1: u8, pulse2: u8) -> f32 {
        debug_assert!(pulse1 < 16 && pulse2 < 16);
        self.pulse_table[(pulse1 as usize + pulse2 as usize).min(PULSE_TABLE_LEN - 1)]
    }

    /// Triangle/noise/DMC half of the mixer
    pub fn tnd_out(&self, triangle: u8, noise: u8, dmc: u8) -> f32 {
        debug_assert!(triangle < 16 && noise < 16 && dmc < 128);
        let index = 3 * triangle as usize + 2 * noise as usize + dmc as usize;
        self.tnd_table[index.min(TND_TABLE_LEN - 1)]
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
