//! APU constants and lookup tables (NTSC)

/// NTSC master clock in Hz (236.25 MHz / 11)
pub const NTSC_MASTER_CLOCK: f64 = 236_250_000.0 / 11.0;

/// NTSC CPU clock in Hz (master clock / 12, ~1.789773 MHz)
pub const NTSC_CPU_CLOCK: f64 = NTSC_MASTER_CLOCK / 12.0;

/// Default host output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Length counter lookup table
/// Maps the 5-bit length counter load value to the actual counter value
pub const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Duty cycle patterns for pulse channels
/// Each pattern is 8 steps, representing one full cycle of the square wave
pub const DUTY_PATTERNS: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0], // 12.5% duty cycle
    [0, 1, 1, 0, 0, 0, 0, 0], // 25% duty cycle
    [0, 1, 1, 1, 1, 0, 0, 0], // 50% duty cycle
    [1, 0, 0, 1, 1, 1, 1, 1], // 25% negated
];

/// Triangle wave sequence for triangle channel
/// 32-step sequence from 15 down to 0, then back up to 15
pub const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15,
];

/// Noise channel period lookup table, in CPU cycles
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// DMC rate lookup table, in CPU cycles
pub const DMC_RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// CPU cycles of each 4-step sequencer position, counted from the last reset
pub const FRAME_SEQUENCER_4_STEP_CYCLES: [u32; 4] = [7457, 14913, 22371, 29829];

/// Length of one 4-step sequence in CPU cycles
pub const FRAME_SEQUENCER_4_STEP_PERIOD: u32 = 29830;

/// CPU cycles of each 5-step sequencer position, counted from the last reset
pub const FRAME_SEQUENCER_5_STEP_CYCLES: [u32; 5] = [7457, 14913, 22371, 29829, 37281];

/// Length of one 5-step sequence in CPU cycles
pub const FRAME_SEQUENCER_5_STEP_PERIOD: u32 = 37282;

/// Base address of the APU register block
pub const APU_REGISTER_BASE: u16 = 0x4000;

/// Number of entries of the pulse mixer table (pulse1 + pulse2 in 0..=30)
pub const PULSE_TABLE_LEN: usize = 31;

/// Number of entries of the triangle/noise/DMC mixer table (3t + 2n + d in 0..=202)
pub const TND_TABLE_LEN: usize = 203;
