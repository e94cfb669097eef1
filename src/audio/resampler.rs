// Audio resampler - Converts the per-cycle mixer output to the host rate
//
// The APU produces one mixed level per CPU cycle (~1.789773 MHz). Each
// output sample is the box average of every level that arrived since the
// previous sample. The number of cycles per sample is not an integer, so the
// fractional remainder is carried forward to keep the long-run rate exact.

use serde::{Deserialize, Serialize};

use crate::apu::constants::NTSC_CPU_CLOCK;

/// Averaging downsampler with a fractional cycle accumulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resampler {
    /// Output sample rate in Hz
    output_rate: u32,

    /// Input cycles per output sample (input rate / output rate)
    cycles_per_sample: f64,

    /// Cycles accumulated towards the next output sample
    cycle_accumulator: f64,

    /// Sum of the levels since the last emitted sample
    sample_sum: f64,

    /// Number of levels in `sample_sum`
    sample_count: u32,
}

impl Resampler {
    /// Create a new resampler
    ///
    /// # Arguments
    ///
    /// * `input_rate` - Input rate in Hz (the CPU clock)
    /// * `output_rate` - Output sample rate in Hz
    pub fn new(input_rate: f64, output_rate: u32) -> Self {
        debug_assert!(output_rate > 0);
        Self {
            output_rate,
            cycles_per_sample: input_rate / output_rate as f64,
            cycle_accumulator: 0.0,
            sample_sum: 0.0,
            sample_count: 0,
        }
    }

    /// Create a resampler fed by the NTSC CPU clock
    pub fn ntsc(output_rate: u32) -> Self {
        Self::new(NTSC_CPU_CLOCK, output_rate)
    }

    /// Add one mixer level (0.0-1.0) for the current cycle
    ///
    /// Returns the averaged signed 16-bit sample once enough cycles have
    /// accumulated, `None` otherwise.
    pub fn push(&mut self, level: f32) -> Option<i16> {
        self.sample_sum += level as f64;
        self.sample_count += 1;
        self.cycle_accumulator += 1.0;

        if self.cycle_accumulator < self.cycles_per_sample {
            return None;
        }

        let average = self.sample_sum / self.sample_count as f64;
        self.sample_sum = 0.0;
        self.sample_count = 0;
        self.cycle_accumulator -= self.cycles_per_sample;

        Some((average.clamp(0.0, 1.0) * i16::MAX as f64) as i16)
    }

    /// Drop any partial sample and the accumulated remainder
    pub fn reset(&mut self) {
        self.cycle_accumulator = 0.0;
        self.sample_sum = 0.0;
        self.sample_count = 0;
    }

    /// Output sample rate in Hz
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Input cycles per output sample
    pub fn cycles_per_sample(&self) -> f64 {
        self.cycles_per_sample
    }

    /// Downsampling ratio and accumulator are usable (checked on save state load)
    pub fn is_in_range(&self) -> bool {
        self.output_rate > 0
            && self.cycles_per_sample.is_finite()
            && self.cycles_per_sample >= 1.0
            && self.cycle_accumulator.is_finite()
            && self.sample_sum.is_finite()
    }
}
