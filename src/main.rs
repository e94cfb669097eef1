// NES APU - Demo player
//
// Plays a short tune through the default output device. Every sound is
// produced by register writes, exactly as a game program would drive the
// APU, and the APU is stepped one CPU cycle at a time in real time.

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use nes_apu::apu::constants::NTSC_CPU_CLOCK;
use nes_apu::config::CONFIG_FILE;
use nes_apu::{ApuConfig, Apu, AudioOutput, MemoryMappedDevice};

/// Emulated frames per second (NTSC)
const FRAME_RATE: f64 = 60.0988;

/// Frames per sixteenth note
const FRAMES_PER_STEP: u32 = 8;

/// Lead line in MIDI note numbers (0 = rest)
const MELODY: [u8; 32] = [
    76, 76, 0, 76, 0, 72, 76, 0, 79, 0, 0, 0, 67, 0, 0, 0, 72, 0, 0, 67, 0, 0, 64, 0, 0, 69, 0,
    71, 0, 70, 69, 0,
];

/// Bass line in MIDI note numbers (0 = rest)
const BASS: [u8; 32] = [
    50, 0, 50, 0, 50, 0, 50, 0, 55, 0, 55, 0, 43, 0, 43, 0, 55, 0, 0, 52, 0, 0, 48, 0, 0, 53, 0,
    55, 0, 54, 53, 0,
];

fn note_frequency(note: u8) -> f64 {
    440.0 * 2f64.powf((note as f64 - 69.0) / 12.0)
}

/// Pulse timer period: f = CPU / (16 * (t + 1))
fn pulse_period(note: u8) -> u16 {
    (NTSC_CPU_CLOCK / (16.0 * note_frequency(note)) - 1.0).round() as u16
}

/// Triangle timer period: f = CPU / (32 * (t + 1))
fn triangle_period(note: u8) -> u16 {
    (NTSC_CPU_CLOCK / (32.0 * note_frequency(note)) - 1.0).round() as u16
}

fn play_step(apu: &mut Apu, step: usize) {
    let lead = MELODY[step % MELODY.len()];
    if lead != 0 {
        let period = pulse_period(lead);
        apu.write(0x4000, 0b1000_0110); // 50% duty, decaying envelope
        apu.write(0x4002, period as u8);
        apu.write(0x4003, 0x08 | ((period >> 8) as u8 & 0x07));

        // Second pulse doubles the lead quietly, slightly detuned and sweeping
        let period = period + 1;
        apu.write(0x4004, 0b0101_0011);
        apu.write(0x4005, 0b1111_1111);
        apu.write(0x4006, period as u8);
        apu.write(0x4007, 0x08 | ((period >> 8) as u8 & 0x07));
    }

    let bass = BASS[step % BASS.len()];
    if bass != 0 {
        let period = triangle_period(bass);
        apu.write(0x4008, 0x18); // linear counter 24 quarter frames
        apu.write(0x400A, period as u8);
        apu.write(0x400B, 0x08 | ((period >> 8) as u8 & 0x07));
    }

    // Hi-hat on every other step
    if step % 2 == 0 {
        apu.write(0x400C, 0b0000_0010);
        apu.write(0x400E, 0x03);
        apu.write(0x400F, 0x18);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("NES APU (nes-apu) v{}", env!("CARGO_PKG_VERSION"));
    println!("==============================");
    println!();

    let config = ApuConfig::load_or_default(CONFIG_FILE);
    println!("Configuration loaded from '{}'", CONFIG_FILE);

    let mut apu = Apu::with_config(&config.audio);

    // `--silent` runs the whole pipeline without opening a device
    let silent = std::env::args().skip(1).any(|arg| arg == "--silent");

    let output = if config.audio.enabled && !silent {
        Some(AudioOutput::new(config.audio.clone(), apu.stream_reader())?)
    } else {
        println!("Audio disabled, running silently");
        None
    };

    // Enable pulse 1/2, triangle and noise; 4-step sequencer, no IRQ
    apu.write(0x4015, 0x0F);
    apu.write(0x4017, 0x40);

    let cycles_per_frame = NTSC_CPU_CLOCK / FRAME_RATE;
    let frame_duration = Duration::from_secs_f64(1.0 / FRAME_RATE);
    let start = Instant::now();
    let mut cycle_budget = 0.0;
    let mut frame: u32 = 0;

    let steps = MELODY.len() * 2;
    for step in 0..steps {
        play_step(&mut apu, step);

        for _ in 0..FRAMES_PER_STEP {
            cycle_budget += cycles_per_frame;
            while cycle_budget >= 1.0 {
                apu.step();
                cycle_budget -= 1.0;
            }

            frame += 1;
            let target = frame_duration * frame;
            let elapsed = start.elapsed();
            if target > elapsed {
                thread::sleep(target - elapsed);
            }
        }
    }

    // Let the last notes ring out
    apu.write(0x4015, 0x00);
    if let Some(output) = &output {
        thread::sleep(Duration::from_millis(250));
        log::debug!("{} samples still pending in the device queue", output.pending());
    }

    let stats = apu.stats();
    println!();
    println!(
        "Emulated {} cycles, {} samples emitted, {} dropped ({:.2}%)",
        stats.cycles,
        stats.samples_emitted,
        stats.samples_dropped,
        stats.drop_ratio() * 100.0
    );

    Ok(())
}
