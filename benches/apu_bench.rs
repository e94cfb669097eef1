// APU Benchmarks
// Per-cycle cost of the synthesis pipeline and its stages

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use nes_apu::{Apu, AudioConfig, MemoryMappedDevice, Mixer, Resampler};
use std::hint::black_box;

/// CPU cycles in one NTSC video frame
const CYCLES_PER_FRAME: u64 = 29_781;

/// APU with every channel producing sound
fn busy_apu() -> Apu {
    // Large enough that a benchmark run never hits the full-buffer path
    let config = AudioConfig::new().with_buffer_capacity(1 << 24);
    let mut apu = Apu::with_config(&config);

    let writes: [(u16, u8); 14] = [
        (0x4015, 0x1F),
        (0x4000, 0xBF),
        (0x4002, 0xFD),
        (0x4003, 0x08),
        (0x4004, 0x7F),
        (0x4005, 0x9A),
        (0x4006, 0x80),
        (0x4007, 0x09),
        (0x4008, 0xFF),
        (0x400A, 0x40),
        (0x400B, 0x08),
        (0x400C, 0x3F),
        (0x400E, 0x04),
        (0x400F, 0x08),
    ];
    for (addr, data) in writes {
        apu.write(addr, data);
    }
    apu.write(0x4010, 0x4F);
    apu
}

fn bench_apu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("apu_step");

    group.bench_function("single_cycle", |b| {
        let mut apu = busy_apu();
        let reader = apu.stream_reader();

        b.iter(|| {
            apu.step();
            if apu.dmc_sample_request().is_some() {
                apu.load_dmc_sample(0xA5);
            }
            if reader.available() > 1 << 20 {
                reader.pull();
            }
        });
    });

    group.throughput(Throughput::Elements(CYCLES_PER_FRAME));
    group.bench_function("one_frame", |b| {
        let mut apu = busy_apu();
        let reader = apu.stream_reader();

        b.iter(|| {
            for _ in 0..CYCLES_PER_FRAME {
                apu.step();
                if apu.dmc_sample_request().is_some() {
                    apu.load_dmc_sample(0xA5);
                }
            }
            black_box(reader.pull());
        });
    });

    group.finish();
}

fn bench_mixer(c: &mut Criterion) {
    let mixer = Mixer::new();

    c.bench_function("mixer_mix", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for level in 0..16u8 {
                total += mixer.mix(
                    black_box(level),
                    black_box(15 - level),
                    black_box(level),
                    black_box(level),
                    black_box(level * 8),
                );
            }
            total
        });
    });
}

fn bench_resampler(c: &mut Criterion) {
    c.bench_function("resampler_push", |b| {
        let mut resampler = Resampler::ntsc(44_100);
        let mut level = 0.0f32;

        b.iter(|| {
            level = (level + 0.013) % 1.0;
            black_box(resampler.push(black_box(level)))
        });
    });
}

criterion_group!(benches, bench_apu_step, bench_mixer, bench_resampler);
criterion_main!(benches);
