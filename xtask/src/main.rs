//! `cargo x` - test, benchmark and demo tasks for nes-apu
//!
//! Without an audio device (or with `CI` set) the crate is built with
//! `--no-default-features`, which leaves out cpal and the ALSA link.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::process::Command;
use std::time::Instant;

/// Benchmark groups defined in benches/apu_bench.rs
const BENCH_GROUPS: [(&str, &str); 3] = [
    ("apu_step", "Apu::step per cycle and per frame, all channels on"),
    ("mixer_mix", "nonlinear mixer lookups"),
    ("resampler_push", "cycle-to-sample downsampling"),
];

/// Test filters for the library modules
const TEST_MODULES: [(&str, &str); 2] = [("apu::", "APU"), ("audio::", "Audio")];

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development tasks for nes-apu")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tests (all of them unless a module filter is given)
    Test {
        /// Only the APU unit tests (channels, components, register timing)
        #[arg(long)]
        apu: bool,
        /// Only the audio pipeline unit tests (mixer, resampler, stream)
        #[arg(long)]
        audio: bool,
        /// Build without the cpal backend
        #[arg(long)]
        headless: bool,
    },
    /// Run the criterion benchmarks
    Bench {
        /// Benchmark group to run (see --list)
        group: Option<String>,
        /// List the benchmark groups and exit
        #[arg(long)]
        list: bool,
    },
    /// Play the demo tune
    Demo {
        #[arg(long)]
        release: bool,
        /// Run the pipeline without opening an audio device
        #[arg(long)]
        silent: bool,
    },
    /// fmt check, clippy, headless tests and a benchmark build
    Ci,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Test {
            apu,
            audio,
            headless,
        } => run_tests(apu, audio, headless || in_ci()),
        Commands::Bench { list: true, .. } => {
            list_bench_groups();
            Ok(())
        }
        Commands::Bench { group, .. } => run_bench(group.as_deref()),
        Commands::Demo { release, silent } => run_demo(release, silent || in_ci()),
        Commands::Ci => run_ci(),
    }
}

fn in_ci() -> bool {
    std::env::var_os("CI").is_some()
}

/// `cargo <subcommand>` with the feature set for this machine
fn cargo(subcommand: &str, headless: bool) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    if headless {
        cmd.arg("--no-default-features");
    }
    cmd
}

fn run_tests(apu: bool, audio: bool, headless: bool) -> Result<()> {
    let selected: Vec<_> = TEST_MODULES
        .iter()
        .zip([apu, audio])
        .filter_map(|(module, on)| on.then_some(*module))
        .collect();

    if selected.is_empty() {
        println!("{} Running all tests", "→".blue());
        return execute(&mut cargo("test", headless));
    }

    for (filter, name) in selected {
        println!("{} Running {} tests", "→".blue(), name.bold());
        execute(cargo("test", headless).arg("--lib").arg(filter))?;
    }
    Ok(())
}

fn list_bench_groups() {
    println!("{}", "Benchmark groups (benches/apu_bench.rs):".bold());
    for (name, what) in BENCH_GROUPS {
        println!("  {:<16} {}", name.cyan(), what);
    }
}

fn run_bench(group: Option<&str>) -> Result<()> {
    if let Some(group) = group {
        if !BENCH_GROUPS.iter().any(|(name, _)| *name == group) {
            list_bench_groups();
            bail!("unknown benchmark group '{}'", group);
        }
    }

    // The benches only touch the core, never the device
    let mut cmd = cargo("bench", true);
    cmd.arg("--bench").arg("apu_bench");
    if let Some(group) = group {
        cmd.arg("--").arg(group);
    }
    execute(&mut cmd)
}

fn run_demo(release: bool, silent: bool) -> Result<()> {
    println!(
        "{} Demo ({}, {})",
        "→".blue(),
        if release { "release" } else { "debug" },
        if silent { "silent".yellow() } else { "audio".green() }
    );

    let mut cmd = cargo("run", false);
    if release {
        cmd.arg("--release");
    }
    if silent {
        cmd.arg("--").arg("--silent");
    }
    if std::env::var_os("RUST_LOG").is_none() {
        cmd.env("RUST_LOG", "info");
    }
    execute(&mut cmd)
}

fn run_ci() -> Result<()> {
    println!("{}", "=== CI ===".bold().blue());
    let start = Instant::now();

    let steps: [(&str, Command); 4] = [
        ("fmt", {
            let mut cmd = Command::new("cargo");
            cmd.args(["fmt", "--all", "--", "--check"]);
            cmd
        }),
        ("clippy", {
            let mut cmd = cargo("clippy", true);
            cmd.args(["--all-targets", "--", "-D", "warnings"]);
            cmd
        }),
        ("test", cargo("test", true)),
        ("bench build", {
            let mut cmd = cargo("bench", true);
            cmd.arg("--no-run");
            cmd
        }),
    ];

    for (name, mut cmd) in steps {
        println!("{} {}", "→".blue(), name.bold());
        execute(&mut cmd)?;
    }

    println!(
        "{} CI passed in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn execute(cmd: &mut Command) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        bail!("{:?} failed: {}", cmd, status);
    }
    Ok(())
}
