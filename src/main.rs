//! borealis - procedural aurora effect, driven headlessly over simulated nights

mod config;
mod effects;
mod headless;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AuroraConfig, DEFAULT_CONFIG_PATH};
use headless::HeadlessConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless aurora effect driver", long_about = None)]
struct Args {
    /// Aurora configuration file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Number of ticks to simulate (default: two in-game days)
    #[arg(long, default_value_t = 48_000)]
    ticks: u64,

    /// Tick the clock starts at
    #[arg(long, default_value_t = 0)]
    start_tick: u64,

    /// Ticks per in-game day
    #[arg(long, default_value_t = 24_000)]
    day_length: u64,

    /// World seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Render calls per tick, at evenly spaced partial ticks
    #[arg(long, default_value_t = 2)]
    frames_per_tick: u32,

    /// Write lifecycle events as newline-delimited JSON
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Write sampled triangle-mesh metrics as JSON
    #[arg(long)]
    mesh_metrics: Option<PathBuf>,

    /// Prefer the shader path regardless of the config file
    #[arg(long)]
    shader: bool,

    /// Write the effective configuration back to --config before running
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("Starting borealis v{}", env!("CARGO_PKG_VERSION"));

    let mut aurora = AuroraConfig::load_from_path(&args.config);
    if let Some(seed) = args.seed {
        aurora.world_seed = seed;
    }
    if args.shader {
        aurora.use_shader = true;
    }
    if args.save_config {
        aurora
            .save_to_path(&args.config)
            .with_context(|| format!("Failed to save {}", args.config.display()))?;
        info!("Saved aurora config to {}", args.config.display());
    }

    let summary = headless::run(HeadlessConfig {
        aurora,
        ticks: args.ticks,
        start_tick: args.start_tick,
        ticks_per_day: args.day_length,
        frames_per_tick: args.frames_per_tick,
        event_log: args.event_log,
        mesh_metrics: args.mesh_metrics,
    })?;

    println!(
        "ticks={} auroras={} despawned={} frames={} shader_frames={} triangles={} events={} shader_survived={}",
        summary.ticks,
        summary.spawned,
        summary.despawned,
        summary.frames,
        summary.shader_frames,
        summary.triangles,
        summary.events,
        summary.shader_survived,
    );
    Ok(())
}
