use anyhow::{Context, Result};
use borealis_core::{SimTick, SimTime};
use borealis_render::RenderPath;
use borealis_testkit::{AuroraMeshMetric, EventRecord, JsonlSink, MeshMetricSink};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::AuroraConfig;
use crate::effects::{AuroraEffectHandler, HandlerEvent, SkyConditions};

/// Ticks between mesh metric samples (one in-game minute at 20 TPS).
const METRIC_INTERVAL: u64 = 1_200;

pub struct HeadlessConfig {
    pub aurora: AuroraConfig,
    pub ticks: u64,
    pub start_tick: u64,
    pub ticks_per_day: u64,
    pub frames_per_tick: u32,
    pub event_log: Option<PathBuf>,
    pub mesh_metrics: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub spawned: u64,
    pub despawned: u64,
    pub frames: u64,
    pub shader_frames: u64,
    pub triangles: u64,
    pub events: u64,
    pub shader_survived: bool,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let mut events = match &cfg.event_log {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("Failed to create event log {}", path.display()))?,
        ),
        None => None,
    };
    let mut metrics = Vec::new();

    let eligible_biome = cfg.aurora.eligible_biome;
    let use_shader = cfg.aurora.use_shader;
    let mut handler = AuroraEffectHandler::new(cfg.aurora);
    let mut time = SimTime {
        tick: SimTick(cfg.start_tick),
        ..SimTime::new(cfg.ticks_per_day)
    };
    let frames_per_tick = cfg.frames_per_tick.max(1);
    let mut event_count = 0;

    for _ in 0..cfg.ticks {
        time.advance();
        let tick = time.tick;
        handler.tick(tick, SkyConditions::observe(&time, eligible_biome));

        for frame in 0..frames_per_tick {
            let partial = frame as f32 / frames_per_tick as f32;
            handler
                .render(partial)
                .with_context(|| format!("Aurora render failed at tick {}", tick.0))?;
        }

        for event in handler.drain_events() {
            event_count += 1;
            if let Some(sink) = events.as_mut() {
                write_event(sink, &event)?;
            }
        }

        if cfg.mesh_metrics.is_some() && tick.0 % METRIC_INTERVAL == 0 {
            if let Some(metric) = sample_metric(&handler, tick) {
                debug!(tick = tick.0, triangles = metric.triangles, "mesh metric");
                metrics.push(metric);
            }
        }
    }

    if let Some(path) = &cfg.mesh_metrics {
        let mut sink = MeshMetricSink::create(path)
            .with_context(|| format!("Failed to create metrics file {}", path.display()))?;
        sink.write(&metrics)?;
    }

    let stats = handler.stats();
    let summary = RunSummary {
        ticks: cfg.ticks,
        spawned: stats.spawned,
        despawned: stats.despawned,
        frames: stats.frames(),
        shader_frames: stats.shader_frames,
        triangles: stats.triangles,
        events: event_count,
        shader_survived: use_shader && handler.renderer().shader_active(),
    };
    info!(?summary, "headless run finished");
    Ok(summary)
}

fn write_event(sink: &mut JsonlSink, event: &HandlerEvent) -> Result<()> {
    let payload = event.payload();
    sink.write(&EventRecord {
        tick: event.tick(),
        kind: event.kind(),
        payload: &payload,
    })
}

fn sample_metric(handler: &AuroraEffectHandler, tick: SimTick) -> Option<AuroraMeshMetric> {
    let aurora = handler.aurora()?;
    if handler.renderer().last_path() != Some(RenderPath::Triangles) {
        return None;
    }
    let mesh = handler.renderer().triangles().mesh();
    Some(AuroraMeshMetric {
        tick,
        seed: aurora.seed(),
        bands: aurora.bands().len(),
        triangles: mesh.triangle_count(),
        hash: mesh.hash.to_hex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ticks: u64) -> HeadlessConfig {
        HeadlessConfig {
            aurora: AuroraConfig {
                peak_age: 20,
                max_bands: 1,
                world_seed: 11,
                ..AuroraConfig::default()
            },
            ticks,
            start_tick: 1_700,
            ticks_per_day: 2_400,
            frames_per_tick: 2,
            event_log: None,
            mesh_metrics: None,
        }
    }

    #[test]
    fn night_spawns_and_dawn_despawns() {
        // 1_700 is late afternoon; dusk falls at 1_800 and dawn at 3_000.
        let summary = run(config(1_400)).expect("run succeeds");
        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.despawned, 1);
        assert_eq!(summary.events, 3);
        assert!(summary.frames > 0);
        assert!(summary.triangles > 0);
        assert!(!summary.shader_survived);
    }

    #[test]
    fn two_days_spawn_once_per_night() {
        // Pre-dawn of day 0, then the nights starting at 1_800 and 4_200.
        let mut cfg = config(4_800);
        cfg.start_tick = 0;
        let summary = run(cfg).expect("run succeeds");
        assert_eq!(summary.spawned, 3);
        assert_eq!(summary.despawned, 2);
    }

    #[test]
    fn daytime_run_is_quiet() {
        let mut cfg = config(100);
        cfg.start_tick = 700;
        let summary = run(cfg).expect("run succeeds");
        assert_eq!(summary.spawned, 0);
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn shader_run_keeps_shader_path() {
        let mut cfg = config(200);
        cfg.aurora.use_shader = true;
        cfg.start_tick = 1_850;
        let summary = run(cfg).expect("run succeeds");
        assert_eq!(summary.spawned, 1);
        assert!(summary.shader_survived);
        assert_eq!(summary.shader_frames, summary.frames);
        assert_eq!(summary.triangles, 0);
    }

    #[test]
    fn same_inputs_produce_same_summary() {
        let a = run(config(400)).expect("run succeeds");
        let b = run(config(400)).expect("run succeeds");
        assert_eq!(a, b);
    }
}
