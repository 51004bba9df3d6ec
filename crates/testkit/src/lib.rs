#![warn(missing_docs)]
//! Deterministic testing surfaces: an event stream plus aurora geometry metrics.

use anyhow::Result;
use borealis_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Event kind label (`AuroraSpawned`, `AuroraFading`, ...).
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
    written: u64,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file, written: 0 })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

/// Geometry snapshot of one rendered aurora frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuroraMeshMetric {
    /// Tick the frame belongs to.
    pub tick: SimTick,
    /// Aurora seed.
    pub seed: u64,
    /// Number of bands drawn.
    pub bands: usize,
    /// Triangle count of the frame's mesh.
    pub triangles: usize,
    /// Mesh hash (hex string) for deterministic comparisons.
    pub hash: String,
}

/// Writes aurora mesh metrics to JSON for CI artifacts.
pub struct MeshMetricSink {
    file: File,
}

impl MeshMetricSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the provided metrics as pretty JSON.
    pub fn write(&mut self, metrics: &[AuroraMeshMetric]) -> Result<()> {
        let json = serde_json::to_string_pretty(metrics)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "{name}-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn mesh_metric_sink_writes_file() {
        let path = temp_path("aurora-metrics").with_extension("json");
        let metrics = vec![AuroraMeshMetric {
            tick: SimTick(40),
            seed: 7,
            bands: 3,
            triangles: 4572,
            hash: "deadbeef".into(),
        }];
        let mut sink = MeshMetricSink::create(&path).expect("sink create");
        sink.write(&metrics).expect("write succeeds");
        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("deadbeef"));
        assert!(contents.contains("triangles"));
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let path = temp_path("aurora-events").join("events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for (tick, kind) in [(12_000, "AuroraSpawned"), (23_000, "AuroraFading")] {
            sink.write(&EventRecord {
                tick: SimTick(tick),
                kind,
                payload: "seed=1",
            })
            .expect("write succeeds");
        }
        assert_eq!(sink.written(), 2);

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"tick\":12000"));
        assert!(lines[1].contains("AuroraFading"));
    }
}
