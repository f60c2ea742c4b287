// src/event_log.rs
//
// Append-only JSON-lines log of WARN onsets, one record per line, stamped
// with local wall-clock time.

use crate::pipeline::WarnEvent;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct LoggedWarn<'a> {
    timestamp: String,
    source: &'a str,
    #[serde(flatten)]
    event: &'a WarnEvent,
}

pub struct WarnEventLog {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl WarnEventLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening event log {}", path.display()))?;
        info!("📝 WARN events → {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// `source` names the stream the event came from (camera, recording).
    pub fn append(&mut self, source: &str, event: &WarnEvent) -> Result<()> {
        let record = LoggedWarn {
            timestamp: chrono::Local::now().to_rfc3339(),
            source,
            event,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        // one flush per event
        self.writer
            .flush()
            .with_context(|| format!("writing {}", self.path.display()))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(track_id: i64) -> WarnEvent {
        WarnEvent {
            frame_index: 12,
            track_id,
            class_name: "Person".to_string(),
            score: 2345.5,
            pttc_s: 1.5,
            dist_proxy: 0.031,
            closing_rate: 0.02,
            bbox: [1.0, 2.0, 3.0, 4.0],
        }
    }

    #[test]
    fn test_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");

        let mut log = WarnEventLog::open(&path).unwrap();
        log.append("front", &event(7)).unwrap();
        log.append("front", &event(8)).unwrap();
        assert_eq!(log.written(), 2);
        drop(log);

        // reopening appends rather than truncates
        let mut log = WarnEventLog::open(&path).unwrap();
        log.append("cart", &event(9)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["track_id"], 7);
        assert_eq!(lines[0]["source"], "front");
        assert_eq!(lines[2]["source"], "cart");
        assert_eq!(lines[1]["frame_index"], 12);
        assert!(lines[0]["timestamp"].as_str().unwrap().contains('T'));
    }
}
