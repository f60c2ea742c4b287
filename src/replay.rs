// src/replay.rs
//
// Recorded detector/tracker output, one JSON object per frame per line:
//
//   {"timestamp_s": 0.033, "width": 640, "height": 480,
//    "detections": [{"track_id": 7, "class_name": "Person",
//                    "confidence": 0.91, "bbox": [270, 150, 370, 300]}]}
//
// Malformed lines are skipped and counted; a recording never aborts halfway.

use crate::pipeline::FrameInput;
use crate::types::{Detection, FrameSize};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameRecord {
    #[serde(default)]
    pub timestamp_s: Option<f64>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl From<FrameRecord> for FrameInput {
    fn from(record: FrameRecord) -> Self {
        FrameInput {
            size: FrameSize::new(record.width, record.height),
            timestamp_s: record.timestamp_s,
            detections: record.detections,
        }
    }
}

#[derive(Debug, Default)]
pub struct Recording {
    pub frames: Vec<FrameRecord>,
    pub skipped_lines: usize,
}

/// Every file under `dir` with the given extension, sorted by path.
pub fn find_recordings(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

pub fn load_recording(path: &Path) -> Result<Recording> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut recording = Recording::default();

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<FrameRecord>(trimmed) {
            Ok(record) => recording.frames.push(record),
            Err(e) => {
                warn!("{}:{}: skipping malformed frame: {}", path.display(), line_no + 1, e);
                recording.skipped_lines += 1;
            }
        }
    }
    Ok(recording)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_recording_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"timestamp_s":0.0,"width":640,"height":480,"detections":[{"track_id":7,"class_name":"Person","confidence":0.9,"bbox":[270,150,370,300]}]}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"width":640,"height":480}"#,
                "\n",
                r#"{"width":640,"height":480,"camera":"front"}"#,
                "\n",
            ),
        )
        .unwrap();

        let rec = load_recording(&path).unwrap();
        assert_eq!(rec.frames.len(), 2);
        assert_eq!(rec.skipped_lines, 2);
        assert_eq!(rec.frames[0].detections[0].track_id, 7);
        assert!(rec.frames[1].detections.is_empty());
        assert_eq!(rec.frames[1].timestamp_s, None);

        let input: FrameInput = rec.frames[0].clone().into();
        assert_eq!(input.size, FrameSize::new(640, 480));
        assert_eq!(input.detections[0].bbox, [270.0, 150.0, 370.0, 300.0]);
    }

    #[test]
    fn test_find_recordings_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.jsonl"), "").unwrap();
        fs::write(dir.path().join("sub").join("a.JSONL"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = find_recordings(dir.path(), "jsonl");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().is_some()));
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }

    #[test]
    fn test_missing_recording_is_error() {
        assert!(load_recording(Path::new("/no/such/recording.jsonl")).is_err());
    }
}
