// src/pipeline/metrics.rs
//
// Counters for the obstacle pipeline. Atomics behind Arc so a reporting
// thread can read them while the frame loop runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_detections: Arc<AtomicU64>,
    pub detections: Arc<AtomicU64>,
    pub caution_frames: Arc<AtomicU64>,
    pub warn_frames: Arc<AtomicU64>,
    pub level_changes: Arc<AtomicU64>,
    pub warn_onsets: Arc<AtomicU64>,
    pub tracks_reaped: Arc<AtomicU64>,
    pub active_tracks: Arc<AtomicU64>,
    pub update_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_detections: Arc::new(AtomicU64::new(0)),
            detections: Arc::new(AtomicU64::new(0)),
            caution_frames: Arc::new(AtomicU64::new(0)),
            warn_frames: Arc::new(AtomicU64::new(0)),
            level_changes: Arc::new(AtomicU64::new(0)),
            warn_onsets: Arc::new(AtomicU64::new(0)),
            tracks_reaped: Arc::new(AtomicU64::new(0)),
            active_tracks: Arc::new(AtomicU64::new(0)),
            update_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set(&self, gauge: &AtomicU64, value: u64) {
        gauge.store(value, Ordering::Relaxed);
    }

    /// Wall-clock processing rate, not the video's frame rate.
    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            frames_with_detections: self.frames_with_detections.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
            caution_frames: self.caution_frames.load(Ordering::Relaxed),
            warn_frames: self.warn_frames.load(Ordering::Relaxed),
            level_changes: self.level_changes.load(Ordering::Relaxed),
            warn_onsets: self.warn_onsets.load(Ordering::Relaxed),
            tracks_reaped: self.tracks_reaped.load(Ordering::Relaxed),
            active_tracks: self.active_tracks.load(Ordering::Relaxed),
            last_update_us: self.update_time_us.load(Ordering::Relaxed),
            processing_fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_with_detections: u64,
    pub detections: u64,
    pub caution_frames: u64,
    pub warn_frames: u64,
    pub level_changes: u64,
    pub warn_onsets: u64,
    pub tracks_reaped: u64,
    pub active_tracks: u64,
    pub last_update_us: u64,
    pub processing_fps: f64,
    pub elapsed_secs: f64,
}
