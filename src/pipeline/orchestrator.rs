// src/pipeline/orchestrator.rs
//
// One camera stream end to end: frame indexing, fps estimation, risk
// engine, frame assessment, alarm gating, event publishing and metrics.
// Empty frames go through the engine too so stale tracks keep expiring.

use super::alarm::AlarmGate;
use super::assessment::FrameAssessment;
use super::event_bus::{EventBus, ObstacleEvent};
use super::fps::FpsEstimator;
use super::metrics::PipelineMetrics;
use crate::config::RiskEngineConfig;
use crate::risk::RiskEngine;
use crate::types::{Detection, FrameSize, RiskLevel};
use anyhow::Result;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FpsSource {
    /// Estimate from frame timestamps; frames without one reuse the estimate.
    Timestamps,
    Fixed(f64),
}

/// One frame as delivered by the detector/tracker.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub size: FrameSize,
    /// Capture time in seconds, any epoch, non-decreasing
    pub timestamp_s: Option<f64>,
    pub detections: Vec<Detection>,
}

pub struct ObstaclePipeline {
    engine: RiskEngine,
    fps_source: FpsSource,
    fps: FpsEstimator,
    alarms: AlarmGate,
    events: EventBus,
    metrics: PipelineMetrics,
    next_frame_index: u64,
    last_reaped: u64,
}

impl ObstaclePipeline {
    pub fn new(
        config: RiskEngineConfig,
        fps_source: FpsSource,
        max_pending_events: usize,
    ) -> Result<Self> {
        Ok(Self {
            engine: RiskEngine::new(config)?,
            fps_source,
            fps: FpsEstimator::new(),
            alarms: AlarmGate::new(),
            events: EventBus::new(max_pending_events),
            metrics: PipelineMetrics::new(),
            next_frame_index: 0,
            last_reaped: 0,
        })
    }

    pub fn process(&mut self, frame: FrameInput) -> FrameAssessment {
        let started = Instant::now();
        let frame_index = self.next_frame_index;
        self.next_frame_index += 1;

        let fps = match self.fps_source {
            FpsSource::Fixed(fps) => fps,
            FpsSource::Timestamps => match frame.timestamp_s {
                Some(ts) => self.fps.tick(ts),
                None => self.fps.fps(),
            },
        };

        let metrics = self
            .engine
            .update(&frame.detections, frame.size, frame_index, fps);
        let detection_count = frame.detections.len() as u64;
        let assessment = FrameAssessment::new(frame_index, fps, frame.detections, metrics);

        for event in self.alarms.observe(&assessment) {
            let counter = match &event {
                ObstacleEvent::LevelChanged { .. } => &self.metrics.level_changes,
                ObstacleEvent::WarnOnset(_) => &self.metrics.warn_onsets,
            };
            self.metrics.inc(counter);
            self.events.publish(event);
        }

        self.record(&assessment, detection_count, started);
        debug!("Frame {}: {}", frame_index, assessment.summary());
        assessment
    }

    fn record(&mut self, assessment: &FrameAssessment, detection_count: u64, started: Instant) {
        let m = &self.metrics;
        m.inc(&m.total_frames);
        if detection_count > 0 {
            m.inc(&m.frames_with_detections);
            m.add(&m.detections, detection_count);
        }
        match assessment.level() {
            RiskLevel::Caution => m.inc(&m.caution_frames),
            RiskLevel::Warn => m.inc(&m.warn_frames),
            RiskLevel::Safe => {}
        }
        let reaped = self.engine.reaped_total();
        m.add(&m.tracks_reaped, reaped - self.last_reaped);
        self.last_reaped = reaped;
        m.set(&m.active_tracks, self.engine.active_tracks() as u64);
        m.set(&m.update_time_us, started.elapsed().as_micros() as u64);
    }

    pub fn drain_events(&mut self) -> Vec<ObstacleEvent> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    pub fn current_level(&self) -> RiskLevel {
        self.alarms.last_level()
    }

    pub fn frames_processed(&self) -> u64 {
        self.next_frame_index
    }
}
