// src/pipeline/alarm.rs
//
// Turns per-frame assessments into alarm events. The frame level alarms only
// when it changes; each track raises one WARN onset per WARN episode.

use super::assessment::{AssessedObject, FrameAssessment};
use super::event_bus::ObstacleEvent;
use crate::types::RiskLevel;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Snapshot of a track at the moment it became WARN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarnEvent {
    pub frame_index: u64,
    pub track_id: i64,
    pub class_name: String,
    pub score: f64,
    pub pttc_s: f64,
    pub dist_proxy: f64,
    pub closing_rate: f64,
    /// [x1, y1, x2, y2] pixels
    pub bbox: [f32; 4],
}

impl WarnEvent {
    fn from_object(frame_index: u64, obj: &AssessedObject) -> Self {
        Self {
            frame_index,
            track_id: obj.detection.track_id,
            class_name: obj.detection.class_name.clone(),
            score: obj.metrics.score,
            pttc_s: obj.metrics.pttc_s,
            dist_proxy: obj.metrics.dist_proxy,
            closing_rate: obj.metrics.closing_rate,
            bbox: obj.detection.bbox,
        }
    }
}

#[derive(Debug, Default)]
pub struct AlarmGate {
    last_level: RiskLevel,
    /// (class, track id) of tracks currently inside a WARN episode
    warned_tracks: HashSet<(String, i64)>,
}

impl AlarmGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_level(&self) -> RiskLevel {
        self.last_level
    }

    pub fn observe(&mut self, assessment: &FrameAssessment) -> Vec<ObstacleEvent> {
        let mut events = Vec::new();

        let level = assessment.level();
        if level != self.last_level {
            let object = assessment.highest_risk_object().cloned();
            info!(
                "🔔 Frame {}: {} → {} ({})",
                assessment.frame_index,
                self.last_level,
                level,
                object
                    .as_ref()
                    .map(|o| o.summary())
                    .unwrap_or_else(|| "no detections".to_string())
            );
            events.push(ObstacleEvent::LevelChanged {
                frame_index: assessment.frame_index,
                from: self.last_level,
                to: level,
                object,
            });
            self.last_level = level;
        }

        let mut still_warn = HashSet::new();
        for obj in &assessment.objects {
            if obj.metrics.risk_level != RiskLevel::Warn {
                continue;
            }
            if !obj.detection.is_tracked() {
                events.push(ObstacleEvent::WarnOnset(WarnEvent::from_object(
                    assessment.frame_index,
                    obj,
                )));
                continue;
            }
            let key = (obj.detection.class_name.clone(), obj.detection.track_id);
            if !self.warned_tracks.contains(&key) {
                events.push(ObstacleEvent::WarnOnset(WarnEvent::from_object(
                    assessment.frame_index,
                    obj,
                )));
            }
            still_warn.insert(key);
        }
        self.warned_tracks = still_warn;

        events
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
