// src/risk/engine.rs
//
// Per-frame risk update. For every detection, in order:
//   geometry → EMA / closing rate → approach streak → pTTC
//   → candidate level → hysteresis gate → score
// then stale tracks are reaped. One call is one frame; the track map is
// never observed half-updated.
//
// The engine holds no locks. Drive one instance per video stream, or wrap
// a shared instance in a mutex.

use super::classifier::{self, ClassifierInput};
use super::geometry::BoxGeometry;
use super::hysteresis::GateTransition;
use super::scoring::{self, ScoreInput};
use super::track_store::{TrackKey, TrackState, TrackStore};
use crate::config::RiskEngineConfig;
use crate::types::{Detection, FrameSize, RiskMetrics};
use anyhow::Result;
use tracing::{debug, info};

pub struct RiskEngine {
    config: RiskEngineConfig,
    tracks: TrackStore,
    reaped_total: u64,
}

impl RiskEngine {
    pub fn new(config: RiskEngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tracks: TrackStore::new(),
            reaped_total: 0,
        })
    }

    pub fn config(&self) -> &RiskEngineConfig {
        &self.config
    }

    /// Assess one frame. Returns one `RiskMetrics` per detection, at the
    /// same position as the detection in `detections`.
    pub fn update(
        &mut self,
        detections: &[Detection],
        frame: FrameSize,
        frame_index: u64,
        fps: f64,
    ) -> Vec<RiskMetrics> {
        let mut metrics = Vec::with_capacity(detections.len());
        let mut ephemeral = Vec::new();

        for (position, det) in detections.iter().enumerate() {
            let key = TrackKey::for_detection(det, frame_index, position);
            if key.is_ephemeral() {
                ephemeral.push(key.clone());
            }
            let state = self.tracks.touch(key, frame_index);
            metrics.push(assess(&self.config, det, state, frame, frame_index, fps));
        }

        // Untracked detections get one frame of state and nothing more.
        for key in &ephemeral {
            self.tracks.remove(key);
        }

        let reaped = self.tracks.reap(frame_index, self.config.stale_frames);
        self.reaped_total += reaped as u64;

        metrics
    }

    pub fn active_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn reaped_total(&self) -> u64 {
        self.reaped_total
    }

    pub fn track(&self, key: &TrackKey) -> Option<&TrackState> {
        self.tracks.get(key)
    }
}

fn assess(
    cfg: &RiskEngineConfig,
    det: &Detection,
    state: &mut TrackState,
    frame: FrameSize,
    frame_index: u64,
    fps: f64,
) -> RiskMetrics {
    let geometry = BoxGeometry::measure(det, frame, cfg);

    let motion = state.motion.update(geometry.dist_proxy, cfg.ema_alpha, fps);
    let approaching = classifier::is_approaching(motion.closing_rate, cfg);

    state.approach_streak = classifier::next_streak(
        state.approach_streak,
        approaching,
        geometry.in_center,
        geometry.in_near_center,
    );

    let pttc_s = classifier::pttc_seconds(motion.dist_ema, motion.closing_rate);
    let candidate = classifier::candidate_level(
        &ClassifierInput::new(&geometry, state.approach_streak, pttc_s),
        cfg,
    );

    let previous = state.risk_level();
    match state.apply_candidate(candidate, cfg.hysteresis_frames) {
        GateTransition::Escalated => info!(
            "⚠️  {} id={} escalated {} → {} at frame {} (pTTC={:.2}s, streak={}, mega_close={})",
            det.class_name,
            det.track_id,
            previous,
            state.risk_level(),
            frame_index,
            pttc_s,
            state.approach_streak,
            geometry.mega_close
        ),
        GateTransition::Decayed => debug!(
            "{} id={} cleared {} → {} at frame {}",
            det.class_name,
            det.track_id,
            previous,
            state.risk_level(),
            frame_index
        ),
        GateTransition::Holding | GateTransition::Unchanged => {}
    }

    let risk_level = state.risk_level();
    let score = scoring::score(
        &ScoreInput {
            class_name: &det.class_name,
            risk_level,
            dist_ema: motion.dist_ema,
            pttc_s,
            in_center: geometry.in_center,
            approaching,
        },
        cfg,
    );

    RiskMetrics {
        risk_level,
        risk_name: risk_level.as_str(),
        score,
        pttc_s,
        dist_proxy: motion.dist_ema,
        closing_rate: motion.closing_rate,
        in_center: geometry.in_center,
        in_near_center: geometry.in_near_center,
        approaching,
        mega_close: geometry.mega_close,
        box_h: geometry.box_h,
        area: geometry.area,
    }
}
