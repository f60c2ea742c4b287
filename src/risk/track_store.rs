// src/risk/track_store.rs
//
// Per-track mutable state, keyed by (class name, track identity).
// Tracks of different classes never share state even when the tracker
// reuses numeric ids. Deletion is time-based only: see `reap`.

use super::hysteresis::{GateTransition, HysteresisGate};
use super::smoother::DistanceEma;
use crate::types::{Detection, RiskLevel};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackIdentity {
    /// Persistent tracker id.
    Tracked(i64),
    /// Synthesized for a detection the tracker left unlabelled. Unique to one
    /// (frame, position) pair, so it never matches a detection in another
    /// frame and never merges two objects of the same frame.
    Ephemeral { frame_index: u64, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey {
    pub class_name: String,
    pub identity: TrackIdentity,
}

impl TrackKey {
    pub fn for_detection(det: &Detection, frame_index: u64, position: usize) -> Self {
        let identity = if det.is_tracked() {
            TrackIdentity::Tracked(det.track_id)
        } else {
            TrackIdentity::Ephemeral {
                frame_index,
                position,
            }
        };
        Self {
            class_name: det.class_name.clone(),
            identity,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self.identity, TrackIdentity::Ephemeral { .. })
    }
}

#[derive(Debug, Clone)]
pub struct TrackState {
    pub(crate) motion: DistanceEma,
    pub approach_streak: u32,
    gate: HysteresisGate,
    pub last_seen_frame: u64,
}

impl TrackState {
    fn new(frame_index: u64) -> Self {
        Self {
            motion: DistanceEma::default(),
            approach_streak: 0,
            gate: HysteresisGate::default(),
            last_seen_frame: frame_index,
        }
    }

    /// Stabilized level. Only `apply_candidate` changes it.
    pub fn risk_level(&self) -> RiskLevel {
        self.gate.level()
    }

    pub fn hold_frames(&self) -> u32 {
        self.gate.hold_frames()
    }

    pub fn dist_ema(&self) -> Option<f64> {
        self.motion.current()
    }

    pub fn prev_dist_ema(&self) -> Option<f64> {
        self.motion.previous()
    }

    pub(crate) fn apply_candidate(
        &mut self,
        candidate: RiskLevel,
        hysteresis_frames: u32,
    ) -> GateTransition {
        self.gate.step(candidate, hysteresis_frames)
    }
}

#[derive(Debug, Default)]
pub struct TrackStore {
    states: HashMap<TrackKey, TrackState>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the state for `key`, creating it on first sight, and mark it
    /// seen on `frame_index`.
    pub fn touch(&mut self, key: TrackKey, frame_index: u64) -> &mut TrackState {
        let state = self.states.entry(key).or_insert_with_key(|key| {
            debug!("New track {:?} at frame {}", key, frame_index);
            TrackState::new(frame_index)
        });
        state.last_seen_frame = frame_index;
        state
    }

    pub fn get(&self, key: &TrackKey) -> Option<&TrackState> {
        self.states.get(key)
    }

    pub fn remove(&mut self, key: &TrackKey) -> Option<TrackState> {
        self.states.remove(key)
    }

    /// Drop every track last seen more than `stale_frames` before
    /// `frame_index`. Returns how many were removed.
    pub fn reap(&mut self, frame_index: u64, stale_frames: u64) -> usize {
        let before = self.states.len();
        self.states
            .retain(|_, st| frame_index.saturating_sub(st.last_seen_frame) <= stale_frames);
        let reaped = before - self.states.len();
        if reaped > 0 {
            debug!(
                "Reaped {} stale track(s) at frame {} ({} active)",
                reaped,
                frame_index,
                self.states.len()
            );
        }
        reaped
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
