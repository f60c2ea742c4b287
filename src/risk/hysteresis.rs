// src/risk/hysteresis.rs
//
// Anti-flicker gate on the per-track risk level: escalations apply on the
// frame they are seen, de-escalations wait out a hold counter that every
// escalation re-arms.
//
//   candidate > level   → level = candidate, hold = hysteresis_frames
//   candidate < level   → hold > 0 ? hold -= 1 : level = candidate
//   candidate == level  → nothing
//
// The hold counter is cumulative: frames where the candidate equals the
// stabilized level neither reset nor consume it.

use crate::types::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Level raised on this frame.
    Escalated,
    /// Lower candidate seen, level kept, hold counter consumed.
    Holding,
    /// Hold exhausted, level lowered on this frame.
    Decayed,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HysteresisGate {
    level: RiskLevel,
    hold_frames: u32,
}

impl HysteresisGate {
    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames
    }

    pub fn step(&mut self, candidate: RiskLevel, hysteresis_frames: u32) -> GateTransition {
        use std::cmp::Ordering;

        match candidate.cmp(&self.level) {
            Ordering::Greater => {
                self.level = candidate;
                self.hold_frames = hysteresis_frames;
                GateTransition::Escalated
            }
            Ordering::Less if self.hold_frames > 0 => {
                self.hold_frames -= 1;
                GateTransition::Holding
            }
            Ordering::Less => {
                self.level = candidate;
                GateTransition::Decayed
            }
            Ordering::Equal => GateTransition::Unchanged,
        }
    }
}
