// src/risk/classifier.rs
//
// Candidate (pre-hysteresis) risk level for one detection.
//
// Precedence, first match wins:
//   1. mega-close inside the near-center band           → WARN
//   2. centered, long approach streak, short pTTC        → WARN
//   3. near-center, moderate approach streak, pTTC       → CAUTION
//   4.                                                   → SAFE

use super::geometry::BoxGeometry;
use crate::config::RiskEngineConfig;
use crate::types::{RiskLevel, PTTC_NEVER_S};

const MIN_CLOSING_RATE: f64 = 1e-9;

/// Inputs the decision tree looks at, gathered from geometry, the smoother
/// and the track's streak counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInput {
    pub in_center: bool,
    pub in_near_center: bool,
    pub mega_close: bool,
    pub approach_streak: u32,
    pub pttc_s: f64,
}

impl ClassifierInput {
    pub fn new(geometry: &BoxGeometry, approach_streak: u32, pttc_s: f64) -> Self {
        Self {
            in_center: geometry.in_center,
            in_near_center: geometry.in_near_center,
            mega_close: geometry.mega_close,
            approach_streak,
            pttc_s,
        }
    }
}

pub fn candidate_level(input: &ClassifierInput, cfg: &RiskEngineConfig) -> RiskLevel {
    if input.mega_close && input.in_near_center {
        RiskLevel::Warn
    } else if input.in_center
        && input.approach_streak >= cfg.streak_warn
        && input.pttc_s <= cfg.pttc_warn_s
    {
        RiskLevel::Warn
    } else if input.in_near_center
        && input.approach_streak >= cfg.streak_caution
        && input.pttc_s <= cfg.pttc_caution_s
    {
        RiskLevel::Caution
    } else {
        RiskLevel::Safe
    }
}

/// Seconds until the smoothed proxy would reach zero at the current closing
/// rate; `PTTC_NEVER_S` when the object is not closing.
pub fn pttc_seconds(dist_ema: f64, closing_rate: f64) -> f64 {
    if closing_rate > MIN_CLOSING_RATE {
        dist_ema / closing_rate
    } else {
        PTTC_NEVER_S
    }
}

pub fn is_approaching(closing_rate: f64, cfg: &RiskEngineConfig) -> bool {
    closing_rate >= cfg.closing_rate_min
}

/// Advance the approach streak: +1 when approaching inside either center
/// band, otherwise -1 with a floor of zero.
pub fn next_streak(streak: u32, approaching: bool, in_center: bool, in_near_center: bool) -> u32 {
    if approaching && (in_center || in_near_center) {
        streak.saturating_add(1)
    } else {
        streak.saturating_sub(1)
    }
}
