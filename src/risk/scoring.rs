// src/risk/scoring.rs
//
// Composite ranking score for choosing the most dangerous object in a frame.

use crate::config::RiskEngineConfig;
use crate::types::RiskLevel;

const LEVEL_WEIGHT: f64 = 1000.0;
const CLASS_WEIGHT: f64 = 100.0;
const CLOSENESS_WEIGHT: f64 = 30.0;
const URGENCY_WEIGHT: f64 = 20.0;
const BONUS_WEIGHT: f64 = 50.0;

/// pTTC above this contributes no urgency.
const URGENCY_PTTC_CUTOFF_S: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput<'a> {
    pub class_name: &'a str,
    pub risk_level: RiskLevel,
    pub dist_ema: f64,
    pub pttc_s: f64,
    pub in_center: bool,
    pub approaching: bool,
}

pub fn score(input: &ScoreInput<'_>, cfg: &RiskEngineConfig) -> f64 {
    let closeness = 1.0 / input.dist_ema.max(1e-6);
    let urgency = if input.pttc_s <= URGENCY_PTTC_CUTOFF_S {
        1.0 / input.pttc_s.max(1e-3)
    } else {
        0.0
    };

    let mut score = input.risk_level.as_u8() as f64 * LEVEL_WEIGHT;
    score += cfg.class_weight(input.class_name) * CLASS_WEIGHT;
    score += CLOSENESS_WEIGHT * closeness;
    score += URGENCY_WEIGHT * urgency;
    if input.in_center {
        score += BONUS_WEIGHT * cfg.center_bonus;
    }
    if input.approaching {
        score += BONUS_WEIGHT * cfg.approach_bonus;
    }
    score
}
