// src/types.rs
//
// Fixed-schema records shared by the risk engine and the pipeline.
// Units are stated on every field: pixels for geometry, seconds for time,
// unit-less for the distance proxy and ratios. The distance proxy is NOT a
// physical distance and nothing in this crate converts it to one.

use serde::{Deserialize, Serialize};

/// One tracked detection on a single frame, as produced by the upstream
/// detector/tracker. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Tracker-assigned identifier. Negative values mean "untracked".
    #[serde(default = "untracked_id")]
    pub track_id: i64,
    /// Detector class index. Forwarded only.
    #[serde(default)]
    pub class_id: u32,
    /// Detector class name, e.g. "Person" or "Cart".
    pub class_name: String,
    /// Detector confidence in [0, 1]. Forwarded only.
    #[serde(default)]
    pub confidence: f32,
    /// [x1, y1, x2, y2] in absolute pixel coordinates of the current frame.
    pub bbox: [f32; 4],
}

fn untracked_id() -> i64 {
    UNTRACKED_ID
}

/// Sentinel used by trackers for detections without a persistent id.
pub const UNTRACKED_ID: i64 = -1;

impl Detection {
    pub fn new(track_id: i64, class_name: impl Into<String>, bbox: [f32; 4]) -> Self {
        Self {
            track_id,
            class_id: 0,
            class_name: class_name.into(),
            confidence: 1.0,
            bbox,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.track_id >= 0
    }

    /// Horizontal center of the box in pixels.
    pub fn center_x(&self) -> f64 {
        0.5 * (self.bbox[0] as f64 + self.bbox[2] as f64)
    }

    /// Bottom edge (y2) in pixels.
    pub fn bottom_y(&self) -> f64 {
        self.bbox[3] as f64
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_px(&self) -> f64 {
        self.width as f64
    }

    pub fn height_px(&self) -> f64 {
        self.height as f64
    }
}

/// Stabilized danger level. Ordered: Safe < Caution < Warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Safe = 0,
    Caution = 1,
    Warn = 2,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Caution => "CAUTION",
            Self::Warn => "WARN",
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Legacy 0.0 / 0.5 / 1.0 danger scale used by older alarm consumers.
    pub fn danger_level(&self) -> f32 {
        self.as_u8() as f32 / 2.0
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel pTTC meaning "not closing".
pub const PTTC_NEVER_S: f64 = 1e9;

/// Per-detection output of one engine update. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Stabilized (post-hysteresis) level of the detection's track.
    pub risk_level: RiskLevel,
    pub risk_name: &'static str,
    /// Ranking score, only meaningful relative to other detections of the same frame.
    pub score: f64,
    /// Predicted time to collision in seconds; `PTTC_NEVER_S` when not closing.
    pub pttc_s: f64,
    /// Smoothed distance proxy (unit-less, smaller = closer).
    pub dist_proxy: f64,
    /// Decrease of the smoothed proxy per second, never negative.
    pub closing_rate: f64,
    pub in_center: bool,
    pub in_near_center: bool,
    pub approaching: bool,
    pub mega_close: bool,
    /// Clamped box height in pixels.
    pub box_h: f64,
    /// Clamped box area in square pixels.
    pub area: f64,
}

impl RiskMetrics {
    pub fn is_closing(&self) -> bool {
        self.pttc_s < PTTC_NEVER_S
    }
}
