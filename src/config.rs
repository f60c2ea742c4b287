// src/config.rs
//
// Engine thresholds and application settings. Everything is deserialized
// from YAML with unknown keys rejected, then validated once. An engine is
// never constructed from an unvalidated config.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// RISK ENGINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskEngineConfig {
    /// Fraction of frame width, centered, that counts as "directly ahead"
    pub center_band_ratio: f64,
    /// Wider band that counts as "roughly ahead"
    pub near_center_band_ratio: f64,

    /// EMA weight of the newest distance-proxy sample, in (0, 1]
    pub ema_alpha: f64,
    /// Minimum closing rate (proxy units per second) to count as approaching
    pub closing_rate_min: f64,
    pub streak_warn: u32,
    pub streak_caution: u32,

    pub pttc_warn_s: f64,
    pub pttc_caution_s: f64,

    /// Box height / frame height at or above which the object is mega-close
    pub mega_close_boxh_ratio: f64,
    /// Box area / frame area at or above which the object is mega-close
    pub mega_close_area_ratio: f64,

    /// Frames a de-escalation has to wait after the last escalation
    pub hysteresis_frames: u32,
    /// Frames without a detection before a track's state is dropped
    pub stale_frames: u64,

    /// Ranking weight per class name; unknown classes weigh 1.0
    pub class_weights: HashMap<String, f64>,
    pub center_bonus: f64,
    pub approach_bonus: f64,
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        Self {
            center_band_ratio: 0.45,
            near_center_band_ratio: 0.65,
            ema_alpha: 0.35,
            closing_rate_min: 0.02,
            streak_warn: 8,
            streak_caution: 4,
            pttc_warn_s: 2.0,
            pttc_caution_s: 4.0,
            mega_close_boxh_ratio: 0.55,
            mega_close_area_ratio: 0.35,
            hysteresis_frames: 10,
            stale_frames: 30,
            class_weights: HashMap::from([
                ("Person".to_string(), 1.0),
                ("Cart".to_string(), 0.8),
            ]),
            center_bonus: 0.2,
            approach_bonus: 0.2,
        }
    }
}

impl RiskEngineConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.ema_alpha > 0.0 && self.ema_alpha <= 1.0,
            "ema_alpha must be in (0, 1], got {}",
            self.ema_alpha
        );
        check_ratio("center_band_ratio", self.center_band_ratio)?;
        check_ratio("near_center_band_ratio", self.near_center_band_ratio)?;
        ensure!(
            self.near_center_band_ratio >= self.center_band_ratio,
            "near_center_band_ratio ({}) must not be narrower than center_band_ratio ({})",
            self.near_center_band_ratio,
            self.center_band_ratio
        );
        check_ratio("mega_close_boxh_ratio", self.mega_close_boxh_ratio)?;
        check_ratio("mega_close_area_ratio", self.mega_close_area_ratio)?;

        ensure!(
            self.closing_rate_min.is_finite() && self.closing_rate_min >= 0.0,
            "closing_rate_min must be a non-negative number, got {}",
            self.closing_rate_min
        );
        for (name, value) in [
            ("pttc_warn_s", self.pttc_warn_s),
            ("pttc_caution_s", self.pttc_caution_s),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "{name} must be a positive number of seconds, got {value}"
            );
        }
        ensure!(
            self.streak_caution <= self.streak_warn,
            "streak_caution ({}) must not exceed streak_warn ({})",
            self.streak_caution,
            self.streak_warn
        );

        for (name, value) in [
            ("center_bonus", self.center_bonus),
            ("approach_bonus", self.approach_bonus),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a non-negative number, got {value}"
            );
        }
        for (class, weight) in &self.class_weights {
            if !weight.is_finite() || *weight < 0.0 {
                bail!("class weight for '{class}' must be a non-negative number, got {weight}");
            }
        }
        Ok(())
    }

    pub fn class_weight(&self, class_name: &str) -> f64 {
        self.class_weights.get(class_name).copied().unwrap_or(1.0)
    }
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    ensure!(
        value > 0.0 && value <= 1.0,
        "{name} must be in (0, 1], got {value}"
    );
    Ok(())
}

// ============================================================================
// APPLICATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub risk: RiskEngineConfig,
    pub replay: ReplayConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    pub input_dir: PathBuf,
    pub extension: String,
    /// Used when recordings carry no timestamps
    pub fallback_fps: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("recordings"),
            extension: "jsonl".to_string(),
            fallback_fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// WARN onset log; disabled when absent
    pub events_path: Option<PathBuf>,
    pub max_pending_events: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            events_path: Some(PathBuf::from("runs_obstacle/events.jsonl")),
            max_pending_events: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "cart_obstacle_risk=info,obstacle_replay=info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.risk.validate().context("invalid risk section")?;
        ensure!(
            self.replay.fallback_fps.is_finite() && self.replay.fallback_fps >= 0.0,
            "replay.fallback_fps must be a non-negative number, got {}",
            self.replay.fallback_fps
        );
        ensure!(
            self.output.max_pending_events > 0,
            "output.max_pending_events must be at least 1"
        );
        Ok(())
    }
}
