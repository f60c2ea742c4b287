// src/pipeline/assessment.rs
//
// Frame-level view of the engine output: every detection paired with its
// metrics, plus the single most dangerous object of the frame.

use crate::types::{Detection, RiskLevel, RiskMetrics, PTTC_NEVER_S};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
pub struct AssessedObject {
    pub detection: Detection,
    pub metrics: RiskMetrics,
}

impl AssessedObject {
    /// Ranking key: stabilized level first, then score.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.metrics
            .risk_level
            .cmp(&other.metrics.risk_level)
            .then_with(|| {
                self.metrics
                    .score
                    .partial_cmp(&other.metrics.score)
                    .unwrap_or(Ordering::Equal)
            })
    }

    /// One-line alert text for logs and operator displays.
    pub fn summary(&self) -> String {
        let pttc = if self.metrics.pttc_s >= PTTC_NEVER_S {
            "inf".to_string()
        } else {
            format!("{:.1}s", self.metrics.pttc_s)
        };
        format!(
            "{} | {} id={} | pTTC={} | dist={:.4} | center={} | approaching={}",
            self.metrics.risk_name,
            self.detection.class_name,
            self.detection.track_id,
            pttc,
            self.metrics.dist_proxy,
            self.metrics.in_center,
            self.metrics.approaching
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameAssessment {
    pub frame_index: u64,
    pub fps: f64,
    pub objects: Vec<AssessedObject>,
    /// Index into `objects` of the most dangerous object
    pub highest_risk: Option<usize>,
}

impl FrameAssessment {
    /// Pair detections with metrics (same order) and pick the most
    /// dangerous object. A higher level always wins; within a level the
    /// higher score wins; exact ties keep the earlier detection.
    pub fn new(
        frame_index: u64,
        fps: f64,
        detections: Vec<Detection>,
        metrics: Vec<RiskMetrics>,
    ) -> Self {
        let objects: Vec<AssessedObject> = detections
            .into_iter()
            .zip(metrics)
            .map(|(detection, metrics)| AssessedObject { detection, metrics })
            .collect();

        let mut highest_risk: Option<usize> = None;
        for (idx, obj) in objects.iter().enumerate() {
            let better = match highest_risk {
                None => true,
                Some(best) => obj.rank_cmp(&objects[best]) == Ordering::Greater,
            };
            if better {
                highest_risk = Some(idx);
            }
        }

        Self {
            frame_index,
            fps,
            objects,
            highest_risk,
        }
    }

    pub fn highest_risk_object(&self) -> Option<&AssessedObject> {
        self.highest_risk.and_then(|idx| self.objects.get(idx))
    }

    /// Level of the most dangerous object; SAFE for an empty frame.
    pub fn level(&self) -> RiskLevel {
        self.highest_risk_object()
            .map(|obj| obj.metrics.risk_level)
            .unwrap_or_default()
    }

    /// 0.0 / 0.5 / 1.0 for SAFE / CAUTION / WARN.
    pub fn danger_level(&self) -> f32 {
        self.level().danger_level()
    }

    pub fn object_type(&self) -> Option<&str> {
        self.highest_risk_object()
            .map(|obj| obj.detection.class_name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.highest_risk_object() {
            Some(obj) => format!("BEST: {} | fps={:.1}", obj.summary(), self.fps),
            None => format!("No detections | fps={:.1}", self.fps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(level: RiskLevel, score: f64) -> RiskMetrics {
        RiskMetrics {
            risk_level: level,
            risk_name: level.as_str(),
            score,
            pttc_s: PTTC_NEVER_S,
            dist_proxy: 0.05,
            closing_rate: 0.0,
            in_center: true,
            in_near_center: true,
            approaching: false,
            mega_close: false,
            box_h: 100.0,
            area: 5000.0,
        }
    }

    fn det(id: i64) -> Detection {
        Detection::new(id, "Person", [0.0, 0.0, 10.0, 10.0])
    }

    #[test]
    fn test_empty_frame_is_safe() {
        let a = FrameAssessment::new(0, 30.0, vec![], vec![]);
        assert!(a.is_empty());
        assert_eq!(a.level(), RiskLevel::Safe);
        assert_eq!(a.danger_level(), 0.0);
        assert!(a.highest_risk_object().is_none());
        assert_eq!(a.summary(), "No detections | fps=30.0");
    }

    #[test]
    fn test_highest_score_wins_within_level() {
        let a = FrameAssessment::new(
            1,
            30.0,
            vec![det(1), det(2), det(3)],
            vec![
                metrics(RiskLevel::Caution, 1500.0),
                metrics(RiskLevel::Caution, 1700.0),
                metrics(RiskLevel::Safe, 900.0),
            ],
        );
        assert_eq!(a.highest_risk, Some(1));
        assert_eq!(a.level(), RiskLevel::Caution);
        assert_eq!(a.danger_level(), 0.5);
    }

    #[test]
    fn test_warn_beats_caution_with_larger_score() {
        // a very close CAUTION object can out-score a distant WARN one
        let a = FrameAssessment::new(
            2,
            30.0,
            vec![det(1), det(2)],
            vec![
                metrics(RiskLevel::Caution, 9000.0),
                metrics(RiskLevel::Warn, 2300.0),
            ],
        );
        assert_eq!(a.highest_risk, Some(1));
        assert_eq!(a.level(), RiskLevel::Warn);
        assert_eq!(a.object_type(), Some("Person"));
    }

    #[test]
    fn test_exact_tie_keeps_first() {
        let a = FrameAssessment::new(
            3,
            30.0,
            vec![det(4), det(5)],
            vec![
                metrics(RiskLevel::Safe, 400.0),
                metrics(RiskLevel::Safe, 400.0),
            ],
        );
        assert_eq!(a.highest_risk, Some(0));
    }

    #[test]
    fn test_summary_text() {
        let mut m = metrics(RiskLevel::Warn, 2500.0);
        m.pttc_s = 1.3;
        m.approaching = true;
        let obj = AssessedObject {
            detection: det(7),
            metrics: m,
        };
        assert_eq!(
            obj.summary(),
            "WARN | Person id=7 | pTTC=1.3s | dist=0.0500 | center=true | approaching=true"
        );

        let still = AssessedObject {
            detection: det(8),
            metrics: metrics(RiskLevel::Safe, 400.0),
        };
        assert!(still.summary().contains("pTTC=inf"));
    }
}
