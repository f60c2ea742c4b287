// src/pipeline/fps.rs
//
// Smoothed frames-per-second from frame timestamps. The risk engine turns
// per-frame proxy deltas into per-second closing rates with this value.

const PREV_WEIGHT: f64 = 0.9;
const NEW_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FpsEstimator {
    last_timestamp_s: Option<f64>,
    fps: f64,
}

impl FpsEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the timestamp (seconds) of the frame just received and return
    /// the current estimate. Non-increasing or non-finite timestamps leave
    /// the estimate untouched.
    pub fn tick(&mut self, timestamp_s: f64) -> f64 {
        if !timestamp_s.is_finite() {
            return self.fps;
        }
        if let Some(last) = self.last_timestamp_s {
            let dt = timestamp_s - last;
            if dt > 0.0 {
                let inst = 1.0 / dt;
                self.fps = if self.fps <= 0.0 {
                    inst
                } else {
                    PREV_WEIGHT * self.fps + NEW_WEIGHT * inst
                };
            }
        }
        if self.last_timestamp_s.map_or(true, |last| timestamp_s > last) {
            self.last_timestamp_s = Some(timestamp_s);
        }
        self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
