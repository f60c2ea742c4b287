// src/risk/smoother.rs
//
// Per-track EMA of the distance proxy and the closing rate derived from it.

/// Below this fps the closing rate is forced to zero.
const MIN_FPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceEma {
    dist_ema: Option<f64>,
    prev_dist_ema: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub dist_ema: f64,
    /// Proxy units per second, >= 0
    pub closing_rate: f64,
}

impl DistanceEma {
    /// Feed one raw proxy observation. The first observation seeds the
    /// average directly and reports zero closing rate.
    pub fn update(&mut self, dist_proxy: f64, alpha: f64, fps: f64) -> MotionSample {
        let dist_ema = match self.dist_ema {
            None => dist_proxy,
            Some(prev) => alpha * dist_proxy + (1.0 - alpha) * prev,
        };
        self.prev_dist_ema = self.dist_ema;
        self.dist_ema = Some(dist_ema);

        let closing_rate = match self.prev_dist_ema {
            Some(prev) if fps.is_finite() && fps > MIN_FPS => {
                let rate = (prev - dist_ema) * fps;
                if rate.is_finite() {
                    rate.max(0.0)
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        MotionSample {
            dist_ema,
            closing_rate,
        }
    }

    pub fn current(&self) -> Option<f64> {
        self.dist_ema
    }

    pub fn previous(&self) -> Option<f64> {
        self.prev_dist_ema
    }
}
