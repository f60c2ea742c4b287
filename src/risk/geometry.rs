// src/risk/geometry.rs
//
// Bounding-box geometry → distance proxy and center-zone membership.
// Pure; all denominators are clamped so degenerate boxes and zero-sized
// frames never produce NaN or infinity.

use crate::config::RiskEngineConfig;
use crate::types::{Detection, FrameSize};

const W_INV_HEIGHT: f64 = 0.60;
const W_INV_SQRT_AREA: f64 = 0.25;
const W_BOTTOM_GAP: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    /// Clamped width in pixels (>= 1)
    pub box_w: f64,
    /// Clamped height in pixels (>= 1)
    pub box_h: f64,
    pub area: f64,
    pub center_x: f64,
    pub in_center: bool,
    pub in_near_center: bool,
    /// Raw, unsmoothed distance proxy (smaller = closer)
    pub dist_proxy: f64,
    pub mega_close: bool,
}

impl BoxGeometry {
    pub fn measure(det: &Detection, frame: FrameSize, cfg: &RiskEngineConfig) -> Self {
        let [x1, y1, x2, y2] = det.bbox.map(|v| v as f64);
        let w = frame.width_px();
        let h = frame.height_px();

        let box_w = (x2 - x1).max(1.0);
        let box_h = (y2 - y1).max(1.0);
        let area = box_w * box_h;
        let center_x = det.center_x();

        let in_center = in_band(center_x, w, cfg.center_band_ratio);
        let in_near_center = in_band(center_x, w, cfg.near_center_band_ratio);

        let dist_proxy = distance_proxy(box_h, area, y2, h);

        let mega_close = box_h / h.max(1.0) >= cfg.mega_close_boxh_ratio
            || area / (w * h).max(1.0) >= cfg.mega_close_area_ratio;

        Self {
            box_w,
            box_h,
            area,
            center_x,
            in_center,
            in_near_center,
            dist_proxy,
            mega_close,
        }
    }
}

/// Is `cx` inside the middle `ratio` of a frame `frame_w` pixels wide?
pub fn in_band(cx: f64, frame_w: f64, ratio: f64) -> bool {
    let left = (1.0 - ratio) * 0.5 * frame_w;
    let right = frame_w - left;
    left <= cx && cx <= right
}

/// Weighted sum of inverse height, inverse sqrt-area and the gap between the
/// box bottom and the frame bottom. Unit-less.
pub fn distance_proxy(box_h: f64, area: f64, y2: f64, frame_h: f64) -> f64 {
    let inv_h = 1.0 / box_h.max(1.0);
    let inv_sqrt_area = 1.0 / area.sqrt().max(1.0);
    let bottom_gap = ((frame_h - y2) / frame_h.max(1.0)).max(0.0);
    W_INV_HEIGHT * inv_h + W_INV_SQRT_AREA * inv_sqrt_area + W_BOTTOM_GAP * bottom_gap
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    fn measure(bbox: [f32; 4]) -> BoxGeometry {
        BoxGeometry::measure(
            &Detection::new(1, "Person", bbox),
            FRAME,
            &RiskEngineConfig::default(),
        )
    }

    #[test]
    fn test_distance_proxy_formula() {
        let g = measure([270.0, 150.0, 370.0, 300.0]);
        assert_eq!(g.box_h, 150.0);
        assert_eq!(g.area, 15000.0);
        let expected = 0.60 / 150.0 + 0.25 / 15000f64.sqrt() + 0.15 * (180.0 / 480.0);
        assert!((g.dist_proxy - expected).abs() < 1e-12, "{}", g.dist_proxy);
    }

    #[test]
    fn test_bigger_lower_box_is_closer() {
        let far = measure([300.0, 100.0, 340.0, 160.0]);
        let near = measure([250.0, 150.0, 390.0, 420.0]);
        assert!(near.dist_proxy < far.dist_proxy);
    }

    #[test]
    fn test_center_bands() {
        // center band 0.45 of 640 → [176, 464]; near band 0.65 → [112, 528]
        let centered = measure([300.0, 100.0, 340.0, 200.0]);
        assert!(centered.in_center && centered.in_near_center);

        let near_only = measure([120.0, 100.0, 160.0, 200.0]); // cx = 140
        assert!(!near_only.in_center);
        assert!(near_only.in_near_center);

        let edge = measure([0.0, 100.0, 60.0, 200.0]); // cx = 30
        assert!(!edge.in_center && !edge.in_near_center);

        let inner_edge = measure([170.0, 100.0, 184.0, 200.0]); // cx = 177
        assert!(inner_edge.in_center);
    }

    #[test]
    fn test_mega_close_by_height() {
        let g = measure([300.0, 100.0, 340.0, 400.0]); // 300 / 480 = 0.625
        assert!(g.mega_close);
        let g = measure([300.0, 100.0, 340.0, 300.0]); // 200 / 480
        assert!(!g.mega_close);
    }

    #[test]
    fn test_mega_close_by_area() {
        // 560 x 200 = 112000 / 307200 ≈ 0.365, height ratio only 0.42
        let g = measure([40.0, 200.0, 600.0, 400.0]);
        assert!(g.mega_close);
    }

    #[test]
    fn test_degenerate_box_is_clamped() {
        let g = measure([100.0, 100.0, 100.0, 100.0]);
        assert_eq!(g.box_w, 1.0);
        assert_eq!(g.box_h, 1.0);
        assert_eq!(g.area, 1.0);
        assert!(g.dist_proxy.is_finite());

        let inverted = measure([200.0, 200.0, 100.0, 100.0]);
        assert_eq!(inverted.area, 1.0);
    }

    #[test]
    fn test_zero_sized_frame_is_finite() {
        let g = BoxGeometry::measure(
            &Detection::new(1, "Person", [0.0, 0.0, 10.0, 10.0]),
            FrameSize::new(0, 0),
            &RiskEngineConfig::default(),
        );
        assert!(g.dist_proxy.is_finite());
        assert!(g.mega_close);
    }

    #[test]
    fn test_box_below_frame_has_no_negative_gap() {
        let inside = distance_proxy(100.0, 10000.0, 480.0, 480.0);
        let below = distance_proxy(100.0, 10000.0, 600.0, 480.0);
        assert_eq!(inside, below);
    }
}
