// src/risk/mod.rs
//
// Obstacle risk assessment engine.
//
// Signal flow per detection:
//   bbox → geometry (proxy, bands, mega-close) → smoother (EMA, closing rate)
//        → classifier (streak, pTTC, candidate) → hysteresis → scoring
//
// State lives in track_store, owned by one RiskEngine instance.

pub mod classifier;
pub mod engine;
pub mod geometry;
pub mod hysteresis;
pub mod scoring;
pub mod smoother;
pub mod track_store;

pub use engine::RiskEngine;
pub use geometry::BoxGeometry;
pub use hysteresis::{GateTransition, HysteresisGate};
pub use track_store::{TrackIdentity, TrackKey, TrackState};
