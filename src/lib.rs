// src/lib.rs
//
// Obstacle risk assessment for a cart-mounted camera.
//
// Signal flow:
//   tracked detections → risk::RiskEngine (per-track EMA, streak, hysteresis)
//                      → pipeline::FrameAssessment (most dangerous object)
//                      → pipeline::AlarmGate → EventBus / event_log
//
// Orchestrated per stream by pipeline::ObstaclePipeline.

pub mod config;
pub mod event_log;
pub mod pipeline;
pub mod replay;
pub mod risk;
pub mod types;

pub use config::{AppConfig, RiskEngineConfig};
pub use pipeline::{FrameAssessment, FrameInput, ObstaclePipeline};
pub use risk::RiskEngine;
pub use types::{Detection, FrameSize, RiskLevel, RiskMetrics, PTTC_NEVER_S};
