// src/pipeline/mod.rs

pub mod alarm;
pub mod assessment;
pub mod event_bus;
pub mod fps;
pub mod metrics;
pub mod orchestrator;

pub use alarm::{AlarmGate, WarnEvent};
pub use assessment::{AssessedObject, FrameAssessment};
pub use event_bus::{EventBus, ObstacleEvent};
pub use fps::FpsEstimator;
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use orchestrator::{FpsSource, FrameInput, ObstaclePipeline};
