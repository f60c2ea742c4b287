// src/main.rs
//
// Replays recorded detector/tracker output through the obstacle risk
// pipeline and logs what the cart's alarm would have done.
//
//   obstacle-replay [config.yaml]

use anyhow::Result;
use cart_obstacle_risk::config::AppConfig;
use cart_obstacle_risk::event_log::WarnEventLog;
use cart_obstacle_risk::pipeline::{FpsSource, ObstacleEvent, ObstaclePipeline};
use cart_obstacle_risk::replay::{find_recordings, load_recording};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct ReplayStats {
    total_frames: u64,
    skipped_lines: usize,
    caution_frames: u64,
    warn_frames: u64,
    level_changes: u64,
    warn_onsets: u64,
    tracks_reaped: u64,
    duration_secs: f64,
}

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.yaml".to_string());
    let config = if Path::new(&config_path).exists() {
        AppConfig::load(&config_path)?
    } else {
        AppConfig::default()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🛒 Obstacle risk replay starting");
    if Path::new(&config_path).exists() {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using built-in defaults", config_path);
    }
    info!(
        "Risk thresholds: streak warn/caution={}/{}, pTTC warn/caution={:.1}s/{:.1}s, hysteresis={} frames, stale={} frames",
        config.risk.streak_warn,
        config.risk.streak_caution,
        config.risk.pttc_warn_s,
        config.risk.pttc_caution_s,
        config.risk.hysteresis_frames,
        config.risk.stale_frames
    );

    let recordings = find_recordings(&config.replay.input_dir, &config.replay.extension);
    if recordings.is_empty() {
        error!(
            "No *.{} recordings found in {}",
            config.replay.extension,
            config.replay.input_dir.display()
        );
        return Ok(());
    }
    info!("Found {} recording(s) to replay", recordings.len());

    let mut event_log = match &config.output.events_path {
        Some(path) => Some(WarnEventLog::open(path)?),
        None => None,
    };

    for (idx, path) in recordings.iter().enumerate() {
        info!("========================================");
        info!("Replaying {}/{}: {}", idx + 1, recordings.len(), path.display());
        info!("========================================");

        match replay_file(path, &config, event_log.as_mut()) {
            Ok(stats) => {
                info!("✓ Replay complete");
                info!("  Total frames: {}", stats.total_frames);
                if stats.skipped_lines > 0 {
                    warn!("  Skipped malformed lines: {}", stats.skipped_lines);
                }
                info!("  CAUTION frames: {}", stats.caution_frames);
                info!("  WARN frames: {}", stats.warn_frames);
                info!("  🔔 Level changes: {}", stats.level_changes);
                info!("  🚨 WARN onsets: {}", stats.warn_onsets);
                info!("  Tracks expired: {}", stats.tracks_reaped);
                info!(
                    "  Processing speed: {:.0} frames/s",
                    stats.total_frames as f64 / stats.duration_secs.max(1e-6)
                );
            }
            Err(e) => error!("Failed to replay {}: {:#}", path.display(), e),
        }
    }

    if let Some(log) = &event_log {
        info!("{} WARN event(s) written to {}", log.written(), log.path().display());
    }
    Ok(())
}

fn replay_file(
    path: &Path,
    config: &AppConfig,
    mut event_log: Option<&mut WarnEventLog>,
) -> Result<ReplayStats> {
    let started = Instant::now();
    let recording = load_recording(path)?;

    let fps_source = if recording.frames.iter().any(|f| f.timestamp_s.is_some()) {
        FpsSource::Timestamps
    } else {
        FpsSource::Fixed(config.replay.fallback_fps)
    };
    let mut pipeline = ObstaclePipeline::new(
        config.risk.clone(),
        fps_source,
        config.output.max_pending_events,
    )?;

    let source = path.to_string_lossy();
    for record in recording.frames {
        pipeline.process(record.into());

        for event in pipeline.drain_events() {
            match event {
                ObstacleEvent::LevelChanged { frame_index, to, object, .. } => {
                    if let Some(obj) = object {
                        info!("Frame {}: {} ← {}", frame_index, to, obj.summary());
                    }
                }
                ObstacleEvent::WarnOnset(warn_event) => {
                    warn!(
                        "🚨 WARN onset: {} id={} at frame {} (pTTC={:.2}s, score={:.0})",
                        warn_event.class_name,
                        warn_event.track_id,
                        warn_event.frame_index,
                        warn_event.pttc_s,
                        warn_event.score
                    );
                    if let Some(log) = event_log.as_deref_mut() {
                        log.append(&source, &warn_event)?;
                    }
                }
            }
        }
    }

    let summary = pipeline.metrics().summary();
    Ok(ReplayStats {
        total_frames: summary.total_frames,
        skipped_lines: recording.skipped_lines,
        caution_frames: summary.caution_frames,
        warn_frames: summary.warn_frames,
        level_changes: summary.level_changes,
        warn_onsets: summary.warn_onsets,
        tracks_reaped: summary.tracks_reaped,
        duration_secs: started.elapsed().as_secs_f64(),
    })
}
