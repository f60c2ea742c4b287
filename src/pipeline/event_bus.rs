// src/pipeline/event_bus.rs
//
// Bounded queue between the risk pipeline and whoever dispatches alarms.
// Publishing never blocks; when full the oldest event is dropped.

use super::alarm::WarnEvent;
use super::assessment::AssessedObject;
use crate::types::RiskLevel;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObstacleEvent {
    /// The frame's top risk level differs from the previous frame's.
    LevelChanged {
        frame_index: u64,
        from: RiskLevel,
        to: RiskLevel,
        object: Option<AssessedObject>,
    },
    /// A track entered WARN.
    WarnOnset(WarnEvent),
}

pub struct EventBus {
    events: VecDeque<ObstacleEvent>,
    max_pending: usize,
    dropped: u64,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        let max_pending = max_pending.max(1);
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
            dropped: 0,
        }
    }

    pub fn publish(&mut self, event: ObstacleEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<ObstacleEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(frame_index: u64) -> ObstacleEvent {
        ObstacleEvent::LevelChanged {
            frame_index,
            from: RiskLevel::Safe,
            to: RiskLevel::Caution,
            object: None,
        }
    }

    #[test]
    fn test_drops_oldest_when_full() {
        let mut bus = EventBus::new(2);
        bus.publish(change(1));
        bus.publish(change(2));
        bus.publish(change(3));
        assert_eq!(bus.pending_count(), 2);
        assert_eq!(bus.dropped_count(), 1);

        let frames: Vec<u64> = bus
            .drain()
            .into_iter()
            .map(|e| match e {
                ObstacleEvent::LevelChanged { frame_index, .. } => frame_index,
                ObstacleEvent::WarnOnset(w) => w.frame_index,
            })
            .collect();
        assert_eq!(frames, vec![2, 3]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_serializes_with_tag() {
        let json = serde_json::to_value(change(5)).unwrap();
        assert_eq!(json["event"], "level_changed");
        assert_eq!(json["to"], "CAUTION");
    }
}
