//! Tracking-event cleaning collaborators.
//!
//! Deduplication and other archive repair happen upstream; the pipeline
//! only needs a pure `events -> events` step. Whatever the cleaner
//! returns is the list that `event_list_idx` refers to.

use crate::event::TrackingEvent;

/// A pure transformation applied to raw tracking events before indexing.
pub trait EventCleaner: Sync {
    /// Return the cleaned event list.
    fn clean(&self, events: Vec<TrackingEvent>) -> Vec<TrackingEvent>;
}

/// Returns events unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCleaner;

impl EventCleaner for PassthroughCleaner {
    fn clean(&self, events: Vec<TrackingEvent>) -> Vec<TrackingEvent> {
        events
    }
}

/// Drops events that carry no frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropEmptyEvents;

impl EventCleaner for DropEmptyEvents {
    fn clean(&self, events: Vec<TrackingEvent>) -> Vec<TrackingEvent> {
        events.into_iter().filter(|e| !e.frames.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Frame, GameId};

    fn events() -> Vec<TrackingEvent> {
        vec![
            TrackingEvent::new(GameId::new(1), 1, vec![Frame::with_clock(Some(1.0))]),
            TrackingEvent::new(GameId::new(1), 1, vec![]),
            TrackingEvent::new(GameId::new(1), 2, vec![Frame::with_clock(None)]),
        ]
    }

    #[test]
    fn passthrough_keeps_everything() {
        assert_eq!(PassthroughCleaner.clean(events()), events());
    }

    #[test]
    fn drop_empty_keeps_order() {
        let cleaned = DropEmptyEvents.clean(events());
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].quarter, 1);
        assert_eq!(cleaned[1].quarter, 2);
    }
}
