//! # Playback Observers
//!
//! Read-only listeners (notification, UI, broadcast) notified by the
//! controller after every transition. Callbacks run inside the controller's
//! handler and must return quickly; anything slow belongs on the listener's
//! own task.

use crate::queue::QueueSnapshot;
use crate::state::PlaybackSnapshot;
use bridge_traits::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, QueueEvent};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Listener contract for playback changes.
pub trait PlaybackObserver: Send + Sync {
    /// A new snapshot was published.
    fn on_state_changed(&self, snapshot: &PlaybackSnapshot, track: Option<&Arc<Track>>);

    /// Periodic sample while playing.
    fn on_position_tick(&self, position: Duration, duration: Duration);

    /// The current track changed. `None` clears the "now playing" presentation.
    fn on_metadata_changed(&self, _track: Option<&Arc<Track>>) {}

    /// A new queue was built.
    fn on_queue_changed(&self, _queue: &QueueSnapshot) {}
}

/// Registration handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Ordered set of registered observers.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: Vec<(ObserverId, Arc<dyn PlaybackObserver>)>,
}

impl ObserverRegistry {
    pub fn add(&mut self, observer: Arc<dyn PlaybackObserver>) -> ObserverId {
        let id = ObserverId::new();
        self.observers.push((id, observer));
        id
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn state_changed(&self, snapshot: &PlaybackSnapshot, track: Option<&Arc<Track>>) {
        for (_, observer) in &self.observers {
            observer.on_state_changed(snapshot, track);
        }
    }

    pub fn position_tick(&self, position: Duration, duration: Duration) {
        for (_, observer) in &self.observers {
            observer.on_position_tick(position, duration);
        }
    }

    pub fn metadata_changed(&self, track: Option<&Arc<Track>>) {
        for (_, observer) in &self.observers {
            observer.on_metadata_changed(track);
        }
    }

    pub fn queue_changed(&self, queue: &QueueSnapshot) {
        for (_, observer) in &self.observers {
            observer.on_queue_changed(queue);
        }
    }
}

/// Republishes every callback on the runtime event bus.
#[derive(Debug, Clone)]
pub struct EventBusObserver {
    bus: EventBus,
}

impl EventBusObserver {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, event: CoreEvent) {
        // No subscribers is not an error for a broadcast.
        let _ = self.bus.emit(event);
    }
}

impl PlaybackObserver for EventBusObserver {
    fn on_state_changed(&self, snapshot: &PlaybackSnapshot, track: Option<&Arc<Track>>) {
        self.publish(CoreEvent::Playback(PlaybackEvent::StateChanged {
            state: snapshot.status.name().to_string(),
            position_ms: snapshot.position.as_millis() as u64,
            updated_at_ms: snapshot.updated_at.as_millis() as u64,
            actions: snapshot.actions.bits(),
            error_message: snapshot.error_message().map(str::to_string),
            track_id: track.map(|t| t.id.clone()),
            favorite: snapshot.favorite,
        }));
    }

    fn on_position_tick(&self, position: Duration, duration: Duration) {
        self.publish(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_ms: position.as_millis() as u64,
            duration_ms: duration.as_millis() as u64,
        }));
    }

    fn on_metadata_changed(&self, track: Option<&Arc<Track>>) {
        let event = match track {
            Some(track) => PlaybackEvent::TrackChanged {
                track_id: track.id.clone(),
                title: track.title.clone(),
                artist: track.artist.clone(),
                duration_ms: track.duration_ms,
            },
            None => PlaybackEvent::NowPlayingCleared,
        };
        self.publish(CoreEvent::Playback(event));
    }

    fn on_queue_changed(&self, queue: &QueueSnapshot) {
        self.publish(CoreEvent::Queue(QueueEvent::Replaced {
            title: queue.title.clone(),
            track_ids: queue.items.iter().map(|item| item.track.id.clone()).collect(),
            current_index: queue.current_index,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueItem;
    use crate::state::{PlaybackActions, PlaybackStatus};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Counting {
        states: Mutex<Vec<String>>,
    }

    impl PlaybackObserver for Counting {
        fn on_state_changed(&self, snapshot: &PlaybackSnapshot, _track: Option<&Arc<Track>>) {
            self.states.lock().push(snapshot.status.name().to_string());
        }

        fn on_position_tick(&self, _position: Duration, _duration: Duration) {}
    }

    #[test]
    fn registry_add_and_remove() {
        let mut registry = ObserverRegistry::default();
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());

        let first_id = registry.add(first.clone());
        registry.add(second.clone());
        registry.state_changed(&PlaybackSnapshot::default(), None);

        assert!(registry.remove(first_id));
        assert!(!registry.remove(first_id));
        registry.state_changed(&PlaybackSnapshot::default(), None);

        assert_eq!(first.states.lock().len(), 1);
        assert_eq!(second.states.lock().len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn event_bus_observer_translates_callbacks() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let observer = EventBusObserver::new(bus);
        let track = Arc::new(Track::new("t1", "Title", "Artist", "uri", 5_000));

        let snapshot = PlaybackSnapshot {
            status: PlaybackStatus::Error("Cannot skip".to_string()),
            actions: PlaybackActions::PLAY,
            favorite: Some(true),
            ..Default::default()
        };
        observer.on_state_changed(&snapshot, Some(&track));
        observer.on_metadata_changed(None);
        observer.on_queue_changed(&QueueSnapshot {
            title: "Random queue".to_string(),
            items: vec![QueueItem {
                queue_id: 0,
                track: track.clone(),
            }],
            current_index: Some(0),
        });

        match rx.recv().await.unwrap() {
            CoreEvent::Playback(PlaybackEvent::StateChanged {
                state,
                error_message,
                track_id,
                favorite,
                actions,
                ..
            }) => {
                assert_eq!(state, "Error");
                assert_eq!(error_message.as_deref(), Some("Cannot skip"));
                assert_eq!(track_id.as_deref(), Some("t1"));
                assert_eq!(favorite, Some(true));
                assert_eq!(actions, PlaybackActions::PLAY.bits());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            rx.recv().await.unwrap(),
            CoreEvent::Playback(PlaybackEvent::NowPlayingCleared)
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            CoreEvent::Queue(QueueEvent::Replaced { ref track_ids, .. }) if track_ids == &vec!["t1".to_string()]
        ));
    }
}
