//! Mailbox messages of the controller actor.
//!
//! Commands, engine callbacks, focus and route notifications, position ticks
//! and queries all arrive through one channel and are handled one at a time.

use crate::observer::{ObserverId, PlaybackObserver};
use crate::queue::{QueueId, QueueSnapshot};
use crate::state::PlaybackSnapshot;
use bridge_traits::{BridgeError, FocusChange, RouteChange, Track};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Transport command issued by the session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    SkipToNext,
    SkipToPrevious,
    SkipToQueueItem(QueueId),
    SeekTo(Duration),
    ToggleFavorite,
}

/// Who issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    /// The session owner called the handle.
    User,
    /// Translated from an output route change.
    Route,
}

/// Asynchronous engine notification tagged with the load it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Prepared {
        generation: u64,
        duration: Option<Duration>,
    },
    Completed {
        generation: u64,
    },
    Error {
        generation: u64,
        message: String,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> u64 {
        match self {
            EngineEvent::Prepared { generation, .. }
            | EngineEvent::Completed { generation }
            | EngineEvent::Error { generation, .. } => *generation,
        }
    }
}

pub(crate) enum ControllerMessage {
    Command {
        command: Command,
        origin: CommandOrigin,
        done: Option<oneshot::Sender<()>>,
    },
    Engine(EngineEvent),
    Focus(FocusChange),
    Route(RouteChange),
    PositionTick,
    QueueLoaded {
        generation: u64,
        result: Result<Vec<Track>, BridgeError>,
    },
    Snapshot(oneshot::Sender<PlaybackSnapshot>),
    Queue(oneshot::Sender<QueueSnapshot>),
    Subscribe {
        observer: Arc<dyn PlaybackObserver>,
        reply: oneshot::Sender<ObserverId>,
    },
    Unsubscribe(ObserverId),
    Shutdown(oneshot::Sender<()>),
}
