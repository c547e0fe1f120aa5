//! # Playback State
//!
//! The tagged playback state published by the controller, the available
//! transport actions, and the snapshot observers receive.

use crate::queue::QueueId;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::time::Duration;

/// Playback state tag.
///
/// `Error` carries its message, so a message exists exactly when the tag is
/// `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing has been played yet.
    #[default]
    None,
    Stopped,
    /// A source is loading.
    Buffering,
    Playing,
    Paused,
    /// The last attempt failed; the resource has already been released.
    Error(String),
}

impl PlaybackStatus {
    /// Tag name without payload.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackStatus::None => "None",
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Buffering => "Buffering",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Error(_) => "Error",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PlaybackStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Error(message) => write!(f, "Error({})", message),
            other => f.write_str(other.name()),
        }
    }
}

/// Bitmask of transport actions a session owner may currently issue.
///
/// Bit values follow the media-session convention used by mobile hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PlaybackActions(u64);

impl PlaybackActions {
    pub const STOP: Self = Self(1 << 0);
    pub const PAUSE: Self = Self(1 << 1);
    pub const PLAY: Self = Self(1 << 2);
    pub const SKIP_TO_PREVIOUS: Self = Self(1 << 4);
    pub const SKIP_TO_NEXT: Self = Self(1 << 5);
    pub const PLAY_FROM_MEDIA_ID: Self = Self(1 << 10);
    pub const PLAY_FROM_SEARCH: Self = Self(1 << 11);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Actions available for the given state and queue cursor.
    pub fn for_state(status: &PlaybackStatus, queue_len: usize, index: Option<usize>) -> Self {
        let mut actions = Self::PLAY | Self::PLAY_FROM_MEDIA_ID | Self::PLAY_FROM_SEARCH;

        if queue_len == 0 {
            return actions;
        }

        if status.is_playing() {
            actions |= Self::PAUSE;
        }
        if let Some(index) = index {
            if index > 0 {
                actions |= Self::SKIP_TO_PREVIOUS;
            }
            if index + 1 < queue_len {
                actions |= Self::SKIP_TO_NEXT;
            }
        }
        actions
    }
}

impl BitOr for PlaybackActions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlaybackActions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Point-in-time playback state pushed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    /// Last known or requested position.
    pub position: Duration,
    /// Monotonic time the snapshot was taken.
    pub updated_at: Duration,
    pub actions: PlaybackActions,
    /// Favorite indicator of the current track, `None` without a current track.
    pub favorite: Option<bool>,
    pub current_index: Option<usize>,
    pub active_queue_id: Option<QueueId>,
}

impl PlaybackSnapshot {
    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message()
    }
}
