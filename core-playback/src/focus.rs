//! # Audio Focus Coordination
//!
//! Tracks whether shared-output priority is held and at what level, so the
//! controller never issues redundant host calls and never starts output
//! without permission.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AudioFocusHost, FocusChange, FocusChangeStream, FocusRequestResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Permission level for producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusLevel {
    /// Output must stay silent.
    #[default]
    NoFocusNoDuck,
    /// Output may continue at reduced volume.
    NoFocusCanDuck,
    /// Full output allowed.
    Focused,
}

impl FocusLevel {
    /// Whether the engine may be started at this level.
    pub fn allows_output(&self) -> bool {
        !matches!(self, FocusLevel::NoFocusNoDuck)
    }
}

impl fmt::Display for FocusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FocusLevel::NoFocusNoDuck => "no_focus_no_duck",
            FocusLevel::NoFocusCanDuck => "no_focus_can_duck",
            FocusLevel::Focused => "focused",
        };
        f.write_str(name)
    }
}

impl From<FocusChange> for FocusLevel {
    fn from(change: FocusChange) -> Self {
        match change {
            FocusChange::Gain => FocusLevel::Focused,
            FocusChange::LossTransientCanDuck => FocusLevel::NoFocusCanDuck,
            FocusChange::Loss | FocusChange::LossTransient => FocusLevel::NoFocusNoDuck,
        }
    }
}

/// Wraps the host focus bridge with held/level bookkeeping.
pub struct AudioFocusCoordinator {
    host: Arc<dyn AudioFocusHost>,
    held: bool,
    level: FocusLevel,
}

impl AudioFocusCoordinator {
    pub fn new(host: Arc<dyn AudioFocusHost>) -> Self {
        Self {
            host,
            held: false,
            level: FocusLevel::NoFocusNoDuck,
        }
    }

    pub fn level(&self) -> FocusLevel {
        self.level
    }

    /// Whether a focus request is currently registered with the host.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Ask for focus unless it is already held.
    ///
    /// Denials and host errors leave the level at `NoFocusNoDuck`.
    pub async fn request_focus(&mut self) -> FocusLevel {
        if self.held {
            return self.level;
        }

        match self.host.request_focus().await {
            Ok(FocusRequestResult::Granted) => {
                self.held = true;
                self.level = FocusLevel::Focused;
                debug!(focus = %self.level, "Audio focus granted");
            }
            Ok(FocusRequestResult::Denied) => {
                self.level = FocusLevel::NoFocusNoDuck;
                debug!("Audio focus denied");
            }
            Err(err) => {
                self.level = FocusLevel::NoFocusNoDuck;
                warn!(error = %err, "Audio focus request failed, treating as denied");
            }
        }
        self.level
    }

    /// Give focus back to the host. No-op when not held.
    pub async fn abandon_focus(&mut self) {
        if !self.held {
            return;
        }

        if let Err(err) = self.host.abandon_focus().await {
            warn!(error = %err, "Failed to abandon audio focus");
        }
        self.held = false;
        self.level = FocusLevel::NoFocusNoDuck;
        debug!("Audio focus abandoned");
    }

    /// Record a change notified by the host and return the new level.
    ///
    /// A permanent loss revokes the registration, transient losses keep it.
    pub fn apply_change(&mut self, change: FocusChange) -> FocusLevel {
        match change {
            FocusChange::Gain => self.held = true,
            FocusChange::Loss => self.held = false,
            FocusChange::LossTransient | FocusChange::LossTransientCanDuck => {}
        }
        self.level = FocusLevel::from(change);
        debug!(?change, focus = %self.level, "Audio focus changed");
        self.level
    }

    pub async fn subscribe_changes(&self) -> BridgeResult<Box<dyn FocusChangeStream>> {
        self.host.subscribe_changes().await
    }
}
