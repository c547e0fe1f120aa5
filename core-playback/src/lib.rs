//! # Playback Controller
//!
//! Single-track playback over a shuffled queue drawn from a catalog.
//!
//! ## Overview
//!
//! This crate handles:
//! - The playback state machine (`None`, `Stopped`, `Buffering`, `Playing`,
//!   `Paused`, `Error`) driven by transport commands
//! - Audio focus negotiation, ducking and deferred resume
//! - Route changes (headset unplugged or plugged)
//! - A shuffled queue with a wrap-around cursor
//! - Periodic position reporting to observers
//!
//! All state lives in one actor task; see [`controller`].

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod focus;
mod message;
pub mod observer;
pub mod queue;
pub mod reporter;
pub mod state;

pub use config::{PlaybackConfig, ResumePolicy};
pub use controller::{ControllerHandle, PlaybackController};
pub use error::{PlaybackError, Result};
pub use focus::{AudioFocusCoordinator, FocusLevel};
pub use message::{Command, CommandOrigin, EngineEvent};
pub use observer::{EventBusObserver, ObserverId, PlaybackObserver};
pub use queue::{QueueId, QueueItem, QueueManager, QueueSnapshot};
pub use state::{PlaybackActions, PlaybackSnapshot, PlaybackStatus};
