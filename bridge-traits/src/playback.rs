//! Playback bridge traits and supporting media types.
//!
//! The playback core drives exactly one decode/output resource at a time. Host
//! applications provide a [`MediaBackend`] that manufactures that resource
//! (a [`MediaPlayer`]) and the core wraps it with its own generation tracking
//! and release discipline.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};
use std::sync::Arc;
use std::time::Duration;

/// Source handed to a player for preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// Location of the media (file path, `http(s)://` URL, content URI).
    pub uri: String,
    /// Keep the device awake while this source plays.
    pub keep_awake: bool,
}

impl MediaSource {
    /// Create a source for the given URI with the wake lock enabled.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            keep_awake: true,
        }
    }

    /// Override the wake lock hint.
    pub fn with_keep_awake(mut self, keep_awake: bool) -> Self {
        self.keep_awake = keep_awake;
        self
    }

    /// Whether the source must be fetched over the network.
    pub fn is_remote(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }
}

/// Information reported once a source finished preparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreparedMedia {
    /// Total duration, when the container reports one.
    pub duration: Option<Duration>,
}

/// Asynchronous notification raised by a player after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback reached the end of the source.
    Completed,
    /// The player hit an unrecoverable error.
    Error { what: i32, extra: i32 },
}

/// Trait for platform playback resources (one decoder plus output route).
///
/// All control calls are best-effort on an already prepared resource. The
/// core never calls `start` before `prepare` resolved successfully.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaPlayer: PlatformSendSync {
    /// Load and prepare a source. Resolves once the player could start.
    async fn prepare(&self, source: &MediaSource) -> Result<PreparedMedia>;

    /// Begin or resume output.
    async fn start(&self) -> Result<()>;

    /// Pause output, keeping the decoder and position.
    async fn pause(&self) -> Result<()>;

    /// Stop output. The player must be reset before it can prepare again.
    async fn stop(&self) -> Result<()>;

    /// Set output volume, normalized to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current playback position.
    async fn position(&self) -> Result<Duration>;

    /// Whether output is currently running.
    async fn is_playing(&self) -> Result<bool>;

    /// Return the player to its idle state so another source can be prepared.
    async fn reset(&self) -> Result<()>;

    /// Free all native resources. Calls after the first one must be no-ops.
    async fn release(&self) -> Result<()>;

    /// Subscribe to completion and error notifications.
    ///
    /// Notifications describe the most recently prepared source. Failures
    /// while preparing are returned by [`MediaPlayer::prepare`] instead.
    async fn subscribe_events(&self) -> Result<Box<dyn MediaEventStream>>;
}

/// Stream of player events
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaEventStream: PlatformSend {
    /// Get the next player event
    ///
    /// Returns `None` once the player has been released.
    async fn next(&mut self) -> Option<MediaEvent>;
}

/// Factory for playback resources.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaBackend: PlatformSendSync {
    /// Allocate a fresh player.
    async fn create_player(&self) -> Result<Arc<dyn MediaPlayer>>;
}
