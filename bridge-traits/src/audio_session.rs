//! Audio Session Abstractions
//!
//! Shared-output arbitration and output route notifications supplied by the
//! host environment.
//!
//! # Platform Support
//!
//! - **Android**: `AudioManager` focus requests, `ACTION_AUDIO_BECOMING_NOISY`
//!   and headset plug broadcasts
//! - **iOS**: `AVAudioSession` interruptions and route changes
//! - **Desktop**: no system arbitration; see `bridge-desktop`

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};

/// Outcome of asking the host for audio focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequestResult {
    /// Exclusive playback priority was granted.
    Granted,
    /// Another source holds priority; playback must not start.
    Denied,
}

/// Focus change notified asynchronously by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Full focus (re)gained.
    Gain,
    /// Focus lost for an unbounded time.
    Loss,
    /// Focus lost for a short time; another source must be heard alone.
    LossTransient,
    /// Focus lost for a short time; playback may continue at low volume.
    LossTransientCanDuck,
}

impl FocusChange {
    /// Whether this change is any kind of loss.
    pub fn is_loss(&self) -> bool {
        !matches!(self, FocusChange::Gain)
    }

    /// Whether playback may continue at reduced volume.
    pub fn can_duck(&self) -> bool {
        matches!(self, FocusChange::LossTransientCanDuck)
    }
}

/// Audio focus host trait
///
/// Requests and abandons shared playback priority. The core tracks whether
/// focus is held and avoids redundant calls, so implementations may forward
/// each call straight to the OS.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioFocusHost: PlatformSendSync {
    /// Ask for exclusive playback priority.
    async fn request_focus(&self) -> Result<FocusRequestResult>;

    /// Relinquish playback priority.
    async fn abandon_focus(&self) -> Result<()>;

    /// Subscribe to focus changes.
    ///
    /// Implementations should emit an event whenever another source takes or
    /// returns priority.
    async fn subscribe_changes(&self) -> Result<Box<dyn FocusChangeStream>>;
}

/// Stream of focus changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait FocusChangeStream: PlatformSend {
    /// Get the next focus change
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<FocusChange>;
}

/// Output route notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChange {
    /// Output is about to switch to the built-in speaker.
    BecomingNoisy,
    /// Wired headset removed.
    HeadsetUnplugged,
    /// Wired headset inserted.
    HeadsetPlugged,
}

/// Audio route monitor trait
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioRouteMonitor: PlatformSendSync {
    /// Subscribe to output route changes.
    async fn subscribe_changes(&self) -> Result<Box<dyn RouteChangeStream>>;
}

/// Stream of route changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait RouteChangeStream: PlatformSend {
    /// Get the next route change
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<RouteChange>;
}
