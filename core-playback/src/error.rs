//! # Playback Error Types
//!
//! Errors surfaced by the playback core. Errors raised by host collaborators
//! inside the controller's handler never reach callers directly; they are
//! logged and folded into the state machine. These types cover the handle
//! API, engine plumbing and configuration.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The media backend could not allocate a player.
    #[error("Audio device unavailable: {0}")]
    AudioDeviceUnavailable(String),

    /// Preparing a source failed.
    #[error("Failed to load source: {0}")]
    LoadFailed(String),

    /// A control call on a prepared player failed.
    #[error("Playback operation failed: {0}")]
    PlaybackFailed(String),

    /// A control call arrived while no player is prepared.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Invalid volume value (must be in range [0.0, 1.0]).
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    // ========================================================================
    // Queue Errors
    // ========================================================================
    /// No playable item in the requested direction.
    #[error("Cannot skip")]
    SkipOutOfBounds,

    /// The catalog collaborator failed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    // ========================================================================
    // Controller Errors
    // ========================================================================
    /// The controller actor has shut down.
    #[error("Playback controller is closed")]
    ControllerClosed,

    /// The controller was spawned outside a Tokio runtime.
    #[error("No Tokio runtime available to drive the controller")]
    RuntimeUnavailable,

    /// Configuration values are out of range.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    /// Error reported by a host bridge.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
