//! # Playback Configuration
//!
//! Tunables for the playback controller.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a regained focus may resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResumePolicy {
    /// Any playback interrupted by a focus loss resumes on gain.
    #[default]
    Always,
    /// Only playback the user explicitly started with `play()` resumes;
    /// starts triggered by route changes stay paused.
    ExplicitPlayOnly,
}

/// Playback controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Output volume while focus is held.
    ///
    /// Default: 1.0.
    #[serde(default = "default_normal_volume")]
    pub normal_volume: f32,

    /// Output volume while another source is heard and ducking is allowed.
    ///
    /// Default: 0.2.
    #[serde(default = "default_duck_volume")]
    pub duck_volume: f32,

    /// Interval between position samples while playing.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_position_interval")]
    pub position_interval: Duration,

    /// Title given to queues built from the catalog.
    ///
    /// Default: "Random queue".
    #[serde(default = "default_queue_title")]
    pub queue_title: String,

    /// Deferred resume policy after a focus loss.
    #[serde(default)]
    pub resume_policy: ResumePolicy,

    /// Pause when output is about to become noisy (headset removed).
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub pause_on_becoming_noisy: bool,

    /// Start playing when a headset is plugged in.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub play_on_headset_plug: bool,

    /// Mailbox capacity of the controller actor.
    ///
    /// Default: 64.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            normal_volume: default_normal_volume(),
            duck_volume: default_duck_volume(),
            position_interval: default_position_interval(),
            queue_title: default_queue_title(),
            resume_policy: ResumePolicy::default(),
            pause_on_becoming_noisy: default_true(),
            play_on_headset_plug: default_true(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl PlaybackConfig {
    /// Configuration for hosts that must never start audio on their own.
    ///
    /// Route changes only pause, and focus gains only resume playback the
    /// user started explicitly.
    pub fn conservative() -> Self {
        Self {
            resume_policy: ResumePolicy::ExplicitPlayOnly,
            play_on_headset_plug: false,
            ..Default::default()
        }
    }

    /// Configuration with a faster position reporter for scrubbing UIs.
    pub fn responsive() -> Self {
        Self {
            position_interval: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.normal_volume) {
            return Err(PlaybackError::InvalidConfig(
                "normal_volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.duck_volume) {
            return Err(PlaybackError::InvalidConfig(
                "duck_volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.duck_volume > self.normal_volume {
            return Err(PlaybackError::InvalidConfig(
                "duck_volume cannot exceed normal_volume".to_string(),
            ));
        }

        if self.position_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "position_interval must be > 0".to_string(),
            ));
        }

        if self.mailbox_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "mailbox_capacity must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_normal_volume() -> f32 {
    1.0
}

fn default_duck_volume() -> f32 {
    0.2
}

fn default_position_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_queue_title() -> String {
    "Random queue".to_string()
}

fn default_true() -> bool {
    true
}

fn default_mailbox_capacity() -> usize {
    64
}
