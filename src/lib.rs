//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-service`, `core-playback`, `core-runtime`). Host applications
//! can depend on `shuffle-player-workspace` and enable the documented features
//! without wiring each crate individually.
//!
//! - `desktop-shims` (default): the full service façade with desktop bridges.
//! - `playback-only`: just the controller and runtime crates, for hosts that
//!   provide every bridge themselves.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;

#[cfg(feature = "playback-only")]
pub use core_runtime as runtime;
