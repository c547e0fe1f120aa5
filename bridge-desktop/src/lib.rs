//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Desktop operating systems have no media-session arbitration comparable to
//! mobile platforms. This crate provides the implementations a desktop host
//! starts from:
//! - `InMemoryCatalog`: bundled track list with in-memory favorites
//! - `DesktopAudioFocus`: grants focus, relays host-reported focus changes
//! - `ChannelRouteMonitor`: relays host-reported output route changes
//!
//! The media backend is always host specific and is not provided here.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ChannelRouteMonitor, DesktopAudioFocus, InMemoryCatalog};
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let routes = ChannelRouteMonitor::new();
//! let config = CoreConfig::builder()
//!     .catalog(Arc::new(InMemoryCatalog::from_json_str(LIBRARY_JSON)?))
//!     .media_backend(Arc::new(MyBackend::new()))
//!     .audio_focus(Arc::new(DesktopAudioFocus::new()))
//!     .route_monitor(Arc::new(routes.clone()))
//!     .build()?;
//! ```

mod catalog;
mod focus;
mod route;

pub use catalog::InMemoryCatalog;
pub use focus::DesktopAudioFocus;
pub use route::ChannelRouteMonitor;
