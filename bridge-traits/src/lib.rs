//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Content
//! - [`CatalogProvider`](catalog::CatalogProvider) - Random track selection and favorites
//!
//! ### Audio
//! - [`MediaBackend`](playback::MediaBackend) - Allocates the decode/output resource
//! - [`MediaPlayer`](playback::MediaPlayer) - Controls one prepared source
//! - [`AudioFocusHost`](audio_session::AudioFocusHost) - Shared output arbitration
//! - [`AudioRouteMonitor`](audio_session::AudioRouteMonitor) - Headset and noisy-output notifications
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is missing:
//!
//! ```ignore
//! use core_runtime::error::Error;
//!
//! let catalog = builder.catalog
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "CatalogProvider".to_string(),
//!         message: "No catalog provider supplied.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert native error codes into it and keep
//! messages actionable.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets so implementations
//! can be shared across the core's async tasks.

pub mod audio_session;
pub mod catalog;
pub mod error;
pub mod platform;
pub mod playback;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio_session::{
    AudioFocusHost, AudioRouteMonitor, FocusChange, FocusChangeStream, FocusRequestResult,
    RouteChange, RouteChangeStream,
};
pub use catalog::{CatalogProvider, Track};
pub use platform::{PlatformSend, PlatformSendSync};
pub use playback::{
    MediaBackend, MediaEvent, MediaEventStream, MediaPlayer, MediaSource, PreparedMedia,
};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
