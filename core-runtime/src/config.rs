//! # Core Configuration Module
//!
//! Holds the host bridges and runtime settings the playback core is
//! constructed from.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance. It enforces fail-fast validation so a controller is never started
//! with a missing collaborator.
//!
//! ## Required Dependencies
//!
//! - `CatalogProvider` - Random track selection and favorites
//! - `MediaBackend` - Decode/output resource factory
//! - `AudioFocusHost` - Shared output arbitration (desktop default available)
//!
//! ## Optional Dependencies
//!
//! - `AudioRouteMonitor` - Headset and noisy-output notifications
//! - `Clock` - Defaults to [`SystemClock`]
//!
//! When the `desktop-shims` feature is enabled, a desktop `AudioFocusHost`
//! that always grants focus is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .catalog(Arc::new(MyCatalog::new()))
//!     .media_backend(Arc::new(MyBackend::default()))
//!     .event_bus_capacity(256)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    AudioFocusHost, AudioRouteMonitor, CatalogProvider, Clock, MediaBackend, SystemClock,
};
use std::sync::Arc;

/// Upper bound for the event bus buffer.
const MAX_EVENT_BUS_CAPACITY: usize = 10_000;

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Catalog collaborator (required)
    pub catalog: Arc<dyn CatalogProvider>,

    /// Factory for the decode/output resource (required)
    pub media_backend: Arc<dyn MediaBackend>,

    /// Audio focus arbitration (required, desktop default available)
    pub audio_focus: Arc<dyn AudioFocusHost>,

    /// Output route notifications (optional)
    pub route_monitor: Option<Arc<dyn AudioRouteMonitor>>,

    /// Time source for snapshot stamping
    pub clock: Arc<dyn Clock>,

    /// Buffer size of the broadcast event bus
    pub event_bus_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("catalog", &"CatalogProvider { ... }")
            .field("media_backend", &"MediaBackend { ... }")
            .field("audio_focus", &"AudioFocusHost { ... }")
            .field(
                "route_monitor",
                &self.route_monitor.as_ref().map(|_| "AudioRouteMonitor { ... }"),
            )
            .field("event_bus_capacity", &self.event_bus_capacity)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_bus_capacity == 0 {
            return Err(Error::Config(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        if self.event_bus_capacity > MAX_EVENT_BUS_CAPACITY {
            return Err(Error::Config(format!(
                "Event bus capacity exceeds maximum of {}",
                MAX_EVENT_BUS_CAPACITY
            )));
        }

        Ok(())
    }
}

fn catalog_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CatalogProvider".to_string(),
        message: "CatalogProvider implementation is required to build queues. \
                 Desktop: use bridge_desktop::InMemoryCatalog or an HTTP-backed catalog. \
                 Mobile: inject the app's catalog repository."
            .to_string(),
    }
}

fn media_backend_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaBackend".to_string(),
        message: "MediaBackend implementation is required to decode and output audio. \
                 Mobile: wrap the platform media player. \
                 Desktop: inject an adapter around the host's audio engine."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_audio_focus() -> Result<Arc<dyn AudioFocusHost>> {
    use bridge_desktop::DesktopAudioFocus;

    let focus: Arc<dyn AudioFocusHost> = Arc::new(DesktopAudioFocus::new());
    Ok(focus)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_audio_focus() -> Result<Arc<dyn AudioFocusHost>> {
    Err(Error::CapabilityMissing {
        capability: "AudioFocusHost".to_string(),
        message: "AudioFocusHost implementation is required to arbitrate shared output. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use DesktopAudioFocus. \
                 Mobile: inject an adapter around AudioManager/AVAudioSession."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    catalog: Option<Arc<dyn CatalogProvider>>,
    media_backend: Option<Arc<dyn MediaBackend>>,
    audio_focus: Option<Arc<dyn AudioFocusHost>>,
    route_monitor: Option<Arc<dyn AudioRouteMonitor>>,
    clock: Option<Arc<dyn Clock>>,
    event_bus_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the catalog collaborator (required).
    pub fn catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the media backend (required).
    pub fn media_backend(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        self.media_backend = Some(backend);
        self
    }

    /// Sets the audio focus host.
    ///
    /// Required unless the `desktop-shims` feature supplies the default.
    pub fn audio_focus(mut self, focus: Arc<dyn AudioFocusHost>) -> Self {
        self.audio_focus = Some(focus);
        self
    }

    /// Sets the route monitor (optional).
    pub fn route_monitor(mut self, monitor: Arc<dyn AudioRouteMonitor>) -> Self {
        self.route_monitor = Some(monitor);
        self
    }

    /// Overrides the time source (defaults to [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the broadcast buffer size (defaults to [`DEFAULT_EVENT_BUFFER_SIZE`]).
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = Some(capacity);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when a required bridge is absent
    /// and [`Error::Config`] when a setting is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let catalog = self.catalog.ok_or_else(catalog_missing_error)?;
        let media_backend = self.media_backend.ok_or_else(media_backend_missing_error)?;

        let audio_focus = match self.audio_focus {
            Some(focus) => focus,
            None => provide_default_audio_focus()?,
        };

        let config = CoreConfig {
            catalog,
            media_backend,
            audio_focus,
            route_monitor: self.route_monitor,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::new())),
            event_bus_capacity: self
                .event_bus_capacity
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        BridgeError, FocusChangeStream, FocusRequestResult, MediaPlayer, Track,
    };

    struct MockCatalog;

    #[async_trait]
    impl CatalogProvider for MockCatalog {
        async fn fetch_random_tracks(&self) -> BridgeResult<Vec<Track>> {
            Ok(Vec::new())
        }

        async fn is_favorite(&self, _track_id: &str) -> BridgeResult<bool> {
            Ok(false)
        }

        async fn set_favorite(&self, _track_id: &str, _favorite: bool) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct MockBackend;

    #[async_trait]
    impl MediaBackend for MockBackend {
        async fn create_player(&self) -> BridgeResult<Arc<dyn MediaPlayer>> {
            Err(BridgeError::NotAvailable("no audio device".to_string()))
        }
    }

    struct MockFocus;

    #[async_trait]
    impl AudioFocusHost for MockFocus {
        async fn request_focus(&self) -> BridgeResult<FocusRequestResult> {
            Ok(FocusRequestResult::Granted)
        }

        async fn abandon_focus(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn subscribe_changes(&self) -> BridgeResult<Box<dyn FocusChangeStream>> {
            Err(BridgeError::NotAvailable("focus changes".to_string()))
        }
    }

    fn complete_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .catalog(Arc::new(MockCatalog))
            .media_backend(Arc::new(MockBackend))
            .audio_focus(Arc::new(MockFocus))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.event_bus_capacity, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.route_monitor.is_none());
    }

    #[test]
    fn test_builder_requires_catalog() {
        let result = CoreConfig::builder()
            .media_backend(Arc::new(MockBackend))
            .audio_focus(Arc::new(MockFocus))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "CatalogProvider")
            }
            other => panic!("expected missing catalog, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_media_backend() {
        let result = CoreConfig::builder()
            .catalog(Arc::new(MockCatalog))
            .audio_focus(Arc::new(MockFocus))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "MediaBackend"
        ));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_audio_focus_without_shims() {
        let result = CoreConfig::builder()
            .catalog(Arc::new(MockCatalog))
            .media_backend(Arc::new(MockBackend))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "AudioFocusHost"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_focus_default() {
        let config = CoreConfig::builder()
            .catalog(Arc::new(MockCatalog))
            .media_backend(Arc::new(MockBackend))
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let result = complete_builder().event_bus_capacity(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_capacity() {
        let result = complete_builder()
            .event_bus_capacity(MAX_EVENT_BUS_CAPACITY + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = complete_builder().event_bus_capacity(32).build().unwrap();
        let cloned = config.clone();

        assert_eq!(cloned.event_bus_capacity, 32);
        assert!(format!("{:?}", cloned).contains("event_bus_capacity: 32"));
    }
}
