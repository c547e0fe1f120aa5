//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (catalog, media
//! backend, audio focus, route monitor) into one playback controller and a
//! broadcast event bus. Desktop apps typically enable the `desktop-shims`
//! feature (which depends on `bridge-desktop`) and call [`bootstrap_desktop`];
//! mobile hosts build a [`CoreConfig`] from their own bridges and call
//! [`PlayerService::bootstrap`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_playback::{
    ControllerHandle, PlaybackConfig, PlaybackSnapshot, PlaybackStatus, ResumePolicy,
};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::events::{CoreEvent, EventStream};

use core_playback::{EventBusObserver, ObserverId, PlaybackController};
use core_runtime::events::EventBus;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "desktop-shims")]
use bridge_desktop::{ChannelRouteMonitor, DesktopAudioFocus};
#[cfg(feature = "desktop-shims")]
use bridge_traits::{CatalogProvider, MediaBackend};

/// Primary façade exposed to host applications.
///
/// Owns the single playback controller of a process boundary and the event
/// bus its observer publishes on.
pub struct PlayerService {
    handle: ControllerHandle,
    events: EventBus,
    observer: ObserverId,
}

impl PlayerService {
    /// Validate `config`, spawn the controller and attach the event bus.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn bootstrap(config: CoreConfig, playback: PlaybackConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_bus_capacity);
        let handle = PlaybackController::spawn(&config, playback)?;
        let observer = handle
            .subscribe(Arc::new(EventBusObserver::new(events.clone())))
            .await?;

        info!(
            event_bus_capacity = config.event_bus_capacity,
            "Player service started"
        );
        Ok(Self {
            handle,
            events,
            observer,
        })
    }

    /// Handle for issuing transport commands.
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Subscribe to playback and queue events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// The bus events are published on.
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Id of the event bus observer registered with the controller.
    pub fn observer_id(&self) -> ObserverId {
        self.observer
    }

    /// Stop playback, release every host resource and end the controller.
    ///
    /// Outstanding handles fail with `ControllerClosed` afterwards.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        info!("Player service stopped");
        Ok(())
    }
}

/// A service running on the desktop bridges, with the host-side ends of the
/// focus and route channels.
#[cfg(feature = "desktop-shims")]
pub struct DesktopSession {
    pub service: PlayerService,
    /// Report focus changes from the host's audio toolkit here.
    pub focus: DesktopAudioFocus,
    /// Report headset and output route changes here.
    pub routes: ChannelRouteMonitor,
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```ignore
/// use bridge_desktop::InMemoryCatalog;
/// use core_service::{bootstrap_desktop, PlaybackConfig};
/// use std::sync::Arc;
///
/// let session = bootstrap_desktop(
///     Arc::new(InMemoryCatalog::from_json_str(LIBRARY_JSON)?),
///     Arc::new(MyBackend::new()),
///     PlaybackConfig::default(),
/// )
/// .await?;
/// session.service.handle().play().await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(
    catalog: Arc<dyn CatalogProvider>,
    media_backend: Arc<dyn MediaBackend>,
    playback: PlaybackConfig,
) -> Result<DesktopSession> {
    let focus = DesktopAudioFocus::new();
    let routes = ChannelRouteMonitor::new();

    let config = CoreConfig::builder()
        .catalog(catalog)
        .media_backend(media_backend)
        .audio_focus(Arc::new(focus.clone()))
        .route_monitor(Arc::new(routes.clone()))
        .build()?;

    let service = PlayerService::bootstrap(config, playback).await?;
    Ok(DesktopSession {
        service,
        focus,
        routes,
    })
}
