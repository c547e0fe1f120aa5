//! # Playback Controller
//!
//! The playback state machine, run as a single actor task.
//!
//! Every input (session commands, engine callbacks, focus and route
//! notifications, position ticks, catalog results and queries) is a
//! [`ControllerMessage`] on one mailbox. The actor handles one message fully
//! before taking the next, so queue, state and focus level are only ever
//! mutated from that task. Producers never touch controller state.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackController};
//!
//! let handle = PlaybackController::spawn(&core_config, PlaybackConfig::default())?;
//! handle.play().await?;
//! let snapshot = handle.snapshot().await?;
//! println!("{}", snapshot.status);
//! handle.shutdown().await?;
//! ```

use crate::config::{PlaybackConfig, ResumePolicy};
use crate::engine::PlaybackEngine;
use crate::error::{PlaybackError, Result};
use crate::focus::{AudioFocusCoordinator, FocusLevel};
use crate::message::{Command, CommandOrigin, ControllerMessage, EngineEvent};
use crate::observer::{ObserverId, ObserverRegistry, PlaybackObserver};
use crate::queue::{QueueId, QueueManager, QueueSnapshot};
use crate::reporter::PositionReporter;
use crate::state::{PlaybackActions, PlaybackSnapshot, PlaybackStatus};
use bridge_traits::{
    AudioRouteMonitor, BridgeError, CatalogProvider, Clock, FocusChange, MediaSource, RouteChange,
    Track,
};
use core_runtime::config::CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, WeakSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Entry point for starting a controller.
pub struct PlaybackController;

impl PlaybackController {
    /// Spawn the controller actor on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::InvalidConfig`] when `config` does not validate
    /// - [`PlaybackError::RuntimeUnavailable`] outside a Tokio runtime
    pub fn spawn(core: &CoreConfig, config: PlaybackConfig) -> Result<ControllerHandle> {
        config.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| PlaybackError::RuntimeUnavailable)?;

        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        let actor = ControllerActor::new(core, config, tx.downgrade());
        runtime.spawn(actor.run(rx));

        info!("Playback controller started");
        Ok(ControllerHandle { tx })
    }
}

/// Cloneable handle used by the session owner.
///
/// Command methods resolve once the controller has fully handled the
/// command. Asynchronous follow-ups (a load finishing, a queue arriving from
/// the catalog) are reported to observers later.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<ControllerMessage>,
}

impl ControllerHandle {
    pub async fn play(&self) -> Result<()> {
        self.command(Command::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.command(Command::Pause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.command(Command::Stop).await
    }

    pub async fn skip_to_next(&self) -> Result<()> {
        self.command(Command::SkipToNext).await
    }

    pub async fn skip_to_previous(&self) -> Result<()> {
        self.command(Command::SkipToPrevious).await
    }

    /// Jump to the item with the given stable id. Unknown ids are ignored.
    pub async fn skip_to_queue_item(&self, queue_id: QueueId) -> Result<()> {
        self.command(Command::SkipToQueueItem(queue_id)).await
    }

    /// Record a requested position. Informational only.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        self.command(Command::SeekTo(position)).await
    }

    pub async fn toggle_favorite(&self) -> Result<()> {
        self.command(Command::ToggleFavorite).await
    }

    /// Current playback snapshot.
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        self.request(ControllerMessage::Snapshot).await
    }

    /// Current queue.
    pub async fn queue(&self) -> Result<QueueSnapshot> {
        self.request(ControllerMessage::Queue).await
    }

    /// Register an observer. It immediately receives the current snapshot.
    pub async fn subscribe(&self, observer: Arc<dyn PlaybackObserver>) -> Result<ObserverId> {
        self.request(|reply| ControllerMessage::Subscribe { observer, reply })
            .await
    }

    pub async fn unsubscribe(&self, id: ObserverId) -> Result<()> {
        self.tx
            .send(ControllerMessage::Unsubscribe(id))
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Release the engine, abandon focus and stop the actor.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(ControllerMessage::Shutdown).await
    }

    /// Whether the actor has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn command(&self, command: Command) -> Result<()> {
        self.request(|done| ControllerMessage::Command {
            command,
            origin: CommandOrigin::User,
            done: Some(done),
        })
        .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ControllerMessage,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| PlaybackError::ControllerClosed)?;
        response.await.map_err(|_| PlaybackError::ControllerClosed)
    }
}

struct ControllerActor {
    config: PlaybackConfig,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn Clock>,
    route_monitor: Option<Arc<dyn AudioRouteMonitor>>,
    mailbox: WeakSender<ControllerMessage>,

    queue: QueueManager,
    status: PlaybackStatus,
    position: Duration,
    duration: Duration,

    focus: AudioFocusCoordinator,
    engine: PlaybackEngine,
    reporter: PositionReporter,
    observers: ObserverRegistry,

    /// Restart output when focus returns.
    deferred_resume: bool,
    /// Origin of the command that started the current playback.
    last_origin: CommandOrigin,
    fetch_generation: u64,
    pending_fetch: Option<(u64, CommandOrigin)>,
    forwarders: Vec<JoinHandle<()>>,
}

impl ControllerActor {
    fn new(
        core: &CoreConfig,
        config: PlaybackConfig,
        mailbox: WeakSender<ControllerMessage>,
    ) -> Self {
        Self {
            reporter: PositionReporter::new(config.position_interval),
            engine: PlaybackEngine::new(Arc::clone(&core.media_backend), mailbox.clone()),
            focus: AudioFocusCoordinator::new(Arc::clone(&core.audio_focus)),
            catalog: Arc::clone(&core.catalog),
            clock: Arc::clone(&core.clock),
            route_monitor: core.route_monitor.clone(),
            config,
            mailbox,
            queue: QueueManager::new(),
            status: PlaybackStatus::None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            observers: ObserverRegistry::default(),
            deferred_resume: false,
            last_origin: CommandOrigin::User,
            fetch_generation: 0,
            pending_fetch: None,
            forwarders: Vec::new(),
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ControllerMessage>) {
        self.attach_host_streams().await;

        while let Some(message) = rx.recv().await {
            if let ControllerMessage::Shutdown(reply) = message {
                self.teardown().await;
                let _ = reply.send(());
                return;
            }
            self.handle(message).await;
        }

        // Every handle was dropped.
        self.teardown().await;
    }

    async fn handle(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Command {
                command,
                origin,
                done,
            } => {
                self.handle_command(command, origin).await;
                if let Some(done) = done {
                    let _ = done.send(());
                }
            }
            ControllerMessage::Engine(event) => self.on_engine_event(event).await,
            ControllerMessage::Focus(change) => self.on_focus_change(change).await,
            ControllerMessage::Route(change) => self.on_route_change(change).await,
            ControllerMessage::PositionTick => self.on_position_tick().await,
            ControllerMessage::QueueLoaded { generation, result } => {
                self.on_queue_loaded(generation, result).await
            }
            ControllerMessage::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            ControllerMessage::Queue(reply) => {
                let _ = reply.send(self.queue.snapshot());
            }
            ControllerMessage::Subscribe { observer, reply } => {
                observer.on_state_changed(&self.snapshot(), self.queue.current_track().as_ref());
                let _ = reply.send(self.observers.add(observer));
            }
            ControllerMessage::Unsubscribe(id) => {
                self.observers.remove(id);
            }
            ControllerMessage::Shutdown(reply) => {
                // Intercepted by `run`.
                let _ = reply.send(());
            }
        }
    }

    async fn handle_command(&mut self, command: Command, origin: CommandOrigin) {
        debug!(?command, ?origin, state = %self.status, "Handling command");
        match command {
            Command::Play => self.play(origin).await,
            Command::Pause => self.pause().await,
            Command::Stop => self.stop().await,
            Command::SkipToNext => {
                if self.queue.advance().is_some() {
                    self.load_current(CommandOrigin::User).await;
                } else {
                    self.fail(PlaybackError::SkipOutOfBounds.to_string()).await;
                }
            }
            Command::SkipToPrevious => {
                if self.queue.retreat().is_some() {
                    self.load_current(CommandOrigin::User).await;
                } else {
                    self.fail(PlaybackError::SkipOutOfBounds.to_string()).await;
                }
            }
            Command::SkipToQueueItem(queue_id) => match self.queue.index_of_queue_id(queue_id) {
                Some(index) => {
                    self.queue.set_current_index(index);
                    self.load_current(CommandOrigin::User).await;
                }
                None => debug!(queue_id, "Unknown queue item, ignoring"),
            },
            Command::SeekTo(position) => {
                self.position = position;
                self.publish();
            }
            Command::ToggleFavorite => self.toggle_favorite().await,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    async fn play(&mut self, origin: CommandOrigin) {
        if self.queue.is_empty() {
            self.request_queue(origin);
            return;
        }

        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Buffering => {}
            PlaybackStatus::Paused if self.engine.is_prepared() => {
                self.last_origin = origin;
                let level = self.focus.request_focus().await;
                if !level.allows_output() {
                    debug!(focus = %level, "Focus unavailable, staying paused");
                    self.deferred_resume = self.resume_allowed();
                    return;
                }
                self.start_output().await;
            }
            _ => self.load_current(origin).await,
        }
    }

    async fn pause(&mut self) {
        self.deferred_resume = false;
        if !self.status.is_playing() {
            if self.status == PlaybackStatus::Paused {
                self.focus.abandon_focus().await;
            }
            return;
        }

        if let Err(err) = self.engine.pause().await {
            warn!(error = %err, "Engine pause failed");
        }
        self.reporter.stop();
        self.focus.abandon_focus().await;
        self.status = PlaybackStatus::Paused;
        self.publish();
    }

    async fn stop(&mut self) {
        self.stop_effects().await;
        self.status = PlaybackStatus::Stopped;
        self.publish();
    }

    async fn toggle_favorite(&mut self) {
        let Some(track) = self.queue.current_track() else {
            debug!("No current track to favorite");
            return;
        };

        let current = match self.catalog.is_favorite(&track.id).await {
            Ok(favorite) => favorite,
            Err(err) => {
                warn!(track_id = %track.id, error = %err, "Favorite lookup failed");
                track.is_favorite()
            }
        };

        if let Err(err) = self.catalog.set_favorite(&track.id, !current).await {
            warn!(track_id = %track.id, error = %err, "Favorite update failed");
            return;
        }
        track.set_favorite(!current);
        info!(track_id = %track.id, favorite = !current, "Favorite toggled");
        self.publish();
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn request_queue(&mut self, origin: CommandOrigin) {
        if self.pending_fetch.is_some() {
            debug!("Queue fetch already in flight");
            return;
        }

        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        self.pending_fetch = Some((generation, origin));

        let catalog = Arc::clone(&self.catalog);
        let mailbox = self.mailbox.clone();
        debug!(generation, "Requesting random tracks from catalog");
        tokio::spawn(async move {
            let result = catalog.fetch_random_tracks().await;
            if let Some(sender) = mailbox.upgrade() {
                let _ = sender
                    .send(ControllerMessage::QueueLoaded { generation, result })
                    .await;
            }
        });
    }

    async fn on_queue_loaded(
        &mut self,
        generation: u64,
        result: std::result::Result<Vec<Track>, BridgeError>,
    ) {
        let origin = match self.pending_fetch {
            Some((pending, origin)) if pending == generation => origin,
            _ => {
                debug!(generation, "Discarding superseded catalog result");
                return;
            }
        };
        self.pending_fetch = None;

        let tracks = match result {
            Ok(tracks) if tracks.is_empty() => {
                warn!("Catalog returned no tracks");
                return;
            }
            Ok(tracks) => tracks,
            Err(err) => {
                warn!(error = %err, "Catalog fetch failed");
                return;
            }
        };

        self.queue.rebuild(self.config.queue_title.clone(), tracks);
        info!(tracks = self.queue.len(), "Queue built");
        self.observers.queue_changed(&self.queue.snapshot());
        self.load_current(origin).await;
    }

    /// Load the item under the cursor; the state becomes `Buffering`.
    async fn load_current(&mut self, origin: CommandOrigin) {
        let Some(track) = self.queue.current_track() else {
            self.fail(PlaybackError::SkipOutOfBounds.to_string()).await;
            return;
        };

        self.reporter.stop();
        self.deferred_resume = false;
        self.last_origin = origin;
        self.focus.request_focus().await;

        match self.catalog.is_favorite(&track.id).await {
            Ok(favorite) => track.set_favorite(favorite),
            Err(err) => warn!(track_id = %track.id, error = %err, "Favorite lookup failed"),
        }

        self.status = PlaybackStatus::Buffering;
        self.position = Duration::ZERO;
        self.duration = Duration::from_millis(track.duration_ms);
        self.observers.metadata_changed(Some(&track));

        let generation = self
            .engine
            .load(MediaSource::new(track.source_uri.clone()))
            .await;
        info!(
            track_id = %track.id,
            index = ?self.queue.current_index(),
            generation,
            "Loading track"
        );
        self.publish();
    }

    /// Start the prepared engine at the volume the focus level allows.
    async fn start_output(&mut self) {
        self.apply_volume().await;
        if let Err(err) = self.engine.start().await {
            self.fail(err.to_string()).await;
            return;
        }
        self.status = PlaybackStatus::Playing;
        self.deferred_resume = false;
        self.reporter.start(self.mailbox.clone());
        self.publish();
    }

    /// Pause because focus was lost; keep the focus registration.
    async fn pause_for_focus_loss(&mut self) {
        if let Err(err) = self.engine.pause().await {
            warn!(error = %err, "Engine pause failed");
        }
        self.reporter.stop();
        self.deferred_resume = self.resume_allowed();
        self.status = PlaybackStatus::Paused;
        self.publish();
    }

    /// Enter `Error(message)` with the resource and focus already released.
    async fn fail(&mut self, message: String) {
        warn!(error = %message, "Playback failed");
        self.stop_effects().await;
        self.status = PlaybackStatus::Error(message);
        self.publish();
    }

    async fn stop_effects(&mut self) {
        self.reporter.stop();
        self.engine.release().await;
        self.focus.abandon_focus().await;
        self.deferred_resume = false;
        self.pending_fetch = None;
        self.position = Duration::ZERO;
        self.observers.metadata_changed(None);
    }

    async fn teardown(&mut self) {
        self.reporter.stop();
        self.engine.release().await;
        self.focus.abandon_focus().await;
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }
        info!("Playback controller stopped");
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    async fn on_engine_event(&mut self, event: EngineEvent) {
        let generation = event.generation();
        if !self.engine.is_current(generation) {
            debug!(generation, "Discarding stale engine event");
            return;
        }

        match event {
            EngineEvent::Prepared { duration, .. } => {
                let buffering = self.status == PlaybackStatus::Buffering;
                if !buffering || !self.engine.mark_prepared(generation) {
                    debug!(generation, state = %self.status, "Ignoring unexpected prepared");
                    return;
                }
                if let Some(duration) = duration {
                    self.duration = duration;
                }

                if self.focus.level().allows_output() {
                    self.start_output().await;
                } else {
                    debug!("Prepared without focus, pausing");
                    self.status = PlaybackStatus::Paused;
                    self.deferred_resume = self.resume_allowed();
                    self.publish();
                }
            }
            EngineEvent::Completed { .. } => {
                if !self.status.is_playing() {
                    return;
                }
                if self.queue.advance().is_some() {
                    self.load_current(self.last_origin).await;
                } else {
                    self.stop().await;
                }
            }
            EngineEvent::Error { message, .. } => self.fail(message).await,
        }
    }

    async fn on_focus_change(&mut self, change: FocusChange) {
        let level = self.focus.apply_change(change);

        match level {
            FocusLevel::Focused => {
                if self.status.is_playing() {
                    self.apply_volume().await;
                } else if self.deferred_resume
                    && self.status == PlaybackStatus::Paused
                    && self.engine.is_prepared()
                {
                    info!("Focus regained, resuming");
                    self.start_output().await;
                }
            }
            FocusLevel::NoFocusCanDuck => {
                if self.status.is_playing() {
                    self.apply_volume().await;
                }
            }
            FocusLevel::NoFocusNoDuck => {
                if self.status.is_playing() {
                    info!("Focus lost, pausing");
                    self.pause_for_focus_loss().await;
                }
            }
        }
    }

    async fn on_route_change(&mut self, change: RouteChange) {
        debug!(?change, "Audio route changed");
        match change {
            RouteChange::BecomingNoisy | RouteChange::HeadsetUnplugged => {
                if self.config.pause_on_becoming_noisy {
                    self.pause().await;
                }
            }
            RouteChange::HeadsetPlugged => {
                if self.config.play_on_headset_plug {
                    self.play(CommandOrigin::Route).await;
                }
            }
        }
    }

    async fn on_position_tick(&mut self) {
        self.reporter.tick_consumed();
        if !self.status.is_playing() || !self.engine.is_prepared() {
            return;
        }

        match self.engine.position().await {
            Ok(position) => {
                self.position = position;
                self.observers.position_tick(position, self.duration);
            }
            Err(err) => debug!(error = %err, "Position sample failed"),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn resume_allowed(&self) -> bool {
        match self.config.resume_policy {
            ResumePolicy::Always => true,
            ResumePolicy::ExplicitPlayOnly => self.last_origin == CommandOrigin::User,
        }
    }

    async fn apply_volume(&self) {
        let volume = match self.focus.level() {
            FocusLevel::Focused => self.config.normal_volume,
            FocusLevel::NoFocusCanDuck => self.config.duck_volume,
            FocusLevel::NoFocusNoDuck => return,
        };
        if let Err(err) = self.engine.set_volume(volume).await {
            warn!(volume, error = %err, "Failed to set volume");
        }
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        let current = self.queue.current_item();
        PlaybackSnapshot {
            status: self.status.clone(),
            position: self.position,
            updated_at: self.clock.elapsed_realtime(),
            actions: PlaybackActions::for_state(
                &self.status,
                self.queue.len(),
                self.queue.current_index(),
            ),
            favorite: current.map(|item| item.track.is_favorite()),
            current_index: self.queue.current_index(),
            active_queue_id: current.map(|item| item.queue_id),
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        debug!(
            state = %snapshot.status,
            index = ?snapshot.current_index,
            focus = %self.focus.level(),
            "Publishing state"
        );
        self.observers
            .state_changed(&snapshot, self.queue.current_track().as_ref());
    }

    async fn attach_host_streams(&mut self) {
        match self.focus.subscribe_changes().await {
            Ok(mut changes) => {
                let mailbox = self.mailbox.clone();
                self.forwarders.push(tokio::spawn(async move {
                    while let Some(change) = changes.next().await {
                        let Some(sender) = mailbox.upgrade() else {
                            break;
                        };
                        if sender.send(ControllerMessage::Focus(change)).await.is_err() {
                            break;
                        }
                    }
                }));
            }
            Err(err) => debug!(error = %err, "Focus changes unavailable"),
        }

        let Some(monitor) = self.route_monitor.clone() else {
            return;
        };
        match monitor.subscribe_changes().await {
            Ok(mut changes) => {
                let mailbox = self.mailbox.clone();
                self.forwarders.push(tokio::spawn(async move {
                    while let Some(change) = changes.next().await {
                        let Some(sender) = mailbox.upgrade() else {
                            break;
                        };
                        if sender.send(ControllerMessage::Route(change)).await.is_err() {
                            break;
                        }
                    }
                }));
            }
            Err(err) => warn!(error = %err, "Route changes unavailable"),
        }
    }
}
