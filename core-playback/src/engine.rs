//! # Playback Engine
//!
//! Wraps the single decode/output resource. Loads complete asynchronously and
//! report back through the controller mailbox, tagged with a generation so
//! the controller can discard callbacks of abandoned loads.
//!
//! Player notifications (completion, runtime errors) describe the source that
//! was last prepared. They are tagged with the generation of that source, so a
//! notification that trails a newer load or a release is stale on arrival.

use crate::error::{PlaybackError, Result};
use crate::message::{ControllerMessage, EngineEvent};
use bridge_traits::{MediaBackend, MediaEvent, MediaPlayer, MediaSource};
use core_runtime::logging::strip_path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct PlaybackEngine {
    backend: Arc<dyn MediaBackend>,
    mailbox: WeakSender<ControllerMessage>,
    player: Option<Arc<dyn MediaPlayer>>,
    generation: Arc<AtomicU64>,
    /// Generation of the source the player last finished preparing.
    prepared_generation: Arc<AtomicU64>,
    prepared: bool,
    load_task: Option<JoinHandle<()>>,
    event_task: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    pub(crate) fn new(
        backend: Arc<dyn MediaBackend>,
        mailbox: WeakSender<ControllerMessage>,
    ) -> Self {
        Self {
            backend,
            mailbox,
            player: None,
            generation: Arc::new(AtomicU64::new(0)),
            prepared_generation: Arc::new(AtomicU64::new(0)),
            prepared: false,
            load_task: None,
            event_task: None,
        }
    }

    /// Generation of the most recent load or release.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `generation` still identifies the live load.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Whether a player resource is allocated.
    pub fn has_resource(&self) -> bool {
        self.player.is_some()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared && self.player.is_some()
    }

    /// Start loading `source`. Returns the generation of this load.
    ///
    /// Exactly one `Prepared` or `Error` event for the returned generation is
    /// posted to the mailbox unless the load is superseded or released first.
    pub async fn load(&mut self, source: MediaSource) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if self.is_prepared() {
            if let Err(err) = self.stop().await {
                warn!(error = %err, "Media player stop failed");
            }
        }
        self.prepared = false;
        if let Some(task) = self.load_task.take() {
            task.abort();
        }

        let player = match self.ensure_player().await {
            Ok(player) => player,
            Err(err) => {
                warn!(generation, error = %err, "Could not allocate media player");
                self.post(EngineEvent::Error {
                    generation,
                    message: err.to_string(),
                });
                return generation;
            }
        };

        debug!(generation, uri = %strip_path(&source.uri), "Loading source");

        let mailbox = self.mailbox.clone();
        self.load_task = Some(tokio::spawn(async move {
            let event = match player.prepare(&source).await {
                Ok(prepared) => EngineEvent::Prepared {
                    generation,
                    duration: prepared.duration,
                },
                Err(err) => EngineEvent::Error {
                    generation,
                    message: err.to_string(),
                },
            };
            deliver(&mailbox, event).await;
        }));

        generation
    }

    /// Mark the load of `generation` as prepared. Returns `false` for stale loads.
    pub fn mark_prepared(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.player.is_none() {
            return false;
        }
        self.prepared = true;
        self.prepared_generation.store(generation, Ordering::SeqCst);
        self.load_task = None;
        true
    }

    pub async fn start(&self) -> Result<()> {
        let player = self.prepared_player()?;
        player
            .start()
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))
    }

    pub async fn pause(&self) -> Result<()> {
        let player = self.prepared_player()?;
        player
            .pause()
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))
    }

    pub async fn stop(&self) -> Result<()> {
        let player = self.prepared_player()?;
        player
            .stop()
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        let player = self.player.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;
        player
            .set_volume(volume)
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))
    }

    pub async fn position(&self) -> Result<Duration> {
        let player = self.prepared_player()?;
        player
            .position()
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))
    }

    pub async fn is_playing(&self) -> bool {
        match self.prepared_player() {
            Ok(player) => player.is_playing().await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Free the resource and invalidate any pending load. Safe in any state.
    pub async fn release(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.prepared = false;

        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }

        if let Some(player) = self.player.take() {
            if let Err(err) = player.release().await {
                warn!(error = %err, "Media player release failed");
            }
            debug!("Media player released");
        }
    }

    fn prepared_player(&self) -> Result<&Arc<dyn MediaPlayer>> {
        match &self.player {
            Some(player) if self.prepared => Ok(player),
            _ => Err(PlaybackError::NoTrackLoaded),
        }
    }

    async fn ensure_player(&mut self) -> Result<Arc<dyn MediaPlayer>> {
        if let Some(player) = &self.player {
            if let Err(err) = player.reset().await {
                warn!(error = %err, "Media player reset failed");
            }
            return Ok(Arc::clone(player));
        }

        let player = self
            .backend
            .create_player()
            .await
            .map_err(|e| PlaybackError::AudioDeviceUnavailable(e.to_string()))?;

        match player.subscribe_events().await {
            Ok(mut events) => {
                let mailbox = self.mailbox.clone();
                let prepared_generation = Arc::clone(&self.prepared_generation);
                self.event_task = Some(tokio::spawn(async move {
                    while let Some(event) = events.next().await {
                        let generation = prepared_generation.load(Ordering::SeqCst);
                        let event = match event {
                            MediaEvent::Completed => EngineEvent::Completed { generation },
                            MediaEvent::Error { what, extra } => EngineEvent::Error {
                                generation,
                                message: format!("Media error {} ({})", what, extra),
                            },
                        };
                        if !deliver(&mailbox, event).await {
                            break;
                        }
                    }
                }));
            }
            Err(err) => warn!(error = %err, "Media events unavailable"),
        }

        self.player = Some(Arc::clone(&player));
        Ok(player)
    }

    fn post(&self, event: EngineEvent) {
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            deliver(&mailbox, event).await;
        });
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
    }
}

async fn deliver(mailbox: &WeakSender<ControllerMessage>, event: EngineEvent) -> bool {
    match mailbox.upgrade() {
        Some(sender) => sender.send(ControllerMessage::Engine(event)).await.is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, MediaEventStream, PreparedMedia};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct CountingPlayer {
        fail_prepare: bool,
        releases: AtomicUsize,
        starts: AtomicUsize,
        stops: AtomicUsize,
        events: parking_lot::Mutex<Option<mpsc::UnboundedSender<MediaEvent>>>,
    }

    impl CountingPlayer {
        fn emit(&self, event: MediaEvent) {
            if let Some(tx) = &*self.events.lock() {
                let _ = tx.send(event);
            }
        }
    }

    struct ChannelEvents(mpsc::UnboundedReceiver<MediaEvent>);

    #[async_trait]
    impl MediaEventStream for ChannelEvents {
        async fn next(&mut self) -> Option<MediaEvent> {
            self.0.recv().await
        }
    }

    #[async_trait]
    impl MediaPlayer for CountingPlayer {
        async fn prepare(&self, source: &MediaSource) -> BridgeResult<PreparedMedia> {
            if self.fail_prepare {
                return Err(BridgeError::Media { what: 1, extra: -1004 });
            }
            assert!(!source.uri.is_empty());
            Ok(PreparedMedia {
                duration: Some(Duration::from_secs(3)),
            })
        }
        async fn start(&self) -> BridgeResult<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn stop(&self) -> BridgeResult<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
            Ok(())
        }
        async fn position(&self) -> BridgeResult<Duration> {
            Ok(Duration::from_millis(250))
        }
        async fn is_playing(&self) -> BridgeResult<bool> {
            Ok(self.starts.load(Ordering::SeqCst) > 0)
        }
        async fn reset(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn release(&self) -> BridgeResult<()> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn subscribe_events(&self) -> BridgeResult<Box<dyn MediaEventStream>> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.events.lock() = Some(tx);
            Ok(Box::new(ChannelEvents(rx)))
        }
    }

    struct SingleBackend {
        player: Option<Arc<CountingPlayer>>,
    }

    #[async_trait]
    impl MediaBackend for SingleBackend {
        async fn create_player(&self) -> BridgeResult<Arc<dyn MediaPlayer>> {
            match &self.player {
                Some(player) => Ok(player.clone() as Arc<dyn MediaPlayer>),
                None => Err(BridgeError::NotAvailable("no output device".into())),
            }
        }
    }

    async fn next_engine_event(rx: &mut mpsc::Receiver<ControllerMessage>) -> EngineEvent {
        match rx.recv().await {
            Some(ControllerMessage::Engine(event)) => event,
            _ => panic!("expected an engine event"),
        }
    }

    #[tokio::test]
    async fn load_posts_prepared_for_its_generation() {
        let player = Arc::new(CountingPlayer::default());
        let (tx, mut rx) = mpsc::channel(8);
        let mut engine = PlaybackEngine::new(
            Arc::new(SingleBackend {
                player: Some(player.clone()),
            }),
            tx.downgrade(),
        );

        let generation = engine.load(MediaSource::new("/music/a.mp3")).await;
        let event = next_engine_event(&mut rx).await;

        assert_eq!(
            event,
            EngineEvent::Prepared {
                generation,
                duration: Some(Duration::from_secs(3)),
            }
        );
        assert!(engine.start().await.is_err());
        assert!(engine.mark_prepared(generation));
        engine.start().await.unwrap();
        assert!(engine.is_playing().await);
        assert_eq!(engine.position().await.unwrap(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn release_invalidates_pending_generation_and_is_idempotent() {
        let player = Arc::new(CountingPlayer::default());
        let (tx, _rx) = mpsc::channel(8);
        let mut engine = PlaybackEngine::new(
            Arc::new(SingleBackend {
                player: Some(player.clone()),
            }),
            tx.downgrade(),
        );

        let generation = engine.load(MediaSource::new("/music/a.mp3")).await;
        engine.release().await;
        engine.release().await;

        assert!(!engine.mark_prepared(generation));
        assert!(!engine.has_resource());
        assert_eq!(player.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_surface_as_error_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut engine =
            PlaybackEngine::new(Arc::new(SingleBackend { player: None }), tx.downgrade());

        let generation = engine.load(MediaSource::new("/music/a.mp3")).await;
        match next_engine_event(&mut rx).await {
            EngineEvent::Error {
                generation: g,
                message,
            } => {
                assert_eq!(g, generation);
                assert!(message.contains("no output device"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let player = Arc::new(CountingPlayer {
            fail_prepare: true,
            ..Default::default()
        });
        let mut engine = PlaybackEngine::new(
            Arc::new(SingleBackend {
                player: Some(player),
            }),
            tx.downgrade(),
        );
        let generation = engine.load(MediaSource::new("/music/b.mp3")).await;
        assert!(matches!(
            next_engine_event(&mut rx).await,
            EngineEvent::Error { generation: g, .. } if g == generation
        ));
    }

    #[tokio::test]
    async fn player_events_carry_the_prepared_generation() {
        let player = Arc::new(CountingPlayer::default());
        let (tx, mut rx) = mpsc::channel(8);
        let mut engine = PlaybackEngine::new(
            Arc::new(SingleBackend {
                player: Some(player.clone()),
            }),
            tx.downgrade(),
        );

        let first = engine.load(MediaSource::new("/music/a.mp3")).await;
        next_engine_event(&mut rx).await;
        assert!(engine.mark_prepared(first));

        player.emit(MediaEvent::Completed);
        assert_eq!(
            next_engine_event(&mut rx).await,
            EngineEvent::Completed { generation: first }
        );

        // Reloading stops the prepared source; a trailing error from it stays stale.
        let second = engine.load(MediaSource::new("/music/b.mp3")).await;
        assert_eq!(player.stops.load(Ordering::SeqCst), 1);
        player.emit(MediaEvent::Error { what: 1, extra: -38 });

        let mut stale = None;
        for _ in 0..2 {
            match next_engine_event(&mut rx).await {
                EngineEvent::Error { generation, .. } => stale = Some(generation),
                EngineEvent::Prepared { generation, .. } => assert_eq!(generation, second),
                other => panic!("unexpected {:?}", other),
            }
        }
        let stale = stale.unwrap();
        assert_eq!(stale, first);
        assert!(!engine.is_current(stale));
    }

    #[tokio::test]
    async fn volume_is_range_checked() {
        let (tx, _rx) = mpsc::channel(8);
        let engine =
            PlaybackEngine::new(Arc::new(SingleBackend { player: None }), tx.downgrade());

        assert!(matches!(
            engine.set_volume(1.5).await,
            Err(PlaybackError::InvalidVolume(_))
        ));
        assert!(matches!(
            engine.set_volume(0.5).await,
            Err(PlaybackError::NoTrackLoaded)
        ));
    }
}
