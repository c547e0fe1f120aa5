//! Audio Focus Implementation

use async_trait::async_trait;
use bridge_traits::{
    audio_session::{AudioFocusHost, FocusChange, FocusChangeStream, FocusRequestResult},
    error::Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

const CHANGE_BUFFER: usize = 16;

/// Desktop audio focus host.
///
/// Desktop platforms have no system-wide focus arbitration, so requests are
/// granted unless the host turned granting off. Focus changes originate in
/// the host application (another player window, a call overlay) and are fed
/// in through [`DesktopAudioFocus::notify`].
#[derive(Clone)]
pub struct DesktopAudioFocus {
    grant: Arc<AtomicBool>,
    held: Arc<AtomicBool>,
    changes: broadcast::Sender<FocusChange>,
}

impl DesktopAudioFocus {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            grant: Arc::new(AtomicBool::new(true)),
            held: Arc::new(AtomicBool::new(false)),
            changes,
        }
    }

    /// Choose whether future requests are granted.
    pub fn set_granting(&self, grant: bool) {
        self.grant.store(grant, Ordering::SeqCst);
    }

    /// Whether a granted request has not been abandoned yet.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Deliver a focus change to every subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn notify(&self, change: FocusChange) -> usize {
        if change.is_loss() {
            self.held.store(false, Ordering::SeqCst);
        } else {
            self.held.store(true, Ordering::SeqCst);
        }
        self.changes.send(change).unwrap_or(0)
    }
}

impl Default for DesktopAudioFocus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioFocusHost for DesktopAudioFocus {
    async fn request_focus(&self) -> Result<FocusRequestResult> {
        if self.grant.load(Ordering::SeqCst) {
            self.held.store(true, Ordering::SeqCst);
            debug!("Audio focus granted");
            Ok(FocusRequestResult::Granted)
        } else {
            debug!("Audio focus denied");
            Ok(FocusRequestResult::Denied)
        }
    }

    async fn abandon_focus(&self) -> Result<()> {
        self.held.store(false, Ordering::SeqCst);
        debug!("Audio focus abandoned");
        Ok(())
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn FocusChangeStream>> {
        Ok(Box::new(DesktopFocusChangeStream {
            rx: self.changes.subscribe(),
        }))
    }
}

struct DesktopFocusChangeStream {
    rx: broadcast::Receiver<FocusChange>,
}

#[async_trait]
impl FocusChangeStream for DesktopFocusChangeStream {
    async fn next(&mut self) -> Option<FocusChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Focus change stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
