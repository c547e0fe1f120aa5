//! Audio Route Monitoring Implementation

use async_trait::async_trait;
use bridge_traits::{
    audio_session::{AudioRouteMonitor, RouteChange, RouteChangeStream},
    error::Result,
};
use tokio::sync::broadcast;
use tracing::debug;

const CHANGE_BUFFER: usize = 16;

/// Route monitor fed by the host application.
///
/// Desktop hosts learn about device changes from their audio toolkit and
/// forward them here with [`ChannelRouteMonitor::notify`].
#[derive(Clone)]
pub struct ChannelRouteMonitor {
    changes: broadcast::Sender<RouteChange>,
}

impl ChannelRouteMonitor {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self { changes }
    }

    /// Deliver a route change to every subscriber.
    pub fn notify(&self, change: RouteChange) -> usize {
        debug!(?change, "Route change");
        self.changes.send(change).unwrap_or(0)
    }
}

impl Default for ChannelRouteMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioRouteMonitor for ChannelRouteMonitor {
    async fn subscribe_changes(&self) -> Result<Box<dyn RouteChangeStream>> {
        Ok(Box::new(ChannelRouteChangeStream {
            rx: self.changes.subscribe(),
        }))
    }
}

struct ChannelRouteChangeStream {
    rx: broadcast::Receiver<RouteChange>,
}

#[async_trait]
impl RouteChangeStream for ChannelRouteChangeStream {
    async fn next(&mut self) -> Option<RouteChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
