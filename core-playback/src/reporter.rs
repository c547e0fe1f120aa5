//! # Position Reporter
//!
//! Interval task that asks the controller to sample the engine position.
//!
//! The reporter never touches the engine itself. It posts a tick into the
//! controller mailbox, and the handler samples only if it is still playing.
//! At most one tick is in flight: while one is pending, further ticks are
//! dropped instead of queued.

use crate::message::ControllerMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct PositionReporter {
    interval: Duration,
    pending: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl PositionReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Begin ticking. No-op while already running.
    pub(crate) fn start(&mut self, mailbox: WeakSender<ControllerMessage>) {
        if self.task.is_some() {
            return;
        }

        let pending = Arc::clone(&self.pending);
        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if pending.swap(true, Ordering::AcqRel) {
                    continue;
                }
                let Some(sender) = mailbox.upgrade() else {
                    break;
                };
                match sender.try_send(ControllerMessage::PositionTick) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => pending.store(false, Ordering::Release),
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }));
    }

    /// Stop ticking immediately. A tick already in the mailbox is discarded by
    /// the handler because playback is no longer running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.pending.store(false, Ordering::Release);
    }

    /// Called by the handler when it dequeues a tick.
    pub fn tick_consumed(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Drop for PositionReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
