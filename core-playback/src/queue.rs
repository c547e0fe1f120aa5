//! # Queue Management
//!
//! Ordered playback queue with a current-position cursor.
//!
//! A queue is built once from an unordered track collection: the tracks are
//! shuffled and each item then receives a stable `queue_id` equal to its
//! position at construction. Ids never change afterwards, so "skip to item"
//! requests stay addressable while the cursor moves.

use bridge_traits::Track;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Stable identity of an item within a built queue.
pub type QueueId = u64;

/// One entry of the queue. Tracks are shared, never copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Stable per-item identity.
    pub queue_id: QueueId,
    /// Shared track record.
    pub track: Arc<Track>,
}

/// Point-in-time copy of the queue handed to observers and callers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    /// Queue title.
    pub title: String,
    /// Items in play order.
    pub items: Vec<QueueItem>,
    /// Current cursor, `None` when nothing is selected.
    pub current_index: Option<usize>,
}

impl QueueSnapshot {
    /// Item under the cursor.
    pub fn current_item(&self) -> Option<&QueueItem> {
        self.current_index.and_then(|index| self.items.get(index))
    }
}

/// Owns the queue and its cursor.
#[derive(Debug, Default)]
pub struct QueueManager {
    title: String,
    items: Vec<QueueItem>,
    current_index: Option<usize>,
}

impl QueueManager {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a shuffled copy of `tracks`.
    ///
    /// The cursor moves to the first item, or to `None` if `tracks` is empty.
    pub fn rebuild(&mut self, title: impl Into<String>, tracks: Vec<Track>) {
        self.rebuild_with_rng(title, tracks, &mut rand::thread_rng());
    }

    /// [`rebuild`](Self::rebuild) with a caller supplied random source.
    pub fn rebuild_with_rng<R: Rng + ?Sized>(
        &mut self,
        title: impl Into<String>,
        tracks: Vec<Track>,
        rng: &mut R,
    ) {
        let mut shared: Vec<Arc<Track>> = tracks.into_iter().map(Arc::new).collect();
        shared.shuffle(rng);

        self.title = title.into();
        self.items = shared
            .into_iter()
            .enumerate()
            .map(|(position, track)| QueueItem {
                queue_id: position as QueueId,
                track,
            })
            .collect();
        self.current_index = if self.items.is_empty() { None } else { Some(0) };
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Whether `index` addresses an item.
    pub fn is_playable(&self, index: Option<usize>) -> bool {
        matches!(index, Some(i) if i < self.items.len())
    }

    /// Bounds-checked lookup by position.
    pub fn item_at(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    /// Item under the cursor.
    pub fn current_item(&self) -> Option<&QueueItem> {
        self.current_index.and_then(|index| self.items.get(index))
    }

    /// Shared track under the cursor.
    pub fn current_track(&self) -> Option<Arc<Track>> {
        self.current_item().map(|item| Arc::clone(&item.track))
    }

    /// Resolve a stable item id to its position.
    pub fn index_of_queue_id(&self, queue_id: QueueId) -> Option<usize> {
        self.items.iter().position(|item| item.queue_id == queue_id)
    }

    /// Move the cursor. Out-of-range indices are rejected.
    pub fn set_current_index(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.current_index = Some(index);
            true
        } else {
            false
        }
    }

    /// Advance the cursor, wrapping past the end to the first item.
    ///
    /// Returns the new index, or `None` when the queue is empty.
    pub fn advance(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            self.current_index = None;
            return None;
        }
        let next = match self.current_index {
            Some(index) => (index + 1) % self.items.len(),
            None => 0,
        };
        self.current_index = Some(next);
        self.current_index
    }

    /// Retreat the cursor, clamping at the first item.
    ///
    /// Returns the new index, or `None` when the queue is empty.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            self.current_index = None;
            return None;
        }
        let previous = self
            .current_index
            .map_or(0, |index| index.saturating_sub(1).min(self.items.len() - 1));
        self.current_index = Some(previous);
        self.current_index
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            title: self.title.clone(),
            items: self.items.clone(),
            current_index: self.current_index,
        }
    }
}
