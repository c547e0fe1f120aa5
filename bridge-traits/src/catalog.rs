//! Catalog Abstraction
//!
//! The catalog owns track records and the user's favorites. The playback core
//! never fetches metadata itself; it asks the host catalog for a randomized
//! selection of tracks and reads or flips the favorite flag of the track that
//! is currently playing.

use crate::{error::Result, platform::PlatformSendSync};
use std::sync::atomic::{AtomicBool, Ordering};

/// Immutable track record shared between the catalog and the playback core.
///
/// Every field except `favorite` is fixed at construction. The favorite flag
/// is owned by the catalog and mirrored here so observers holding a shared
/// reference see the latest value.
#[derive(Debug)]
pub struct Track {
    /// Stable catalog identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display artist.
    pub artist: String,
    /// URI the media backend loads.
    pub source_uri: String,
    /// Duration reported by the catalog, in milliseconds.
    pub duration_ms: u64,
    /// Optional artwork location.
    pub artwork_uri: Option<String>,
    favorite: AtomicBool,
}

impl Track {
    /// Create a new track record.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        source_uri: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            source_uri: source_uri.into(),
            duration_ms,
            artwork_uri: None,
            favorite: AtomicBool::new(false),
        }
    }

    /// Attach an artwork URI.
    pub fn with_artwork(mut self, artwork_uri: impl Into<String>) -> Self {
        self.artwork_uri = Some(artwork_uri.into());
        self
    }

    /// Set the initial favorite flag.
    pub fn with_favorite(self, favorite: bool) -> Self {
        self.favorite.store(favorite, Ordering::Relaxed);
        self
    }

    /// Current favorite flag.
    pub fn is_favorite(&self) -> bool {
        self.favorite.load(Ordering::Relaxed)
    }

    /// Mirror the catalog's favorite flag onto this record.
    pub fn set_favorite(&self, favorite: bool) {
        self.favorite.store(favorite, Ordering::Relaxed);
    }
}

impl Clone for Track {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            artist: self.artist.clone(),
            source_uri: self.source_uri.clone(),
            duration_ms: self.duration_ms,
            artwork_uri: self.artwork_uri.clone(),
            favorite: AtomicBool::new(self.is_favorite()),
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.artist == other.artist
            && self.source_uri == other.source_uri
            && self.duration_ms == other.duration_ms
            && self.artwork_uri == other.artwork_uri
            && self.is_favorite() == other.is_favorite()
    }
}

impl Eq for Track {}

/// Catalog provider trait
///
/// Implemented by the host's catalog layer (HTTP catalog fetch plus local
/// favorites persistence). The controller calls `is_favorite` and
/// `set_favorite` from its serialized handler, so those must be fast.
/// `fetch_random_tracks` may be slow; the controller runs it off the handler
/// and receives the result as an event.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::CatalogProvider;
///
/// async fn toggle(catalog: &dyn CatalogProvider, id: &str) -> bridge_traits::error::Result<()> {
///     let current = catalog.is_favorite(id).await?;
///     catalog.set_favorite(id, !current).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CatalogProvider: PlatformSendSync {
    /// Return a randomized selection of playable tracks.
    async fn fetch_random_tracks(&self) -> Result<Vec<Track>>;

    /// Whether the track is marked as a favorite.
    async fn is_favorite(&self, track_id: &str) -> Result<bool>;

    /// Add or remove the track from favorites.
    async fn set_favorite(&self, track_id: &str, favorite: bool) -> Result<()>;
}
