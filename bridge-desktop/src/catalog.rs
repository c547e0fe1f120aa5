//! In-Memory Catalog Implementation
//!
//! A catalog held entirely in process. Useful for desktop builds that ship a
//! bundled library, for demos and for tests. Track lists can be loaded from a
//! JSON document:
//!
//! ```json
//! [
//!   { "id": "t1", "title": "Intro", "artist": "Band",
//!     "source_uri": "file:///music/intro.mp3", "duration_ms": 182000 }
//! ]
//! ```

use async_trait::async_trait;
use bridge_traits::{
    catalog::{CatalogProvider, Track},
    error::{BridgeError, Result},
};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    title: String,
    artist: String,
    source_uri: String,
    duration_ms: u64,
    #[serde(default)]
    artwork_uri: Option<String>,
    #[serde(default)]
    favorite: bool,
}

impl From<CatalogEntry> for Track {
    fn from(entry: CatalogEntry) -> Self {
        let track = Track::new(
            entry.id,
            entry.title,
            entry.artist,
            entry.source_uri,
            entry.duration_ms,
        );
        match entry.artwork_uri {
            Some(artwork) => track.with_artwork(artwork),
            None => track,
        }
    }
}

/// Catalog backed by a fixed track list and an in-memory favorites set.
pub struct InMemoryCatalog {
    tracks: RwLock<Vec<Track>>,
    favorites: RwLock<HashSet<String>>,
    selection_size: Option<usize>,
}

impl InMemoryCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        let favorites = tracks
            .iter()
            .filter(|track| track.is_favorite())
            .map(|track| track.id.clone())
            .collect();
        Self {
            tracks: RwLock::new(tracks),
            favorites: RwLock::new(favorites),
            selection_size: None,
        }
    }

    /// Parse a JSON array of track entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid catalog JSON: {}", e)))?;

        let mut favorites = HashSet::new();
        let tracks = entries
            .into_iter()
            .map(|entry| {
                if entry.favorite {
                    favorites.insert(entry.id.clone());
                }
                Track::from(entry)
            })
            .collect();

        Ok(Self {
            tracks: RwLock::new(tracks),
            favorites: RwLock::new(favorites),
            selection_size: None,
        })
    }

    /// Limit how many tracks a random fetch returns.
    pub fn with_selection_size(mut self, size: usize) -> Self {
        self.selection_size = Some(size);
        self
    }

    pub fn add_track(&self, track: Track) {
        if track.is_favorite() {
            self.favorites.write().insert(track.id.clone());
        }
        self.tracks.write().push(track);
    }

    pub fn len(&self) -> usize {
        self.tracks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }

    /// Ids of every favorited track, sorted.
    pub fn favorites(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.favorites.read().iter().cloned().collect();
        ids.sort();
        ids
    }

    fn contains(&self, track_id: &str) -> bool {
        self.tracks.read().iter().any(|track| track.id == track_id)
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn fetch_random_tracks(&self) -> Result<Vec<Track>> {
        let favorites = self.favorites.read();
        let mut selection: Vec<Track> = self
            .tracks
            .read()
            .iter()
            .map(|track| track.clone().with_favorite(favorites.contains(&track.id)))
            .collect();

        selection.shuffle(&mut rand::thread_rng());
        if let Some(size) = self.selection_size {
            selection.truncate(size);
        }

        debug!(count = selection.len(), "Random selection drawn");
        Ok(selection)
    }

    async fn is_favorite(&self, track_id: &str) -> Result<bool> {
        Ok(self.favorites.read().contains(track_id))
    }

    async fn set_favorite(&self, track_id: &str, favorite: bool) -> Result<()> {
        if !self.contains(track_id) {
            return Err(BridgeError::OperationFailed(format!(
                "Unknown track: {}",
                track_id
            )));
        }

        let mut favorites = self.favorites.write();
        if favorite {
            favorites.insert(track_id.to_string());
        } else {
            favorites.remove(track_id);
        }
        debug!(track_id, favorite, "Favorite updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Track::new("a", "Alpha", "Artist", "file:///a.mp3", 1_000),
            Track::new("b", "Bravo", "Artist", "file:///b.mp3", 2_000).with_favorite(true),
            Track::new("c", "Charlie", "Artist", "file:///c.mp3", 3_000),
        ])
    }

    #[tokio::test]
    async fn test_fetch_returns_every_track_with_favorites() {
        let catalog = sample();
        let tracks = catalog.fetch_random_tracks().await.unwrap();

        let mut ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let bravo = tracks.iter().find(|t| t.id == "b").unwrap();
        assert!(bravo.is_favorite());
    }

    #[tokio::test]
    async fn test_selection_size_limits_fetch() {
        let catalog = sample().with_selection_size(2);
        assert_eq!(catalog.fetch_random_tracks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_favorite() {
        let catalog = sample();
        catalog.set_favorite("a", true).await.unwrap();
        catalog.set_favorite("b", false).await.unwrap();

        assert!(catalog.is_favorite("a").await.unwrap());
        assert!(!catalog.is_favorite("b").await.unwrap());
        assert_eq!(catalog.favorites(), vec!["a".to_string()]);
        assert!(catalog.set_favorite("zzz", true).await.is_err());
    }

    #[tokio::test]
    async fn test_from_json() {
        let catalog = InMemoryCatalog::from_json_str(
            r#"[
                {"id": "t1", "title": "Intro", "artist": "Band",
                 "source_uri": "file:///music/intro.mp3", "duration_ms": 182000,
                 "favorite": true},
                {"id": "t2", "title": "Outro", "artist": "Band",
                 "source_uri": "https://cdn.example.com/outro.mp3", "duration_ms": 95000,
                 "artwork_uri": "https://cdn.example.com/outro.jpg"}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.favorites(), vec!["t1".to_string()]);

        let tracks = catalog.fetch_random_tracks().await.unwrap();
        let outro = tracks.iter().find(|t| t.id == "t2").unwrap();
        assert_eq!(
            outro.artwork_uri.as_deref(),
            Some("https://cdn.example.com/outro.jpg")
        );
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(InMemoryCatalog::from_json_str("{not json").is_err());
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let catalog = InMemoryCatalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.fetch_random_tracks().await.unwrap().is_empty());
        catalog.add_track(Track::new("x", "X", "Y", "file:///x.mp3", 10));
        assert_eq!(catalog.len(), 1);
    }
}
