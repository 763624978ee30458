//! Song storage capability
//!
//! Handlers talk to storage only through [`SongStore`]. The Postgres table in
//! `db::tables` is the production implementation, `MemorySongStore` backs
//! the handler tests.

#[cfg(test)]
mod memory_store;

#[cfg(test)]
pub use memory_store::MemorySongStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSong, Pagination, Song, SongFilter, SongLyrics};

/// Storage error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("song {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Persistence operations over the songs table.
///
/// Page and limit are validated by the caller; implementations do not
/// re-check them.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Songs matching the filter, ordered by title, one page at a time
    async fn list_filtered(
        &self,
        filter: &SongFilter,
        page: Pagination,
    ) -> Result<Vec<Song>, StoreError>;

    /// Title and lyrics of one song; NULL lyrics come back as an empty string
    async fn get_lyrics(&self, song_id: i64) -> Result<SongLyrics, StoreError>;

    /// Insert a song and return its generated id
    async fn insert(&self, song: &NewSong) -> Result<i64, StoreError>;

    /// Replace every mutable field of an existing song
    async fn update(&self, song_id: i64, song: &NewSong) -> Result<(), StoreError>;

    async fn delete(&self, song_id: i64) -> Result<(), StoreError>;
}
