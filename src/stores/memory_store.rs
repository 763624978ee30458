//! Song store - in-memory song storage with the same semantics as the songs table

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{SongStore, StoreError};
use crate::models::{NewSong, Pagination, Song, SongFilter, SongLyrics};

#[derive(Debug, Default)]
struct Inner {
    /// Songs by id
    songs: BTreeMap<i64, Song>,
    /// Last id handed out; ids are never reused
    last_id: i64,
}

/// In-memory store for songs
#[derive(Debug, Default)]
pub struct MemorySongStore {
    inner: RwLock<Inner>,
}

impl MemorySongStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored songs
    pub fn len(&self) -> usize {
        self.inner.read().songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of one song
    pub fn get(&self, song_id: i64) -> Option<Song> {
        self.inner.read().songs.get(&song_id).cloned()
    }
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn list_filtered(
        &self,
        filter: &SongFilter,
        page: Pagination,
    ) -> Result<Vec<Song>, StoreError> {
        let inner = self.inner.read();

        let mut matched: Vec<&Song> = inner
            .songs
            .values()
            .filter(|song| filter.matches(song))
            .collect();
        matched.sort_by(|a, b| a.song.cmp(&b.song).then(a.song_id.cmp(&b.song_id)));

        Ok(matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_lyrics(&self, song_id: i64) -> Result<SongLyrics, StoreError> {
        self.inner
            .read()
            .songs
            .get(&song_id)
            .map(|song| SongLyrics {
                title: song.song.clone(),
                lyrics: song.lyrics.clone(),
            })
            .ok_or(StoreError::NotFound(song_id))
    }

    async fn insert(&self, song: &NewSong) -> Result<i64, StoreError> {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let song_id = inner.last_id;
        inner.songs.insert(song_id, Song::from_new(song_id, song.clone()));
        Ok(song_id)
    }

    async fn update(&self, song_id: i64, song: &NewSong) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        match inner.songs.get_mut(&song_id) {
            Some(existing) => {
                *existing = Song::from_new(song_id, song.clone());
                Ok(())
            }
            None => Err(StoreError::NotFound(song_id)),
        }
    }

    async fn delete(&self, song_id: i64) -> Result<(), StoreError> {
        self.inner
            .write()
            .songs
            .remove(&song_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(song_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn new_song(group: &str, title: &str, lyrics: &str) -> NewSong {
        NewSong {
            group: group.to_string(),
            song: title.to_string(),
            release_date: "2006-06-12".to_string(),
            lyrics: lyrics.to_string(),
            link: "http://x".to_string(),
        }
    }

    async fn seeded() -> MemorySongStore {
        let store = MemorySongStore::new();
        for (group, title) in [
            ("Muse", "Uprising"),
            ("Muse", "Starlight"),
            ("Queen", "Bohemian Rhapsody"),
            ("Muse", "Hysteria"),
            ("Queen", "Under Pressure"),
        ] {
            store.insert(&new_song(group, title, "")).await.unwrap();
        }
        store
    }

    fn titles(songs: &[Song]) -> Vec<&str> {
        songs.iter().map(|s| s.song.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_orders_by_title_and_pages() {
        let store = seeded().await;
        let all = SongFilter::default();

        let first = store.list_filtered(&all, Pagination::new(1, 2)).await.unwrap();
        assert_eq!(titles(&first), vec!["Bohemian Rhapsody", "Hysteria"]);

        let third = store.list_filtered(&all, Pagination::new(3, 2)).await.unwrap();
        assert_eq!(titles(&third), vec!["Uprising"]);

        let past_end = store.list_filtered(&all, Pagination::new(4, 2)).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitive() {
        let store = seeded().await;

        let muse = store
            .list_filtered(&SongFilter::new("MUSE", ""), Pagination::new(1, 10))
            .await
            .unwrap();
        assert_eq!(titles(&muse), vec!["Hysteria", "Starlight", "Uprising"]);

        let none = store
            .list_filtered(&SongFilter::new("muse", "pressure"), Pagination::new(1, 10))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_get_lyrics() {
        let store = MemorySongStore::new();
        let id = store
            .insert(&new_song("Muse", "Starlight", "v1\n\nv2"))
            .await
            .unwrap();
        assert!(id > 0);

        let lyrics = store.get_lyrics(id).await.unwrap();
        assert_eq!(lyrics.title, "Starlight");
        assert_eq!(lyrics.lyrics, "v1\n\nv2");
    }

    #[tokio::test]
    async fn test_get_lyrics_empty_is_not_not_found() {
        let store = MemorySongStore::new();
        let id = store.insert(&new_song("Muse", "Starlight", "")).await.unwrap();

        let lyrics = assert_ok!(store.get_lyrics(id).await);
        assert!(lyrics.lyrics.is_empty());

        let err = assert_err!(store.get_lyrics(id + 1).await);
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id + 1));
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let store = MemorySongStore::new();
        let id = store.insert(&new_song("Muse", "Starlight", "a")).await.unwrap();

        let replacement = NewSong {
            group: "Muse".to_string(),
            song: "Starlight (Live)".to_string(),
            release_date: String::new(),
            lyrics: "b".to_string(),
            link: String::new(),
        };
        assert_ok!(store.update(id, &replacement).await);
        assert_eq!(store.get(id), Some(Song::from_new(id, replacement)));
    }

    #[tokio::test]
    async fn test_update_missing_leaves_store_unchanged() {
        let store = seeded().await;
        let before: Vec<Song> = (1..=5).filter_map(|id| store.get(id)).collect();

        let err = assert_err!(store.update(42, &new_song("X", "Y", "")).await);
        assert!(matches!(err, StoreError::NotFound(42)));

        let after: Vec<Song> = (1..=5).filter_map(|id| store.get(id)).collect();
        assert_eq!(before, after);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let store = seeded().await;

        assert_ok!(store.delete(2).await);
        let err = assert_err!(store.delete(2).await);
        assert!(matches!(err, StoreError::NotFound(2)));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = MemorySongStore::new();
        let first = store.insert(&new_song("A", "a", "")).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.insert(&new_song("B", "b", "")).await.unwrap();
        assert!(second > first);
    }
}
