//! Song table operations

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::{debug, info, warn};

use crate::db::DbEngine;
use crate::models::{NewSong, Pagination, Song, SongFilter, SongLyrics};
use crate::stores::{SongStore, StoreError};

/// Database row for songs table
#[derive(Debug, FromRow)]
struct SongRow {
    song_id: i32,
    group_name: String,
    song: String,
    release_date: String,
    lyrics: Option<String>,
    link: String,
}

impl SongRow {
    fn into_song(self) -> Song {
        Song {
            song_id: self.song_id as i64,
            group: self.group_name,
            song: self.song,
            release_date: self.release_date,
            lyrics: self.lyrics.unwrap_or_default(),
            link: self.link,
        }
    }
}

/// Song table operations
pub struct SongTable {
    engine: DbEngine,
}

impl SongTable {
    pub fn new(engine: DbEngine) -> Self {
        Self { engine }
    }
}

/// `song_id` is a SERIAL (int4) column
fn to_db_id(song_id: i64) -> Result<i32, StoreError> {
    i32::try_from(song_id).map_err(|_| StoreError::NotFound(song_id))
}

#[async_trait]
impl SongStore for SongTable {
    #[tracing::instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &SongFilter,
        page: Pagination,
    ) -> Result<Vec<Song>, StoreError> {
        let group = filter.group_pattern();
        let title = filter.title_pattern();
        debug!(?group, ?title, offset = page.offset(), "Listing songs");

        let rows: Vec<SongRow> = sqlx::query_as(
            r#"
            SELECT song_id, group_name, song, release_date, lyrics, link
            FROM songs
            WHERE ($1::TEXT IS NULL OR group_name ILIKE $1)
              AND ($2::TEXT IS NULL OR song ILIKE $2)
            ORDER BY song, song_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(group)
        .bind(title)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(self.engine.pool())
        .await?;

        Ok(rows.into_iter().map(SongRow::into_song).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_lyrics(&self, song_id: i64) -> Result<SongLyrics, StoreError> {
        let id = to_db_id(song_id)?;

        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT song, lyrics FROM songs WHERE song_id = $1")
                .bind(id)
                .fetch_optional(self.engine.pool())
                .await?;

        match row {
            Some((title, lyrics)) => {
                if lyrics.is_none() {
                    info!("Song {} found, but lyrics are missing", song_id);
                }
                Ok(SongLyrics {
                    title,
                    lyrics: lyrics.unwrap_or_default(),
                })
            }
            None => {
                warn!("Song {} not found", song_id);
                Err(StoreError::NotFound(song_id))
            }
        }
    }

    #[tracing::instrument(skip(self, song))]
    async fn insert(&self, song: &NewSong) -> Result<i64, StoreError> {
        let (song_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO songs (group_name, song, release_date, lyrics, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING song_id
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(&song.release_date)
        .bind(&song.lyrics)
        .bind(&song.link)
        .fetch_one(self.engine.pool())
        .await?;

        info!("Song '{}' by '{}' added with id {}", song.song, song.group, song_id);
        Ok(song_id as i64)
    }

    #[tracing::instrument(skip(self, song))]
    async fn update(&self, song_id: i64, song: &NewSong) -> Result<(), StoreError> {
        let id = to_db_id(song_id)?;

        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = $1, song = $2, release_date = $3, lyrics = $4, link = $5
            WHERE song_id = $6
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(&song.release_date)
        .bind(&song.lyrics)
        .bind(&song.link)
        .bind(id)
        .execute(self.engine.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(song_id));
        }

        info!("Song {} updated", song_id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, song_id: i64) -> Result<(), StoreError> {
        let id = to_db_id(song_id)?;

        let result = sqlx::query("DELETE FROM songs WHERE song_id = $1")
            .bind(id)
            .execute(self.engine.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(song_id));
        }

        info!("Song {} deleted", song_id);
        Ok(())
    }
}

/// These run against a real Postgres named by `TEST_DATABASE_URL`, via
/// `cargo test -- --ignored`. Each test works on rows it created itself.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;
    use tokio::sync::OnceCell;

    // concurrent CREATE TABLE IF NOT EXISTS can race in Postgres
    static MIGRATED: OnceCell<()> = OnceCell::const_new();

    async fn table() -> SongTable {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("TEST_DATABASE_URL is set but unreachable");
        let engine = DbEngine::from_pool(pool);
        MIGRATED
            .get_or_init(|| async { run_migrations(&engine).await.unwrap() })
            .await;
        SongTable::new(engine)
    }

    fn new_song(group: &str, title: &str, lyrics: &str) -> NewSong {
        NewSong {
            group: group.to_string(),
            song: title.to_string(),
            release_date: "2006-06-12".to_string(),
            lyrics: lyrics.to_string(),
            link: "http://x".to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "needs Postgres at TEST_DATABASE_URL"]
    async fn test_insert_then_get_lyrics() {
        let table = table().await;

        let id = table
            .insert(&new_song("Muse", "Starlight", "v1\n\nv2"))
            .await
            .unwrap();
        assert!(id > 0);

        let lyrics = table.get_lyrics(id).await.unwrap();
        assert_eq!(lyrics.title, "Starlight");
        assert_eq!(lyrics.lyrics, "v1\n\nv2");

        table.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs Postgres at TEST_DATABASE_URL"]
    async fn test_null_lyrics_is_empty_not_missing() {
        let table = table().await;

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO songs (group_name, song, lyrics) VALUES ('Muse', 'Null Lyrics', NULL) RETURNING song_id",
        )
        .fetch_one(table.engine.pool())
        .await
        .unwrap();

        let lyrics = table.get_lyrics(id as i64).await.unwrap();
        assert_eq!(lyrics.title, "Null Lyrics");
        assert!(lyrics.lyrics.is_empty());

        table.delete(id as i64).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs Postgres at TEST_DATABASE_URL"]
    async fn test_list_filters_and_pages() {
        let table = table().await;

        // unique group so concurrent rows from other tests never match
        let group = format!("Filter Group {}", std::process::id());
        let mut ids = Vec::new();
        for title in ["c_100%", "a_100%", "b_100%"] {
            ids.push(table.insert(&new_song(&group, title, "")).await.unwrap());
        }

        let filter = SongFilter::new(group.to_uppercase(), "100%");
        let first = table
            .list_filtered(&filter, Pagination::new(1, 2))
            .await
            .unwrap();
        let titles: Vec<&str> = first.iter().map(|s| s.song.as_str()).collect();
        assert_eq!(titles, vec!["a_100%", "b_100%"]);

        let second = table
            .list_filtered(&filter, Pagination::new(2, 2))
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].song, "c_100%");

        let literal = SongFilter::new(group.clone(), "_1");
        let matched = table
            .list_filtered(&literal, Pagination::new(1, 10))
            .await
            .unwrap();
        assert_eq!(matched.len(), 3);

        for id in ids {
            table.delete(id).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore = "needs Postgres at TEST_DATABASE_URL"]
    async fn test_list_past_any_row_is_empty() {
        let table = table().await;

        let songs = table
            .list_filtered(&SongFilter::default(), Pagination::new(u32::MAX, u32::MAX))
            .await
            .unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    #[ignore = "needs Postgres at TEST_DATABASE_URL"]
    async fn test_update_and_delete_missing_rows() {
        let table = table().await;

        let id = table.insert(&new_song("Muse", "Temp", "")).await.unwrap();
        table.delete(id).await.unwrap();

        assert!(matches!(
            table.update(id, &new_song("Muse", "Temp", "")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(table.delete(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(table.get_lyrics(id).await, Err(StoreError::NotFound(_))));
    }
}
