//! Song api routes: list, lyrics, create, update, delete

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::{ApiError, AppState};
use crate::core::LyricsLib;
use crate::models::{NewSong, Pagination, SongBody, SongFilter, SongLyrics};

/// Songs per page when listing
const DEFAULT_LIST_LIMIT: u32 = 10;

/// Stanzas per page when reading lyrics
const DEFAULT_LYRICS_LIMIT: u32 = 5;

/// list query params
///
/// Numbers are kept as strings so that bad values fall back to defaults
/// instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub group: Option<String>,
    pub title: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// item query params
#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// one page of lyrics
#[derive(Debug, Serialize)]
struct LyricsResponse {
    song: String,
    song_id: i64,
    lyrics: Vec<String>,
    page: usize,
    page_size: usize,
}

/// Malformed JSON bodies are validation errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("Rejected request body: {}", err);
        ApiError::Validation("Invalid request payload".to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        debug!("Rejected query string: {}", err);
        ApiError::Validation("Invalid query string".to_string()).into()
    })
}

/// positive integer param, or `default` when missing or invalid
fn positive_or(raw: Option<&str>, name: &str, default: u32) -> u32 {
    match raw {
        None => default,
        Some(value) => match value.trim().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                warn!("Invalid {} parameter '{}', defaulting to {}", name, value, default);
                default
            }
        },
    }
}

fn song_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing query id parameter".to_string()))?;

    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation("Invalid query id parameter".to_string())),
    }
}

/// GET /songs
pub async fn list_songs(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    debug!(?query, "Listing songs");

    let (Some(group), Some(title)) = (query.group, query.title) else {
        return Err(ApiError::Validation(
            "Missing parameters: group and title are required".to_string(),
        ));
    };

    let page = Pagination::new(
        positive_or(query.page.as_deref(), "page", 1),
        positive_or(query.limit.as_deref(), "limit", DEFAULT_LIST_LIMIT),
    );
    let filter = SongFilter::new(group, title);

    let songs = state
        .within_deadline(async {
            state
                .songs
                .list_filtered(&filter, page)
                .await
                .map_err(ApiError::store("Failed to fetch songs"))
        })
        .await?;

    info!("Fetched {} songs", songs.len());
    Ok(HttpResponse::Ok().json(songs))
}

/// GET /songs/?id=N
pub async fn get_song_lyrics(
    state: web::Data<AppState>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse, ApiError> {
    let song_id = song_id(query.id.as_deref())?;
    let page = positive_or(query.page.as_deref(), "page", 1);
    let size = positive_or(query.limit.as_deref(), "limit", DEFAULT_LYRICS_LIMIT);
    debug!(song_id, page, size, "Fetching lyrics");

    let SongLyrics { title, lyrics } = state
        .within_deadline(async {
            state
                .songs
                .get_lyrics(song_id)
                .await
                .map_err(ApiError::store("Failed to retrieve song details"))
        })
        .await?;

    if lyrics.is_empty() {
        info!("No lyrics found for song {}", song_id);
        return Ok(HttpResponse::Ok().json(json!({
            "song": title,
            "song_id": song_id,
            "error": "Lyrics not found",
        })));
    }

    let page = LyricsLib::paginate(&lyrics, page as usize, size as usize)?;

    info!(
        "Retrieved lyrics for song {} ({} stanzas)",
        song_id, page.total_stanzas
    );
    Ok(HttpResponse::Ok().json(LyricsResponse {
        song: title,
        song_id,
        lyrics: page.stanzas,
        page: page.page,
        page_size: page.page_size,
    }))
}

/// POST /songs
pub async fn add_song(
    state: web::Data<AppState>,
    body: web::Json<SongBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    debug!(group = %body.group, song = %body.song, "Adding song");

    if !body.has_identity() {
        return Err(ApiError::Validation(
            "Group and Song are required fields".to_string(),
        ));
    }

    // no rollback: a failed insert after a successful lookup is simply reported
    let song_id = state
        .within_deadline(async {
            let detail = state.details.fetch_details(&body.group, &body.song).await?;
            let song = NewSong::enriched(body.group.clone(), body.song.clone(), detail);
            state
                .songs
                .insert(&song)
                .await
                .map_err(ApiError::store("Failed to save song in database"))
        })
        .await?;

    info!("Song {} created", song_id);
    Ok(HttpResponse::Created().json(json!({ "id": song_id })))
}

/// PUT /songs/?id=N
pub async fn update_song(
    state: web::Data<AppState>,
    query: web::Query<ItemQuery>,
    body: web::Json<SongBody>,
) -> Result<HttpResponse, ApiError> {
    let song_id = song_id(query.id.as_deref())?;
    let body = body.into_inner();

    if !body.has_identity() {
        return Err(ApiError::Validation(
            "Group and Song fields are required".to_string(),
        ));
    }

    let song = body.into_new_song();
    state
        .within_deadline(async {
            state
                .songs
                .update(song_id, &song)
                .await
                .map_err(ApiError::store("Failed to update song"))
        })
        .await?;

    info!("Song {} updated", song_id);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Song updated successfully"))
}

/// DELETE /songs/?id=N
pub async fn delete_song(
    state: web::Data<AppState>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse, ApiError> {
    let song_id = song_id(query.id.as_deref())?;

    state
        .within_deadline(async {
            state
                .songs
                .delete(song_id)
                .await
                .map_err(ApiError::store("Failed to delete song"))
        })
        .await?;

    info!("Song {} deleted", song_id);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Song deleted successfully"))
}
