//! REST API routes

pub mod error;
pub mod songs;

pub use error::ApiError;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpRequest};
use tracing::warn;

use crate::plugins::SongDetailsProvider;
use crate::stores::SongStore;

/// Shared handler dependencies
pub struct AppState {
    pub songs: Arc<dyn SongStore>,
    pub details: Arc<dyn SongDetailsProvider>,
    /// Upper bound on the store and enrichment work of one request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        songs: Arc<dyn SongStore>,
        details: Arc<dyn SongDetailsProvider>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            songs,
            details,
            request_timeout,
        }
    }

    /// Run `work` under the request deadline
    pub async fn within_deadline<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::time::timeout(self.request_timeout, work)
            .await
            .map_err(|_| ApiError::DeadlineExceeded)?
    }
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(songs::json_config())
        .app_data(songs::query_config())
        // Collection: list, create
        .service(
            web::resource("/songs")
                .route(web::get().to(songs::list_songs))
                .route(web::post().to(songs::add_song))
                .default_service(web::to(method_not_allowed)),
        )
        // Item keyed by ?id=: lyrics, update, delete
        .service(
            web::resource("/songs/")
                .route(web::get().to(songs::get_song_lyrics))
                .route(web::put().to(songs::update_song))
                .route(web::delete().to(songs::delete_song))
                .default_service(web::to(method_not_allowed)),
        );
}

async fn method_not_allowed(req: HttpRequest) -> Result<&'static str, ApiError> {
    warn!(method = %req.method(), path = req.path(), "Method not allowed");
    Err(ApiError::MethodNotAllowed)
}
