//! Error type for the HTTP layer

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::PageOutOfRange;
use crate::plugins::EnrichmentError;
use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Page out of range")]
    PageOutOfRange(#[from] PageOutOfRange),

    #[error("Failed to fetch song details from external API")]
    Enrichment(#[from] EnrichmentError),

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// Map a store error, using `context` as the message for storage failures
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| match err {
            StoreError::NotFound(_) => ApiError::NotFound("Song not found".to_string()),
            source => ApiError::Store { context, source },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::PageOutOfRange(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Enrichment(_) | ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Enrichment(e) => error!("{}: {}", self, e),
            ApiError::Store { source, .. } => error!("{}: {}", self, source),
            ApiError::DeadlineExceeded => error!("{}", self),
            ApiError::PageOutOfRange(e) => warn!("{}", e),
            _ => warn!("{}", self),
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
