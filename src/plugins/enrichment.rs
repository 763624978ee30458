//! Enrichment client - fetches release date, lyrics and link for a new song

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ExternalApiConfig;
use crate::models::SongDetail;

/// Enrichment error type
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment service unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),

    #[error("enrichment service returned a bad response: {0}")]
    BadResponse(String),
}

/// Source of supplementary song details
#[async_trait]
pub trait SongDetailsProvider: Send + Sync {
    async fn fetch_details(&self, group: &str, song: &str) -> Result<SongDetail, EnrichmentError>;
}

/// HTTP client for the configured enrichment endpoint
pub struct EnrichmentClient {
    client: Client,
    url: Url,
    method: Method,
}

impl EnrichmentClient {
    /// `timeout` bounds the whole exchange, connect included
    pub fn new(config: &ExternalApiConfig, timeout: Duration) -> Result<Self, EnrichmentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EnrichmentError::Unavailable)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            method: config.method.as_reqwest(),
        })
    }
}

#[async_trait]
impl SongDetailsProvider for EnrichmentClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_details(&self, group: &str, song: &str) -> Result<SongDetail, EnrichmentError> {
        let resp = self
            .client
            .request(self.method.clone(), self.url.clone())
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request: {}", e);
                EnrichmentError::Unavailable(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!("Enrichment service answered {}", status);
            return Err(EnrichmentError::BadResponse(format!("API error: {}", status)));
        }

        let detail: SongDetail = resp.json().await.map_err(|e| {
            error!("Failed to parse response: {}", e);
            EnrichmentError::BadResponse(format!("failed to parse response: {}", e))
        })?;

        debug!(release_date = %detail.release_date, "Fetched song details");
        Ok(detail)
    }
}
