//! Outbound integrations
//!
//! Song creation is enriched with details fetched from a remote HTTP service.

pub mod enrichment;

pub use enrichment::{EnrichmentClient, EnrichmentError, SongDetailsProvider};
