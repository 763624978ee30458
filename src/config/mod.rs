//! Configuration module
//!
//! This module contains the validated application configuration.

mod app_config;

pub use app_config::{AppConfig, DatabaseConfig, ExternalApiConfig};

#[cfg(test)]
pub use app_config::ExternalApiMethod;
