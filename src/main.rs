//! Online Library - a small REST service for song lyrics
//!
//! Songs are kept in Postgres. New songs are enriched with release date,
//! lyrics and link from an external song-details API.

mod api;
mod config;
mod core;
mod db;
mod models;
mod plugins;
mod stores;

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::db::{run_migrations, DbEngine, SongTable};
use crate::plugins::EnrichmentClient;

/// Online Library - song lyrics service
#[derive(Parser, Debug)]
#[command(name = "online-library")]
#[command(version)]
#[command(about = "REST service for storing and browsing song lyrics")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on, overrides SERVER_PORT
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Load environment from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    load_env_file(args.env_file.as_deref())?;

    // RUST_LOG wins over --debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if args.debug { "debug" } else { "info" };
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Online Library v{} starting...", env!("CARGO_PKG_VERSION"));

    let cfg = AppConfig::from_env().context("Failed to load configuration")?;
    let port = args.port.unwrap_or(cfg.server_port);

    start_server(cfg, args.host, port).await
}

/// Missing default `.env` is fine, a missing explicit file is not
fn load_env_file(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("Failed to load .env"),
        },
    }
    Ok(())
}

async fn start_server(cfg: AppConfig, host: String, port: u16) -> Result<()> {
    info!("Connecting to database...");
    let engine = DbEngine::connect(&cfg.database, cfg.request_timeout).await?;

    info!("Running migrations...");
    run_migrations(&engine).await?;

    let details = EnrichmentClient::new(&cfg.external_api, cfg.request_timeout)
        .context("Failed to build enrichment client")?;
    info!(
        "Song details from {} {}",
        cfg.external_api.method, cfg.external_api.url
    );

    let state = web::Data::new(AppState::new(
        Arc::new(SongTable::new(engine)),
        Arc::new(details),
        cfg.request_timeout,
    ));

    info!("Server listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
