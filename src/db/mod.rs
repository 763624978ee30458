//! Database module
//!
//! This module handles all database operations using SQLx with Postgres.

mod engine;
mod migrations;
pub mod tables;

pub use engine::DbEngine;
pub use migrations::run_migrations;
pub use tables::*;
