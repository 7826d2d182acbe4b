//! Core library for the feed aggregator.
//!
//! Layout:
//! - `models` — database rows (`User`, `Feed`, `FeedFollow`, `Post`)
//! - `storage` — the `FeedStore` trait consumed by the scraper and its
//!   Postgres implementation
//! - `fetch` — HTTP fetching and RSS parsing
//! - `scraper` — the periodic scrape scheduler and post ingester
//! - `config` — the on-disk CLI configuration

pub mod config;
pub mod fetch;
pub mod models;
pub mod scraper;
pub mod storage;

use anyhow::{Context, Result};
use sqlx::PgPool;

pub use config::Config;

/// Apply pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")
}
