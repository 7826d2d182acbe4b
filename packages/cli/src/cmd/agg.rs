use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::info;

use aggregator_core::fetch::HttpFetcher;
use aggregator_core::scraper::{Scraper, ScraperConfig};
use aggregator_core::storage::PostgresStore;

/// Run the scrape scheduler until Ctrl-C.
pub async fn run(pool: &PgPool, concurrency: usize, interval_secs: u64) -> Result<()> {
    let store = Arc::new(PostgresStore::new(pool.clone()));
    let fetcher = Arc::new(HttpFetcher::new()?);

    let scraper = Scraper::new(
        store,
        fetcher,
        ScraperConfig {
            concurrency,
            interval: Duration::from_secs(interval_secs),
        },
    )?;

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(scraper.run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("shutting down");
    shutdown.cancel();
    handle.await.context("Scraper task failed")?;

    Ok(())
}
