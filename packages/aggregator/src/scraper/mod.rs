//! The periodic scrape scheduler.
//!
//! One long-lived coordinator loops on a fixed tick: select the least
//! recently fetched feeds, mark each fetched, fan out one task per
//! feed, and block on the batch before the next tick. Failures inside
//! a worker are logged and isolated; nothing a worker does can stop
//! the coordinator or its siblings.

mod ingest;

pub use ingest::{ingest, IngestReport};

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::fetch::FetchFeed;
use crate::models::Feed;
use crate::storage::FeedStore;

#[derive(Debug, Clone, Copy)]
pub struct ScraperConfig {
    /// Feeds selected (and fetched concurrently) per tick.
    pub concurrency: usize,
    /// Time between tick starts.
    pub interval: Duration,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency must be greater than zero")]
    ZeroConcurrency,
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

pub struct Scraper {
    store: Arc<dyn FeedStore>,
    fetcher: Arc<dyn FetchFeed>,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(
        store: Arc<dyn FeedStore>,
        fetcher: Arc<dyn FetchFeed>,
        config: ScraperConfig,
    ) -> Result<Self, ConfigError> {
        if config.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if config.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            store,
            fetcher,
            config,
        })
    }

    /// Run until `shutdown` is cancelled. The first tick fires
    /// immediately; later ticks are spaced `interval` apart from the
    /// start of the previous tick.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            concurrency = self.config.concurrency,
            interval_secs = self.config.interval.as_secs(),
            "scraper starting"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_tick(&shutdown).await;
        }

        info!("scraper stopped");
    }

    async fn run_tick(&self, shutdown: &CancellationToken) {
        let feeds = match self
            .store
            .select_feeds_to_fetch(self.config.concurrency as i64)
            .await
        {
            Ok(feeds) => feeds,
            Err(e) => {
                // Tick-level failure: skip this batch, keep running.
                error!(error = %e, "failed to select feeds to fetch");
                return;
            }
        };

        if feeds.is_empty() {
            debug!("no feeds to fetch");
            return;
        }

        debug!(count = feeds.len(), "starting batch");

        // Mark every feed fetched before any dispatch. A feed that
        // fails mid-fetch has already lost its oldest-first priority,
        // so one broken feed cannot monopolize the schedule.
        let mut batch = Vec::with_capacity(feeds.len());
        for feed in feeds {
            match self.store.mark_fetched(feed.id).await {
                Ok(marked) => batch.push(marked),
                Err(e) => {
                    warn!(feed_id = %feed.id, url = %feed.url, error = %e, "failed to mark feed fetched, skipping this tick");
                }
            }
        }

        let mut handles = Vec::with_capacity(batch.len());
        for feed in batch {
            let store = Arc::clone(&self.store);
            let fetcher = Arc::clone(&self.fetcher);
            let cancel = shutdown.child_token();

            handles.push(tokio::spawn(async move {
                scrape_feed(store, fetcher, feed, cancel).await;
            }));
        }

        // Join barrier: the next tick is not evaluated until every
        // worker of this batch has completed or failed.
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "scrape task panicked");
            }
        }
    }
}

/// One worker: fetch a feed and ingest its items. Errors stay here.
async fn scrape_feed(
    store: Arc<dyn FeedStore>,
    fetcher: Arc<dyn FetchFeed>,
    feed: Feed,
    cancel: CancellationToken,
) {
    let document = match fetcher.fetch(&feed.url, &cancel).await {
        Ok(document) => document,
        Err(e) => {
            warn!(feed_id = %feed.id, url = %feed.url, error = %e, "failed to fetch feed");
            return;
        }
    };

    let report = ingest(store.as_ref(), &feed, &document).await;

    info!(
        feed_id = %feed.id,
        url = %feed.url,
        inserted = report.inserted,
        duplicates = report.duplicates,
        skipped = report.skipped,
        failed = report.failed,
        "feed processed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RssDocument;
    use crate::storage::StoreError;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct EmptyStore;

    #[async_trait]
    impl FeedStore for EmptyStore {
        async fn select_feeds_to_fetch(&self, _limit: i64) -> anyhow::Result<Vec<Feed>> {
            Ok(Vec::new())
        }

        async fn mark_fetched(&self, _feed_id: Uuid) -> anyhow::Result<Feed> {
            unimplemented!()
        }

        async fn insert_post(
            &self,
            _new_post: &crate::models::NewPost,
        ) -> Result<crate::models::Post, StoreError> {
            unimplemented!()
        }
    }

    struct NoFetcher;

    #[async_trait]
    impl FetchFeed for NoFetcher {
        async fn fetch(
            &self,
            url: &str,
            _cancel: &CancellationToken,
        ) -> Result<RssDocument, crate::fetch::FetchError> {
            Err(crate::fetch::FetchError::Cancelled {
                url: url.to_string(),
            })
        }
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Scraper::new(
            Arc::new(EmptyStore),
            Arc::new(NoFetcher),
            ScraperConfig {
                concurrency: 0,
                interval: Duration::from_secs(60),
            },
        )
        .err()
        .unwrap();

        assert_eq!(err, ConfigError::ZeroConcurrency);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Scraper::new(
            Arc::new(EmptyStore),
            Arc::new(NoFetcher),
            ScraperConfig {
                concurrency: 15,
                interval: Duration::ZERO,
            },
        )
        .err()
        .unwrap();

        assert_eq!(err, ConfigError::ZeroInterval);
    }

    #[tokio::test(start_paused = true)]
    async fn an_empty_feed_set_is_a_no_op_tick() {
        let scraper = Scraper::new(
            Arc::new(EmptyStore),
            Arc::new(NoFetcher),
            ScraperConfig {
                concurrency: 5,
                interval: Duration::from_secs(60),
            },
        )
        .unwrap();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(scraper.run(shutdown.clone()));

        // Let a few ticks elapse, then stop. Nothing should hang.
        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.cancel();
        handle.await.unwrap();
    }
}
