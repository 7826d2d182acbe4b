//! The storage seam consumed by the scrape scheduler.
//!
//! The scheduler only needs three operations, so they live behind a
//! trait (to allow mocking) with a Postgres implementation delegating
//! to the models.

mod postgres;

pub use postgres::PostgresStore;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Feed, NewPost, Post};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The (feed, url) pair already exists. Not a failure: feeds are
    /// re-polled and re-present items we have already seen.
    #[error("post already exists")]
    Duplicate,
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Up to `limit` feeds ordered by `last_fetched_at` ascending with
    /// nulls first; ties broken by feed id.
    async fn select_feeds_to_fetch(&self, limit: i64) -> Result<Vec<Feed>>;

    /// Set `last_fetched_at` to the current time and return the
    /// updated feed.
    async fn mark_fetched(&self, feed_id: Uuid) -> Result<Feed>;

    /// Insert a post, surfacing a unique-violation as
    /// [`StoreError::Duplicate`].
    async fn insert_post(&self, new_post: &NewPost) -> Result<Post, StoreError>;
}
