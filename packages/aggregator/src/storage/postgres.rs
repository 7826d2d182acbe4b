use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FeedStore, StoreError};
use crate::models::{Feed, NewPost, Post};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedStore for PostgresStore {
    async fn select_feeds_to_fetch(&self, limit: i64) -> Result<Vec<Feed>> {
        Feed::next_to_fetch(limit, &self.pool).await
    }

    async fn mark_fetched(&self, feed_id: Uuid) -> Result<Feed> {
        Feed::mark_fetched(feed_id, &self.pool).await
    }

    async fn insert_post(&self, new_post: &NewPost) -> Result<Post, StoreError> {
        Post::create(new_post, &self.pool).await.map_err(|e| {
            let is_duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if is_duplicate {
                StoreError::Duplicate
            } else {
                StoreError::Query(e)
            }
        })
    }
}
