use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::Feed;

/// A user's subscription to a feed. (user_id, feed_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedFollow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub feed_id: Uuid,
}

impl FeedFollow {
    pub async fn create(user_id: Uuid, feed_id: Uuid, pool: &PgPool) -> Result<Self> {
        let follow = sqlx::query_as::<_, FeedFollow>(
            r#"
            INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
            VALUES ($1, now(), now(), $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(feed_id)
        .fetch_one(pool)
        .await?;

        Ok(follow)
    }

    pub async fn delete(user_id: Uuid, feed_id: Uuid, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id)
            .bind(feed_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// The feeds a user follows, oldest follow first.
    pub async fn feeds_for_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Feed>> {
        let feeds = sqlx::query_as::<_, Feed>(
            r#"
            SELECT feeds.* FROM feeds
            JOIN feed_follows ON feed_follows.feed_id = feeds.id
            WHERE feed_follows.user_id = $1
            ORDER BY feed_follows.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(feeds)
    }
}
