use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One article ingested from a feed. Immutable once created; the
/// (feed_id, url) pair is unique so re-ingesting the same item is
/// rejected by the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub feed_id: Uuid,
}

/// A normalized feed item ready to be written.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub feed_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl Post {
    /// Insert a post. Returns the raw sqlx error so callers can tell a
    /// unique-violation (duplicate item) apart from real failures.
    pub async fn create(new_post: &NewPost, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, created_at, updated_at, title, url, description, published_at, feed_id)
            VALUES ($1, now(), now(), $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_post.title)
        .bind(&new_post.url)
        .bind(&new_post.description)
        .bind(new_post.published_at)
        .bind(new_post.feed_id)
        .fetch_one(pool)
        .await
    }

    /// Posts from the feeds a user follows, newest first.
    pub async fn for_user(user_id: Uuid, limit: i64, pool: &PgPool) -> anyhow::Result<Vec<Self>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT posts.* FROM posts
            JOIN feed_follows ON feed_follows.feed_id = posts.feed_id
            WHERE feed_follows.user_id = $1
            ORDER BY posts.published_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }
}
