use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A subscribable RSS source.
///
/// `last_fetched_at` drives the scrape scheduler: a feed that has never
/// been fetched carries `None` and is selected before any feed with a
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feed {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Feed {
    pub async fn create(name: &str, url: &str, user_id: Uuid, pool: &PgPool) -> Result<Self> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
            VALUES ($1, now(), now(), $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(url)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(feed)
    }

    pub async fn find_by_url(url: &str, pool: &PgPool) -> Result<Option<Self>> {
        let feed = sqlx::query_as::<_, Feed>("SELECT * FROM feeds WHERE url = $1")
            .bind(url)
            .fetch_optional(pool)
            .await?;

        Ok(feed)
    }

    pub async fn all(pool: &PgPool) -> Result<Vec<Self>> {
        let feeds = sqlx::query_as::<_, Feed>("SELECT * FROM feeds ORDER BY created_at")
            .fetch_all(pool)
            .await?;

        Ok(feeds)
    }

    /// The next feeds due for scraping: least recently fetched first,
    /// never-fetched feeds ahead of everything, id as a deterministic
    /// tiebreak.
    pub async fn next_to_fetch(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let feeds = sqlx::query_as::<_, Feed>(
            r#"
            SELECT * FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(feeds)
    }

    pub async fn mark_fetched(id: Uuid, pool: &PgPool) -> Result<Self> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            UPDATE feeds
            SET last_fetched_at = now(), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(feed)
    }
}
