use anyhow::{bail, Result};
use sqlx::PgPool;

use aggregator_core::models::{Feed, FeedFollow, Post, User};
use aggregator_core::Config;

use super::current_user;

pub async fn add(pool: &PgPool, config: &Config, name: &str, url: &str) -> Result<()> {
    let user = current_user(pool, config).await?;

    if Feed::find_by_url(url, pool).await?.is_some() {
        bail!("A feed with url {url} already exists");
    }

    let feed = Feed::create(name, url, user.id, pool).await?;
    FeedFollow::create(user.id, feed.id, pool).await?;

    println!("Added and followed feed {} ({})", feed.name, feed.url);
    Ok(())
}

pub async fn list(pool: &PgPool) -> Result<()> {
    let feeds = Feed::all(pool).await?;

    for feed in feeds {
        let owner = User::find_by_id(feed.user_id, pool).await?;
        let owner_name = owner.map(|u| u.name).unwrap_or_else(|| "?".to_string());
        println!("{} {} ({})", feed.name, feed.url, owner_name);
    }

    Ok(())
}

pub async fn follow(pool: &PgPool, config: &Config, url: &str) -> Result<()> {
    let user = current_user(pool, config).await?;

    let Some(feed) = Feed::find_by_url(url, pool).await? else {
        bail!("No feed with url {url}");
    };

    let follow = FeedFollow::create(user.id, feed.id, pool).await?;

    println!("Followed feed {} | follow id {}", feed.name, follow.id);
    Ok(())
}

pub async fn following(pool: &PgPool, config: &Config) -> Result<()> {
    let user = current_user(pool, config).await?;

    let feeds = FeedFollow::feeds_for_user(user.id, pool).await?;
    if feeds.is_empty() {
        println!("User {} does not follow any feeds", user.name);
        return Ok(());
    }

    for feed in feeds {
        println!("{}", feed.name);
    }

    Ok(())
}

pub async fn unfollow(pool: &PgPool, config: &Config, url: &str) -> Result<()> {
    let user = current_user(pool, config).await?;

    let Some(feed) = Feed::find_by_url(url, pool).await? else {
        bail!("No feed with url {url}");
    };

    let deleted = FeedFollow::delete(user.id, feed.id, pool).await?;
    if deleted == 0 {
        bail!("You are not following {}", feed.name);
    }

    println!("Unfollowed feed {}", feed.name);
    Ok(())
}

pub async fn browse(pool: &PgPool, config: &Config, limit: i64) -> Result<()> {
    let user = current_user(pool, config).await?;

    let posts = Post::for_user(user.id, limit, pool).await?;
    for post in posts {
        println!("{} ({})", post.title, post.published_at.to_rfc2822());
        println!("  {}", post.url);
        if let Some(description) = post.description {
            println!("  {description}");
        }
    }

    Ok(())
}
