//! Command implementations

pub mod agg;
pub mod feeds;
pub mod users;

use anyhow::{Context, Result};
use sqlx::PgPool;

use aggregator_core::models::User;
use aggregator_core::Config;

/// The logged-in user, resolved from the config file. Commands that
/// need an identity call this first instead of wrapping handlers.
pub async fn current_user(pool: &PgPool, config: &Config) -> Result<User> {
    let name = config
        .current_user_name
        .as_deref()
        .context("Not logged in: run `aggregator login <name>` first")?;

    User::find_by_name(name, pool)
        .await?
        .with_context(|| format!("Logged-in user {name} no longer exists"))
}
