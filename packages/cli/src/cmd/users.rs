use anyhow::{bail, Result};
use sqlx::PgPool;

use aggregator_core::models::User;
use aggregator_core::Config;

pub async fn register(pool: &PgPool, config: &mut Config, name: &str) -> Result<()> {
    if User::find_by_name(name, pool).await?.is_some() {
        bail!("User {name} already exists");
    }

    let user = User::create(name, pool).await?;
    config.set_user(&user.name)?;

    println!("User {} has been created", user.name);
    Ok(())
}

pub async fn login(pool: &PgPool, config: &mut Config, name: &str) -> Result<()> {
    let Some(user) = User::find_by_name(name, pool).await? else {
        bail!("User {name} does not exist");
    };

    config.set_user(&user.name)?;

    println!("User {} has been set", user.name);
    Ok(())
}

pub async fn list(pool: &PgPool, config: &Config) -> Result<()> {
    let users = User::all(pool).await?;

    for user in users {
        if config.current_user_name.as_deref() == Some(user.name.as_str()) {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }

    Ok(())
}

pub async fn reset(pool: &PgPool) -> Result<()> {
    let deleted = User::delete_all(pool).await?;

    println!("Deleted {deleted} users");
    Ok(())
}
