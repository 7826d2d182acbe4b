// Command-line entry point for the feed aggregator.

mod cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aggregator_core::Config;

#[derive(Parser)]
#[command(name = "aggregator", about = "A command-line RSS aggregator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a user and log in as them
    Register { name: String },
    /// Log in as an existing user
    Login { name: String },
    /// List all users
    Users,
    /// Delete all users (feeds and posts cascade)
    Reset,
    /// Add a feed owned by the current user and follow it
    Addfeed { name: String, url: String },
    /// List all feeds
    Feeds,
    /// Follow a feed by URL
    Follow { url: String },
    /// List the feeds the current user follows
    Following,
    /// Unfollow a feed by URL
    Unfollow { url: String },
    /// Show recent posts from followed feeds
    Browse {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
    /// Poll followed feeds forever, ingesting new posts
    Agg {
        /// Feeds fetched concurrently per tick
        #[arg(short, long, default_value_t = 15)]
        concurrency: usize,
        /// Seconds between ticks
        #[arg(short, long, default_value_t = 60)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::read().context("Failed to load configuration")?;
    let database_url = config.database_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    aggregator_core::run_migrations(&pool).await?;

    match cli.command {
        Command::Register { name } => cmd::users::register(&pool, &mut config, &name).await,
        Command::Login { name } => cmd::users::login(&pool, &mut config, &name).await,
        Command::Users => cmd::users::list(&pool, &config).await,
        Command::Reset => cmd::users::reset(&pool).await,
        Command::Addfeed { name, url } => cmd::feeds::add(&pool, &config, &name, &url).await,
        Command::Feeds => cmd::feeds::list(&pool).await,
        Command::Follow { url } => cmd::feeds::follow(&pool, &config, &url).await,
        Command::Following => cmd::feeds::following(&pool, &config).await,
        Command::Unfollow { url } => cmd::feeds::unfollow(&pool, &config, &url).await,
        Command::Browse { limit } => cmd::feeds::browse(&pool, &config, limit).await,
        Command::Agg {
            concurrency,
            interval,
        } => cmd::agg::run(&pool, concurrency, interval).await,
    }
}
