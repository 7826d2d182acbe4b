//! On-disk CLI configuration.
//!
//! A small JSON file in the home directory holds the database URL and
//! the currently logged-in user. `DATABASE_URL` in the environment (or
//! a `.env` file) overrides the file's `db_url`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = ".aggregatorconfig.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db_url: String,
    #[serde(default)]
    pub current_user_name: Option<String>,
}

impl Config {
    /// Read the config file, or start empty if it does not exist yet.
    pub fn read() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    pub fn write(&self) -> Result<()> {
        let path = config_path()?;
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Record `name` as the logged-in user and persist the change.
    pub fn set_user(&mut self, name: &str) -> Result<()> {
        self.current_user_name = Some(name.to_string());
        self.write()
    }

    /// The database URL, with the environment taking precedence over
    /// the config file.
    pub fn database_url(&self) -> Result<String> {
        let _ = dotenvy::dotenv();

        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(url);
        }
        if !self.db_url.is_empty() {
            return Ok(self.db_url.clone());
        }

        anyhow::bail!("No database URL: set DATABASE_URL or db_url in the config file")
    }
}

fn config_path() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_through_json() {
        let config = Config {
            db_url: "postgres://localhost/aggregator".to_string(),
            current_user_name: Some("sam".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.db_url, config.db_url);
        assert_eq!(parsed.current_user_name, config.current_user_name);
    }

    #[test]
    fn missing_fields_default() {
        let parsed: Config = serde_json::from_str("{}").unwrap();

        assert!(parsed.db_url.is_empty());
        assert!(parsed.current_user_name.is_none());
    }
}
