//! Configuration management

use anyhow::{self, Context, Result};

use crate::types::SchedulerSettings;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Pool size for the PostgreSQL connection pool
    pub db_max_connections: u32,

    /// Directory for the rotating log file
    pub logs_dir: String,

    /// Scheduler tuning
    pub scheduler: SchedulerSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "../logs".to_string());

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(10);

        let scheduler = scheduler_from(|key| std::env::var(key).ok())?;

        Ok(Self {
            nats_url,
            database_url,
            db_max_connections,
            logs_dir,
            scheduler,
        })
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, std::env::var(key).ok())
}

fn parse_value<T>(key: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {value}")),
        _ => Ok(None),
    }
}

/// Scheduler settings with `TIMELINE_*` overrides applied on top of the defaults
fn scheduler_from(lookup: impl Fn(&str) -> Option<String>) -> Result<SchedulerSettings> {
    let defaults = SchedulerSettings::default();
    let settings = SchedulerSettings {
        max_passes: parse_value("TIMELINE_MAX_PASSES", lookup("TIMELINE_MAX_PASSES"))?
            .unwrap_or(defaults.max_passes),
        max_wait_minutes: parse_value("TIMELINE_MAX_WAIT_MINUTES", lookup("TIMELINE_MAX_WAIT_MINUTES"))?
            .unwrap_or(defaults.max_wait_minutes),
        gap_fill_margin_minutes: parse_value(
            "TIMELINE_GAP_FILL_MARGIN_MINUTES",
            lookup("TIMELINE_GAP_FILL_MARGIN_MINUTES"),
        )?
        .unwrap_or(defaults.gap_fill_margin_minutes),
        scenic_source_limit: parse_value("TIMELINE_SCENIC_SOURCE_LIMIT", lookup("TIMELINE_SCENIC_SOURCE_LIMIT"))?
            .unwrap_or(defaults.scenic_source_limit),
    };

    if settings.max_passes == 0 {
        anyhow::bail!("TIMELINE_MAX_PASSES must be at least 1");
    }
    if settings.max_wait_minutes < 0 || settings.gap_fill_margin_minutes < 0 {
        anyhow::bail!("TIMELINE_MAX_WAIT_MINUTES and TIMELINE_GAP_FILL_MARGIN_MINUTES must not be negative");
    }

    Ok(settings)
}
