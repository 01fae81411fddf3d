use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub jobs: JobConfig,
}

/// Settings for the scheduled job runners.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub graphql_endpoint: String,
    pub heartbeat_log: PathBuf,
    pub low_stock_log: PathBuf,
    pub order_reminders_log: PathBuf,
    pub report_log: PathBuf,
    pub heartbeat_every: Duration,
    pub low_stock_every: Duration,
    pub order_reminders_every: Duration,
    pub report_every: Duration,
    pub reminder_lookback_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "APP_PORT", 8000)?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;

        let jobs = JobConfig::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            jobs,
        })
    }
}

impl JobConfig {
    /// Job settings alone; the runners never touch the database directly.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            graphql_endpoint: lookup("CRM_GRAPHQL_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8000/graphql".to_string()),
            heartbeat_log: path_or(&lookup, "CRM_HEARTBEAT_LOG", "/tmp/crm_heartbeat_log.txt"),
            low_stock_log: path_or(&lookup, "CRM_LOW_STOCK_LOG", "/tmp/low_stock_updates_log.txt"),
            order_reminders_log: path_or(
                &lookup,
                "CRM_ORDER_REMINDERS_LOG",
                "/tmp/order_reminders_log.txt",
            ),
            report_log: path_or(&lookup, "CRM_REPORT_LOG", "/tmp/crm_report_log.txt"),
            heartbeat_every: secs_or(&lookup, "CRM_HEARTBEAT_INTERVAL_SECS", 300)?,
            low_stock_every: secs_or(&lookup, "CRM_LOW_STOCK_INTERVAL_SECS", 12 * 60 * 60)?,
            order_reminders_every: secs_or(
                &lookup,
                "CRM_ORDER_REMINDERS_INTERVAL_SECS",
                24 * 60 * 60,
            )?,
            report_every: secs_or(&lookup, "CRM_REPORT_INTERVAL_SECS", 7 * 24 * 60 * 60)?,
            reminder_lookback_days: parse_or(&lookup, "CRM_REMINDER_LOOKBACK_DAYS", 7)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: u64) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, key, default)?;
    if secs == 0 {
        anyhow::bail!("{key} must be greater than 0");
    }
    Ok(Duration::from_secs(secs))
}

fn path_or<F>(lookup: &F, key: &str, default: &str) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or_else(|| PathBuf::from(default), PathBuf::from)
}
