//! Environment-driven configuration. Every setting has a logged default.
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt};
use tracing::{info, warn};

use crate::domain::models::lottery::LotteryScope;
use crate::storage::connection::DATABASE_URL;
use crate::storage::PoolSettings;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub pool: PoolSettings,
    /// Local time offset of the tutoring site, in minutes east of UTC
    pub utc_offset_minutes: i32,
    pub desk_passcode: String,
    pub admin_secret: String,
    pub tardy_override_code: String,
    /// Names left out of the lucky draw
    pub lottery_exclusions: HashSet<String>,
    pub lottery_scope: LotteryScope,
    pub cors_origin: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let pool = PoolSettings {
            max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            acquire_timeout: Duration::from_secs(try_load("DB_ACQUIRE_TIMEOUT_SECS", "10")?),
            busy_timeout: Duration::from_millis(try_load("DB_BUSY_TIMEOUT_MS", "5000")?),
        };

        Ok(Self {
            port: try_load("PORT", "3000")?,
            database_url: try_load("DATABASE_URL", DATABASE_URL)?,
            pool,
            utc_offset_minutes: try_load("UTC_OFFSET_MINUTES", "540")?,
            desk_passcode: load_secret("DESK_PASSCODE", "0000"),
            admin_secret: load_secret("ADMIN_SECRET", "admin"),
            tardy_override_code: load_secret("TARDY_OVERRIDE_CODE", "admin"),
            lottery_exclusions: parse_names(&try_load::<String>("LOTTERY_EXCLUSIONS", "")?),
            lottery_scope: try_load("LOTTERY_SCOPE", "date")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:8080")?,
        })
    }
}

// Secrets stay out of the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("pool", &self.pool)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("lottery_exclusions", &self.lottery_exclusions)
            .field("lottery_scope", &self.lottery_scope)
            .field("cors_origin", &self.cors_origin)
            .finish_non_exhaustive()
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}

fn load_secret(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => {
            warn!("{key} not set, using the built-in default; set it in production");
            default.to_string()
        }
    }
}

fn parse_names(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
