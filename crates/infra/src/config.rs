//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be set when USE_PERSISTENT_STORES=true")]
    Missing { key: &'static str },

    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockroomConfig {
    pub bind_addr: SocketAddr,
    /// Set when `USE_PERSISTENT_STORES=true`.
    pub database_url: Option<String>,
    /// Time from placing a restock until it is considered delivered.
    pub arrival_delay: Duration,
    /// How often the arrival worker drains the scheduler and sweeps.
    pub sweep_interval: Duration,
    pub seed_demo_data: bool,
}

impl StockroomConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:8080";
    pub const DEFAULT_ARRIVAL_DELAY_SECS: u64 = 30;
    pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let persistent = parse_bool(&lookup, "USE_PERSISTENT_STORES", false)?;
        let database_url = if persistent {
            Some(lookup("DATABASE_URL").ok_or(ConfigError::Missing { key: "DATABASE_URL" })?)
        } else {
            None
        };

        let arrival_delay = parse_secs(&lookup, "ARRIVAL_DELAY_SECS", Self::DEFAULT_ARRIVAL_DELAY_SECS, false)?;
        let sweep_interval = parse_secs(
            &lookup,
            "ARRIVAL_SWEEP_INTERVAL_SECS",
            Self::DEFAULT_SWEEP_INTERVAL_SECS,
            true,
        )?;

        let seed_demo_data = parse_bool(&lookup, "SEED_DEMO_DATA", !persistent)?;

        Ok(Self {
            bind_addr,
            database_url,
            arrival_delay,
            sweep_interval,
            seed_demo_data,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.database_url.is_some()
    }

    /// Arrival delay as a chrono duration, for date arithmetic.
    pub fn lead_time(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.arrival_delay)
            .unwrap_or_else(|_| chrono::Duration::seconds(Self::DEFAULT_ARRIVAL_DELAY_SECS as i64))
    }
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            arrival_delay: Duration::from_secs(Self::DEFAULT_ARRIVAL_DELAY_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
            seed_demo_data: true,
        }
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}

fn parse_secs<F>(
    lookup: &F,
    key: &'static str,
    default: u64,
    require_positive: bool,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if require_positive && secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
