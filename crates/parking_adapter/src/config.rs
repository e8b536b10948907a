#![forbid(unsafe_code)]

use std::env;
use std::net::SocketAddr;

use parking_os::ParkingServiceConfig;
use parking_storage::{RegistryConfig, SlotTableError, DEFAULT_SLOT_IDS};

pub const ENV_HTTP_BIND: &str = "PARKING_HTTP_BIND";
pub const ENV_SLOT_IDS: &str = "PARKING_SLOT_IDS";
pub const ENV_HISTORY_DEFAULT_LIMIT: &str = "PARKING_HISTORY_DEFAULT_LIMIT";
pub const ENV_HISTORY_MAX_ENTRIES: &str = "PARKING_HISTORY_MAX_ENTRIES";
pub const ENV_CORS_ORIGINS: &str = "PARKING_CORS_ORIGINS";

pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_CORS_ORIGINS: &str = "*";

#[derive(Debug, thiserror::Error)]
pub enum AdapterConfigError {
    #[error("PARKING_HTTP_BIND is not a socket address: {0}")]
    InvalidBind(#[from] std::net::AddrParseError),
    #[error(transparent)]
    InvalidSlotTable(#[from] SlotTableError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub bind: SocketAddr,
    pub registry: RegistryConfig,
    pub service: ParkingServiceConfig,
    pub cors_origins: String,
}

impl AdapterConfig {
    pub fn default_from_env() -> Result<Self, AdapterConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Out-of-range numbers fall back
    /// to their defaults; a bad bind address or slot table is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdapterConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind: SocketAddr = lookup(ENV_HTTP_BIND)
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
            .trim()
            .parse()?;

        let mut registry = match lookup(ENV_SLOT_IDS) {
            Some(raw) => RegistryConfig::with_slot_ids(
                raw.split(',').map(str::trim).filter(|s| !s.is_empty()),
            )?,
            None => RegistryConfig::with_slot_ids(DEFAULT_SLOT_IDS)?,
        };
        registry.history_max_entries =
            parse_bounded(lookup(ENV_HISTORY_MAX_ENTRIES), 1..=1_000_000);

        let history_default_limit = parse_bounded(lookup(ENV_HISTORY_DEFAULT_LIMIT), 1..=1_000)
            .unwrap_or(ParkingServiceConfig::mvp_v1().history_default_limit);

        let cors_origins = lookup(ENV_CORS_ORIGINS)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string());

        Ok(Self {
            bind,
            registry,
            service: ParkingServiceConfig {
                history_default_limit,
            },
            cors_origins,
        })
    }
}

fn parse_bounded(raw: Option<String>, range: std::ops::RangeInclusive<usize>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| range.contains(v))
}
