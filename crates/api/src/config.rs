//! Process configuration from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use scenario_ai::ProviderConfig;
use scenario_infra::MAX_CONCURRENT_LIMIT;

pub const BIND_ADDR_VAR: &str = "SCENARIO_BIND_ADDR";
pub const MAX_CONCURRENT_JOBS_VAR: &str = "SCENARIO_MAX_CONCURRENT_JOBS";
pub const PROVIDER_ENDPOINT_VAR: &str = "SCENARIO_PROVIDER_ENDPOINT";
pub const PROVIDER_TIMEOUT_VAR: &str = "SCENARIO_PROVIDER_TIMEOUT_SECS";
pub const PROVIDER_TEMPERATURE_VAR: &str = "SCENARIO_PROVIDER_TEMPERATURE";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub max_concurrent_jobs: usize,
    pub provider: ProviderConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_concurrent_jobs: 4,
            provider: ProviderConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset values take the default; malformed
    /// values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_concurrent_jobs = match parsed(&lookup, MAX_CONCURRENT_JOBS_VAR, defaults.max_concurrent_jobs) {
            0 => {
                tracing::warn!("{MAX_CONCURRENT_JOBS_VAR} must be at least 1; using 1");
                1
            }
            n if n > MAX_CONCURRENT_LIMIT => {
                tracing::warn!("{MAX_CONCURRENT_JOBS_VAR} exceeds {MAX_CONCURRENT_LIMIT}; using {MAX_CONCURRENT_LIMIT}");
                MAX_CONCURRENT_LIMIT
            }
            n => n,
        };

        let temperature = parsed(&lookup, PROVIDER_TEMPERATURE_VAR, defaults.provider.temperature);
        let temperature = if temperature.is_finite() && temperature >= 0.0 {
            temperature
        } else {
            tracing::warn!("{PROVIDER_TEMPERATURE_VAR} must be a non-negative number; using default");
            defaults.provider.temperature
        };

        let timeout_secs = lookup(PROVIDER_TIMEOUT_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(secs),
            _ => {
                tracing::warn!(value = %raw, "{PROVIDER_TIMEOUT_VAR} is not a positive integer; no timeout");
                None
            }
        });

        Self {
            bind_addr: parsed(&lookup, BIND_ADDR_VAR, defaults.bind_addr),
            max_concurrent_jobs,
            provider: ProviderConfig {
                endpoint: lookup(PROVIDER_ENDPOINT_VAR)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .unwrap_or(defaults.provider.endpoint),
                timeout_secs,
                temperature,
            },
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match lookup(key) {
        None => {
            tracing::debug!("{key} not set; using default {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "{key} is malformed; using default {default}");
            default
        }),
    }
}
