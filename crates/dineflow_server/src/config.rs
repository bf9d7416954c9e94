use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use dineflow_core::{Money, PricingPolicy};
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_PORT: &str = "8080";
const DEFAULT_DB_PATH: &str = "dineflow.sqlite3";

#[derive(Error, Debug)]
#[error("Invalid {key} value `{value}`: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub pricing: PricingPolicy,
}

impl Config {
    /// Reads `DINEFLOW_*` variables; unset ones fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = PricingPolicy::default();
        let delivery_fee: i64 = try_load(
            "DINEFLOW_DELIVERY_FEE",
            &defaults.delivery_fee.cents().to_string(),
        )?;
        if delivery_fee < 0 {
            return Err(ConfigError {
                key: "DINEFLOW_DELIVERY_FEE",
                value: delivery_fee.to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            port: try_load("DINEFLOW_PORT", DEFAULT_PORT)?,
            db_path: try_load("DINEFLOW_DB_PATH", DEFAULT_DB_PATH)?,
            pricing: PricingPolicy {
                tax_rate_bps: try_load("DINEFLOW_TAX_BPS", &defaults.tax_rate_bps.to_string())?,
                delivery_fee: Money::from_cents(delivery_fee),
            },
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
            value: raw.clone(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::try_load;

    #[test]
    fn unset_variable_uses_default() {
        let port: u16 = try_load("DINEFLOW_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn malformed_default_is_reported_with_key() {
        let err = try_load::<u16>("DINEFLOW_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert_eq!(err.key, "DINEFLOW_TEST_UNSET_PORT");
        assert_eq!(err.value, "not-a-port");
    }
}
