//! Runtime configuration, read from `CHECKOUT_*` environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CHECKOUT_RESERVATION_TIMEOUT_MS` | `5000` | Max wait for the catalog to answer a reservation |
//! | `CHECKOUT_SEQUENCER_TIMEOUT_MS` | `5000` | Max wait for an invoice number |
//! | `CHECKOUT_TAX_RATE` | `0.08` | Sales tax applied on invoices |
//! | `CHECKOUT_MAILBOX_CAPACITY` | `32` | Channel capacity of every actor |
//! | `CHECKOUT_DATA_DIR` | unset | When set, state is kept in JSON files under this directory |

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
    pub reservation_timeout: Duration,
    pub sequencer_timeout: Duration,
    pub tax_rate: Decimal,
    pub mailbox_capacity: usize,
    pub data_dir: Option<PathBuf>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            reservation_timeout: Duration::from_millis(5000),
            sequencer_timeout: Duration::from_millis(5000),
            tax_rate: Decimal::new(8, 2),
            mailbox_capacity: 32,
            data_dir: None,
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reservation_timeout = parse::<u64, _>(&lookup, "CHECKOUT_RESERVATION_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.reservation_timeout);
        let sequencer_timeout = parse::<u64, _>(&lookup, "CHECKOUT_SEQUENCER_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.sequencer_timeout);
        let tax_rate = parse::<Decimal, _>(&lookup, "CHECKOUT_TAX_RATE")?.unwrap_or(defaults.tax_rate);
        let mailbox_capacity =
            parse::<usize, _>(&lookup, "CHECKOUT_MAILBOX_CAPACITY")?.unwrap_or(defaults.mailbox_capacity);
        let data_dir = lookup("CHECKOUT_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if tax_rate < Decimal::ZERO {
            return Err(invalid("CHECKOUT_TAX_RATE", tax_rate.to_string(), "must not be negative"));
        }
        if mailbox_capacity == 0 {
            return Err(invalid("CHECKOUT_MAILBOX_CAPACITY", "0".into(), "must be at least 1"));
        }

        Ok(Self {
            reservation_timeout,
            sequencer_timeout,
            tax_rate,
            mailbox_capacity,
            data_dir,
        })
    }
}

fn parse<T, L>(lookup: &L, key: &'static str) -> Result<Option<T>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, raw.clone(), e.to_string())),
    }
}

fn invalid(key: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = CheckoutConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CheckoutConfig::default());
        assert_eq!(config.tax_rate.to_string(), "0.08");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("CHECKOUT_RESERVATION_TIMEOUT_MS", "250"),
            ("CHECKOUT_TAX_RATE", "0.2"),
            ("CHECKOUT_MAILBOX_CAPACITY", "4"),
            ("CHECKOUT_DATA_DIR", "/var/lib/gallery"),
        ]))
        .unwrap();

        assert_eq!(config.reservation_timeout, Duration::from_millis(250));
        assert_eq!(config.sequencer_timeout, Duration::from_millis(5000));
        assert_eq!(config.tax_rate, Decimal::new(2, 1));
        assert_eq!(config.mailbox_capacity, 4);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/gallery")));
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_SEQUENCER_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CHECKOUT_SEQUENCER_TIMEOUT_MS", .. }));

        assert!(CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_MAILBOX_CAPACITY", "0")])).is_err());
        assert!(CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_TAX_RATE", "-1")])).is_err());
    }
}
