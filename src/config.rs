use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::date_utils::offset_from_minutes;
use crate::error::{AlmanacError, Result};

// Fixed lunar constants; the phase thresholds assume this month length.

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53059;
/// Reference new moon, 2000-01-06T12:24:00Z, as unix milliseconds.
pub const REFERENCE_NEW_MOON_MS: i64 = 947_161_440_000;
/// Approximate Lahiri ayanamsa in degrees.
pub const AYANAMSA_DEGREES: f64 = 24.0;
pub const DEFAULT_CACHE_CAPACITY: usize = 366;
pub const DEFAULT_LOG_FILTER: &str = "info";

const ENV_UTC_OFFSET: &str = "LUNAR_ALMANAC_UTC_OFFSET_MINUTES";
const ENV_CACHE_CAPACITY: &str = "LUNAR_ALMANAC_CACHE_CAPACITY";
const ENV_LOG: &str = "LUNAR_ALMANAC_LOG";

// Runtime configuration for the almanac
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Civil dates are evaluated at local midnight in this offset.
    pub utc_offset_minutes: i32,
    pub cache_capacity: NonZeroUsize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `LUNAR_ALMANAC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_UTC_OFFSET) {
            let minutes: i32 = parse_value(ENV_UTC_OFFSET, &raw)?;
            offset_from_minutes(minutes)?;
            config.utc_offset_minutes = minutes;
        }

        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            let capacity: usize = parse_value(ENV_CACHE_CAPACITY, &raw)?;
            config.cache_capacity =
                NonZeroUsize::new(capacity).ok_or_else(|| invalid(ENV_CACHE_CAPACITY, &raw))?;
        }

        if let Some(raw) = lookup(ENV_LOG) {
            if !raw.trim().is_empty() {
                config.log_filter = raw.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self> {
        offset_from_minutes(minutes)?;
        self.utc_offset_minutes = minutes;
        Ok(self)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

fn invalid(key: &'static str, raw: &str) -> AlmanacError {
    AlmanacError::InvalidConfig {
        key,
        value: raw.to_string(),
    }
}
