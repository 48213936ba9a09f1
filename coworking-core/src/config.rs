//! Configuration types

use crate::{ConfigError, CoworkingResult};
use serde::{Deserialize, Serialize};

/// Entries held by each entity cache unless configured otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Shortest office booking, in inclusive days.
pub const DEFAULT_OFFICE_MIN_STAY_DAYS: u32 = 7;

/// Booking system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Maximum entries in each of the four entity caches.
    pub cache_capacity: usize,
    /// Minimum inclusive length of an `OFFICE` reservation.
    pub office_min_stay_days: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            office_min_stay_days: DEFAULT_OFFICE_MIN_STAY_DAYS,
        }
    }
}

impl BookingConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create BookingConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `COWORKING_CACHE_CAPACITY`: entries per entity cache (default: 100)
    /// - `COWORKING_OFFICE_MIN_STAY_DAYS`: minimum office stay in days (default: 7)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let cache_capacity = std::env::var("COWORKING_CACHE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_CAPACITY);

        let office_min_stay_days = std::env::var("COWORKING_OFFICE_MIN_STAY_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_OFFICE_MIN_STAY_DAYS);

        Self {
            cache_capacity,
            office_min_stay_days,
        }
    }

    /// Set the per-entity cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the minimum office stay.
    pub fn with_office_min_stay_days(mut self, days: u32) -> Self {
        self.office_min_stay_days = days;
        self
    }

    /// Validate the configuration.
    ///
    /// Both values must be positive.
    pub fn validate(&self) -> CoworkingResult<()> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity".to_string(),
                value: self.cache_capacity.to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.office_min_stay_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "office_min_stay_days".to_string(),
                value: self.office_min_stay_days.to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
