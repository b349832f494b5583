//! Deduplication pass configuration and validation
//!
//! # Example
//!
//! ```
//! use bloom_dedup::DedupConfigBuilder;
//!
//! let config = DedupConfigBuilder::new()
//!     .expected_items(1_000_000)
//!     .false_positive_probability(0.001)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.expected_items, 1_000_000);
//! ```

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parameters::{validate_expected_items, validate_probability, FilterParams};
use crate::error::FilterError;

/// Expected item count used when the caller has no estimate
pub const DEFAULT_EXPECTED_ITEMS: usize = 100_000_000;

/// One accidental drop in ten thousand
pub const DEFAULT_FALSE_POSITIVE_PROBABILITY: f64 = 0.0001;

pub const ENV_EXPECTED_ITEMS: &str = "BLOOM_DEDUP_EXPECTED_ITEMS";
pub const ENV_FALSE_POSITIVE_PROBABILITY: &str = "BLOOM_DEDUP_FALSE_POSITIVE_PROBABILITY";
pub const ENV_HASH_SEED: &str = "BLOOM_DEDUP_HASH_SEED";

/// Sizing of the membership filter for one deduplication pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Capacity the filter is sized for (n)
    pub expected_items: usize,
    /// Target false positive probability at capacity, in (0, 1)
    pub false_positive_probability: f64,
    /// Seed mixed into the hash functions
    pub hash_seed: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            expected_items: DEFAULT_EXPECTED_ITEMS,
            false_positive_probability: DEFAULT_FALSE_POSITIVE_PROBABILITY,
            hash_seed: 0,
        }
    }
}

impl DedupConfig {
    /// Create a new configuration with validation
    pub fn new(
        expected_items: usize,
        false_positive_probability: f64,
    ) -> Result<Self, FilterError> {
        let config = Self {
            expected_items,
            false_positive_probability,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `BLOOM_DEDUP_EXPECTED_ITEMS`: expected item count (default: 100000000)
    /// - `BLOOM_DEDUP_FALSE_POSITIVE_PROBABILITY`: target FPR (default: 0.0001)
    /// - `BLOOM_DEDUP_HASH_SEED`: hash seed (default: 0)
    ///
    /// Unset variables fall back to defaults; unparsable ones are rejected.
    pub fn from_env() -> Result<Self, FilterError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FilterError> {
        let defaults = Self::default();
        let config = Self {
            expected_items: parse_var::<usize>(&lookup, ENV_EXPECTED_ITEMS, "expected_items")?
                .unwrap_or(defaults.expected_items),
            false_positive_probability: parse_var::<f64>(
                &lookup,
                ENV_FALSE_POSITIVE_PROBABILITY,
                "false_positive_probability",
            )?
            .unwrap_or(defaults.false_positive_probability),
            hash_seed: parse_var::<u32>(&lookup, ENV_HASH_SEED, "hash_seed")?
                .unwrap_or(defaults.hash_seed),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate sizing parameters
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_expected_items(self.expected_items)?;
        validate_probability(self.false_positive_probability)?;
        Ok(())
    }

    /// Derive the filter sizing (m, k) for this configuration
    pub fn filter_params(&self) -> Result<FilterParams, FilterError> {
        FilterParams::for_capacity(self.expected_items, self.false_positive_probability)
    }

    /// Builder-style method to set expected items
    pub fn with_expected_items(mut self, expected_items: usize) -> Self {
        self.expected_items = expected_items;
        self
    }

    /// Builder-style method to set target FPR
    pub fn with_false_positive_probability(mut self, p: f64) -> Self {
        self.false_positive_probability = p;
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    name: &'static str,
) -> Result<Option<T>, FilterError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| FilterError::invalid(name, format!("{key}={raw:?}: {e}"))),
    }
}

/// Builder for DedupConfig with validation
///
/// Unset fields fall back to [`DedupConfig::default`].
#[derive(Default)]
pub struct DedupConfigBuilder {
    expected_items: Option<usize>,
    false_positive_probability: Option<f64>,
    hash_seed: Option<u32>,
}

impl DedupConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity the filter is sized for
    pub fn expected_items(mut self, expected_items: usize) -> Self {
        self.expected_items = Some(expected_items);
        self
    }

    /// Set the target false positive probability (must be in (0, 1))
    pub fn false_positive_probability(mut self, p: f64) -> Self {
        self.false_positive_probability = Some(p);
        self
    }

    pub fn hash_seed(mut self, seed: u32) -> Self {
        self.hash_seed = Some(seed);
        self
    }

    /// Build the DedupConfig, validating all parameters
    pub fn build(self) -> Result<DedupConfig, FilterError> {
        let defaults = DedupConfig::default();

        let config = DedupConfig {
            expected_items: self.expected_items.unwrap_or(defaults.expected_items),
            false_positive_probability: self
                .false_positive_probability
                .unwrap_or(defaults.false_positive_probability),
            hash_seed: self.hash_seed.unwrap_or(defaults.hash_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
