//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- optimal bits
//! - k = round((m/n) * ln(2))        -- optimal hash functions
//! - FPR = (1 - e^(-kn/m))^k         -- expected false positive rate
//!
//! When k would exceed [`MAX_HASH_FUNCTIONS`], k is capped and m is grown
//! instead: m = ceil(-k*n / ln(1 - p^(1/k))), the smallest m meeting p.

use std::f64::consts::LN_2;

use crate::error::FilterError;

/// Upper bound on the number of hash functions.
pub const MAX_HASH_FUNCTIONS: usize = 32;

/// Sizing of a Bloom filter derived from capacity and target FPR
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Expected number of elements the filter was sized for (n)
    pub expected_items: usize,
    /// Expected false positive rate once `expected_items` are inserted
    pub expected_fpr: f64,
}

impl FilterParams {
    /// Calculate optimal parameters for `expected_items` at the target FPR.
    ///
    /// Fails with `InvalidParameter` if `expected_items == 0` or the
    /// probability is outside the open interval (0, 1).
    pub fn for_capacity(
        expected_items: usize,
        false_positive_probability: f64,
    ) -> Result<Self, FilterError> {
        validate_expected_items(expected_items)?;
        validate_probability(false_positive_probability)?;

        let raw_bits = raw_optimal_bits(expected_items, false_positive_probability);
        if !raw_bits.is_finite() || raw_bits > usize::MAX as f64 {
            return Err(FilterError::FilterTooLarge { bits: raw_bits });
        }

        let mut size_bits = (raw_bits as usize).max(1);
        let mut hash_count = optimal_hash_count(size_bits, expected_items);

        if hash_count > MAX_HASH_FUNCTIONS {
            hash_count = MAX_HASH_FUNCTIONS;
            let capped_bits =
                bits_for_hash_count(expected_items, false_positive_probability, hash_count);
            if !capped_bits.is_finite() || capped_bits > usize::MAX as f64 {
                return Err(FilterError::FilterTooLarge { bits: capped_bits });
            }
            size_bits = size_bits.max(capped_bits as usize);
        }

        Ok(Self {
            size_bits,
            hash_count,
            expected_items,
            expected_fpr: estimated_fpr(size_bits, expected_items, hash_count),
        })
    }

    /// Check that hand-built parameters describe a usable filter
    ///
    /// Requires `size_bits >= 1` and `1 <= hash_count <= MAX_HASH_FUNCTIONS`.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.size_bits == 0 {
            return Err(FilterError::invalid("size_bits", "must be greater than 0"));
        }
        if self.hash_count == 0 || self.hash_count > MAX_HASH_FUNCTIONS {
            return Err(FilterError::invalid(
                "hash_count",
                format!(
                    "{} is outside 1..={}",
                    self.hash_count, MAX_HASH_FUNCTIONS
                ),
            ));
        }
        Ok(())
    }

    /// Size of the bit array in 64-bit words
    pub fn words(&self) -> usize {
        self.size_bits.div_ceil(64)
    }
}

pub(crate) fn validate_expected_items(expected_items: usize) -> Result<(), FilterError> {
    if expected_items == 0 {
        return Err(FilterError::invalid(
            "expected_items",
            "must be greater than 0",
        ));
    }
    Ok(())
}

pub(crate) fn validate_probability(p: f64) -> Result<(), FilterError> {
    if p.is_nan() || p <= 0.0 || p >= 1.0 {
        return Err(FilterError::invalid(
            "false_positive_probability",
            format!("{p} is outside the open interval (0, 1)"),
        ));
    }
    Ok(())
}

fn raw_optimal_bits(n: usize, p: f64) -> f64 {
    (-(n as f64) * p.ln() / (LN_2 * LN_2)).ceil()
}

/// Bits needed to hit `p` for `n` items with exactly `k` hash functions
fn bits_for_hash_count(n: usize, p: f64, k: usize) -> f64 {
    let per_hash = p.powf(1.0 / k as f64);
    (-(k as f64) * n as f64 / (-per_hash).ln_1p()).ceil()
}

/// Minimum number of bits for `n` items at false positive rate `p`
///
/// Saturates at `usize::MAX`; use [`FilterParams::for_capacity`] for a
/// checked computation.
pub fn optimal_bits(n: usize, p: f64) -> usize {
    raw_optimal_bits(n, p) as usize
}

/// Optimal number of hash functions for `m` bits and `n` items
///
/// Never less than 1. Not capped; [`FilterParams::for_capacity`] applies
/// [`MAX_HASH_FUNCTIONS`].
pub fn optimal_hash_count(m: usize, n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let k = ((m as f64 / n as f64) * LN_2).round() as usize;
    k.max(1)
}

/// False positive rate for `m` bits, `n` inserted items and `k` hashes
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn estimated_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
