//! Sequential Bloom filter
//!
//! INVARIANTS:
//! - No false negatives: if inserted, `contains()` MUST return true
//! - Bits are only ever set; nothing clears them

use bitvec::prelude::*;
use tracing::{debug, warn};

use super::config::DedupConfig;
use super::hash_functions::compute_hash_positions;
use super::parameters::{estimated_fpr, FilterParams};
use crate::error::FilterError;

/// Bloom filter for single-threaded deduplication passes
///
/// Mutation goes through `&mut self`; use
/// [`AtomicBloomFilter`](super::AtomicBloomFilter) when the filter is shared
/// between workers.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u64, Lsb0>,
    params: FilterParams,
    /// Number of insertions that set at least one new bit (n)
    n: usize,
    seed: u32,
}

/// Allocate `words` zeroed words, reporting failure instead of aborting
pub(crate) fn allocate_words<W>(
    words: usize,
    zero: impl FnMut() -> W,
) -> Result<Vec<W>, FilterError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(words)
        .map_err(|_| FilterError::AllocationFailed { words })?;
    storage.resize_with(words, zero);
    Ok(storage)
}

impl BloomFilter {
    /// Create a filter sized for `expected_items` at the target FPR
    pub fn with_capacity(
        expected_items: usize,
        false_positive_probability: f64,
    ) -> Result<Self, FilterError> {
        let params = FilterParams::for_capacity(expected_items, false_positive_probability)?;
        Self::from_params(params, 0)
    }

    /// Create a filter from a validated configuration
    pub fn from_config(config: &DedupConfig) -> Result<Self, FilterError> {
        Self::from_params(config.filter_params()?, config.hash_seed)
    }

    /// Create a filter with explicit sizing
    ///
    /// Rejects `size_bits == 0` and `hash_count` outside `1..=32`.
    pub fn from_params(params: FilterParams, seed: u32) -> Result<Self, FilterError> {
        params.validate()?;
        let mut bits = BitVec::from_vec(allocate_words(params.words(), || 0u64)?);
        bits.truncate(params.size_bits);

        debug!(
            size_bits = params.size_bits,
            hash_count = params.hash_count,
            expected_items = params.expected_items,
            expected_fpr = params.expected_fpr,
            "Bloom filter allocated"
        );

        Ok(Self {
            bits,
            params,
            n: 0,
            seed,
        })
    }

    /// Insert an element into the filter
    ///
    /// After insertion, `contains(element)` is guaranteed to return true.
    pub fn insert(&mut self, element: &[u8]) {
        self.check_and_insert(element);
    }

    /// Test if an element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set
    pub fn contains(&self, element: &[u8]) -> bool {
        compute_hash_positions(element, self.params.hash_count, self.params.size_bits, self.seed)
            .all(|pos| self.bits[pos])
    }

    /// Insert an element, reporting whether it was probably new
    ///
    /// Returns `true` if at least one of the element's bits was unset before
    /// the call. Equivalent to `!contains` followed by `insert`.
    pub fn check_and_insert(&mut self, element: &[u8]) -> bool {
        let mut newly_set = false;
        for pos in compute_hash_positions(
            element,
            self.params.hash_count,
            self.params.size_bits,
            self.seed,
        ) {
            newly_set |= !self.bits.replace(pos, true);
        }
        if newly_set {
            self.record_insertion();
        }
        newly_set
    }

    fn record_insertion(&mut self) {
        self.n += 1;
        if self.n == self.params.expected_items + 1 {
            warn!(
                expected_items = self.params.expected_items,
                size_bits = self.params.size_bits,
                "Bloom filter exceeded its expected capacity; false positive rate will degrade"
            );
        }
    }

    /// False positive rate at the current load
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn estimated_fpr(&self) -> f64 {
        estimated_fpr(self.params.size_bits, self.n, self.params.hash_count)
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.params.size_bits
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> usize {
        self.params.hash_count
    }

    /// Get the number of insertions that set at least one new bit
    ///
    /// Re-inserting a present element (or a false positive) is not counted.
    pub fn elements_inserted(&self) -> usize {
        self.n
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}
