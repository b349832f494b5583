//! Concurrent Bloom filter backed by atomic words
//!
//! Every bit update is a single `fetch_or`, so concurrent inserts never lose
//! bits. A record's check-then-insert is NOT atomic across its k positions:
//! two workers racing on the same new record may both observe it as new.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use super::bloom_filter::allocate_words;
use super::config::DedupConfig;
use super::hash_functions::compute_hash_positions;
use super::parameters::{estimated_fpr, FilterParams};
use crate::error::FilterError;

/// Bloom filter that can be shared by reference across worker threads
#[derive(Debug)]
pub struct AtomicBloomFilter {
    words: Box<[AtomicU64]>,
    params: FilterParams,
    n: AtomicU64,
    seed: u32,
}

#[inline]
fn split(pos: usize) -> (usize, u64) {
    (pos >> 6, 1u64 << (pos & 63))
}

impl AtomicBloomFilter {
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
        let words = allocate_words(params.words(), || AtomicU64::new(0))?.into_boxed_slice();

        debug!(
            size_bits = params.size_bits,
            hash_count = params.hash_count,
            expected_items = params.expected_items,
            expected_fpr = params.expected_fpr,
            "Atomic bloom filter allocated"
        );

        Ok(Self {
            words,
            params,
            n: AtomicU64::new(0),
            seed,
        })
    }

    /// Insert an element; safe to call from many threads at once
    pub fn insert(&self, element: &[u8]) {
        self.check_and_insert(element);
    }

    /// Test if an element might be in the filter
    ///
    /// Never returns `false` for an element whose `insert` has completed.
    pub fn contains(&self, element: &[u8]) -> bool {
        compute_hash_positions(element, self.params.hash_count, self.params.size_bits, self.seed)
            .all(|pos| {
                let (word, mask) = split(pos);
                self.words[word].load(Ordering::Relaxed) & mask != 0
            })
    }

    /// Insert an element, reporting whether this call set any new bit
    ///
    /// Sequentially this is identical to `!contains` followed by `insert`.
    /// Under concurrency, of several threads inserting the same new element
    /// at least one observes `true`; more than one may.
    pub fn check_and_insert(&self, element: &[u8]) -> bool {
        let mut newly_set = false;
        for pos in compute_hash_positions(
            element,
            self.params.hash_count,
            self.params.size_bits,
            self.seed,
        ) {
            let (word, mask) = split(pos);
            let previous = self.words[word].fetch_or(mask, Ordering::Relaxed);
            newly_set |= previous & mask == 0;
        }
        if newly_set {
            self.record_insertion();
        }
        newly_set
    }

    fn record_insertion(&self) {
        let previous = self.n.fetch_add(1, Ordering::Relaxed);
        if previous == self.params.expected_items as u64 {
            warn!(
                expected_items = self.params.expected_items,
                size_bits = self.params.size_bits,
                "Atomic bloom filter exceeded its expected capacity; false positive rate will degrade"
            );
        }
    }

    /// False positive rate at the current load
    pub fn estimated_fpr(&self) -> f64 {
        estimated_fpr(
            self.params.size_bits,
            self.elements_inserted(),
            self.params.hash_count,
        )
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    pub fn size_bits(&self) -> usize {
        self.params.size_bits
    }

    pub fn hash_count(&self) -> usize {
        self.params.hash_count
    }

    /// Number of insertions that set at least one new bit
    pub fn elements_inserted(&self) -> usize {
        self.n.load(Ordering::Relaxed) as usize
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}
