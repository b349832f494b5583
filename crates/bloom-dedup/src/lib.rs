//! # bloom-dedup
//!
//! Approximate duplicate elimination for very large record sequences.
//!
//! An exact "seen" set for hundreds of millions of records does not fit in
//! memory. This crate replaces it with a Bloom filter: constant memory per
//! pass, O(k) per record, no false negatives, and a small tunable chance of
//! dropping a record that was never seen before.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BloomFilter`: sequential filter over a bit vector
//!   - `AtomicBloomFilter`: filter shared by parallel workers
//!   - `FilterParams`: optimal sizing (m, k) from capacity and target FPR
//!   - `DedupConfig` / `DedupConfigBuilder`: validated pass configuration
//!   - `RecordKey`: stable byte representation of a record
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`: exclusive-access filter
//!   - `ConcurrentMembershipFilter`: shared-access filter
//!
//! - **Service Layer** (`service/`): The deduplication operator
//!   - `Dedup`: lazy iterator adapter
//!   - `par_dedupe`: rayon parallel pass
//!
//! ## Invariants
//!
//! - No false negatives: once inserted, `contains()` returns true for the
//!   lifetime of the filter
//! - Bits are never cleared; filters never resize
//! - Sequential passes keep the first occurrence of each record, in order
//!
//! ## Usage Example
//!
//! ```
//! use bloom_dedup::{dedupe, BloomFilter};
//!
//! let filter = BloomFilter::with_capacity(1_000, 0.0001)?;
//! let people = vec!["Neo", "Oracle", "Mr Smith", "Mr Smith", "Mr Smith"];
//!
//! let unique: Vec<_> = dedupe(people, filter).collect();
//! assert_eq!(unique, vec!["Neo", "Oracle", "Mr Smith"]);
//! # Ok::<(), bloom_dedup::FilterError>(())
//! ```
//!
//! ## Parallel Passes
//!
//! ```
//! use bloom_dedup::{par_dedupe, AtomicBloomFilter};
//! use rayon::prelude::*;
//!
//! let filter = AtomicBloomFilter::with_capacity(10_000, 0.0001)?;
//! let records: Vec<u64> = (0..5_000).chain(0..5_000).collect();
//!
//! let kept = par_dedupe(records, &filter).count();
//! assert!(kept >= 4_990);
//! # Ok::<(), bloom_dedup::FilterError>(())
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use domain::{
    AtomicBloomFilter, BloomFilter, DedupConfig, DedupConfigBuilder, FilterParams, KeyBytes,
    RecordKey,
};
pub use error::FilterError;
pub use metrics::{DedupMetrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{ConcurrentMembershipFilter, MembershipFilter};
pub use service::{
    dedupe, dedupe_with_config, dedupe_with_defaults, par_dedupe, par_dedupe_recorded, Dedup,
    DedupExt,
};
