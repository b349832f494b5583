//! Domain Layer - Pure logic
//!
//! This layer contains:
//! - Parameter calculations (m, k, expected FPR)
//! - Hash functions (MurmurHash3 double hashing)
//! - Sequential Bloom filter
//! - Concurrent atomic-word Bloom filter
//! - Pass configuration
//! - Record key contract
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod atomic_bloom;
pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod parameters;
pub mod record_key;

pub use atomic_bloom::AtomicBloomFilter;
pub use bloom_filter::BloomFilter;
pub use config::{DedupConfig, DedupConfigBuilder};
pub use parameters::{estimated_fpr, optimal_bits, optimal_hash_count, FilterParams};
pub use record_key::{KeyBytes, RecordKey};
