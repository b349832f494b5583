//! Service Layer
//!
//! The deduplication operator: a pull-check-insert pass over a record
//! sequence, sequential or rayon-parallel.

pub mod dedup;

pub use dedup::{
    dedupe, dedupe_with_config, dedupe_with_defaults, par_dedupe, par_dedupe_recorded, Dedup,
    DedupExt,
};
