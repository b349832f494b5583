//! Error types for the deduplication subsystem

use thiserror::Error;

/// Errors raised while constructing a membership filter
///
/// Membership checks and insertions never fail; every variant here is
/// produced synchronously at construction or configuration time.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Filter size exceeds addressable memory: {bits} bits")]
    FilterTooLarge { bits: f64 },

    #[error("Failed to allocate bit array of {words} words")]
    AllocationFailed { words: usize },
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
