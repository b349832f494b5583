//! Ports Layer
//!
//! Defines the membership-test interfaces the deduplication operator is
//! generic over:
//! - `MembershipFilter` - exclusive (`&mut`) access, sequential passes
//! - `ConcurrentMembershipFilter` - shared (`&`) access, parallel passes

pub mod inbound;

pub use inbound::{ConcurrentMembershipFilter, MembershipFilter};
