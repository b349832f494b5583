//! Inbound Ports (Driving Ports)
//!
//! The operator only ever asks "probably seen?" and "remember this"; any
//! structure with no false negatives can sit behind these traits.

use crate::domain::{AtomicBloomFilter, BloomFilter};

/// Approximate set membership with exclusive access
pub trait MembershipFilter {
    /// `false` means the element was definitely never inserted
    fn contains(&self, element: &[u8]) -> bool;

    /// Remember an element; `contains` returns `true` for it afterwards
    fn insert(&mut self, element: &[u8]);

    /// Insert and report whether the element was probably new
    fn check_and_insert(&mut self, element: &[u8]) -> bool {
        if self.contains(element) {
            return false;
        }
        self.insert(element);
        true
    }
}

/// Approximate set membership shared between worker threads
///
/// Each bit update must be atomic. `check_and_insert_shared` as a whole need
/// not be: racing callers with the same new element may all see `true`.
pub trait ConcurrentMembershipFilter: Sync {
    fn contains_shared(&self, element: &[u8]) -> bool;

    fn insert_shared(&self, element: &[u8]);

    fn check_and_insert_shared(&self, element: &[u8]) -> bool {
        if self.contains_shared(element) {
            return false;
        }
        self.insert_shared(element);
        true
    }
}

impl<F: MembershipFilter + ?Sized> MembershipFilter for &mut F {
    fn contains(&self, element: &[u8]) -> bool {
        (**self).contains(element)
    }

    fn insert(&mut self, element: &[u8]) {
        (**self).insert(element)
    }

    fn check_and_insert(&mut self, element: &[u8]) -> bool {
        (**self).check_and_insert(element)
    }
}

impl<F: ConcurrentMembershipFilter + ?Sized> ConcurrentMembershipFilter for &F {
    fn contains_shared(&self, element: &[u8]) -> bool {
        (**self).contains_shared(element)
    }

    fn insert_shared(&self, element: &[u8]) {
        (**self).insert_shared(element)
    }

    fn check_and_insert_shared(&self, element: &[u8]) -> bool {
        (**self).check_and_insert_shared(element)
    }
}

impl MembershipFilter for BloomFilter {
    fn contains(&self, element: &[u8]) -> bool {
        BloomFilter::contains(self, element)
    }

    fn insert(&mut self, element: &[u8]) {
        BloomFilter::insert(self, element)
    }

    fn check_and_insert(&mut self, element: &[u8]) -> bool {
        BloomFilter::check_and_insert(self, element)
    }
}

impl MembershipFilter for AtomicBloomFilter {
    fn contains(&self, element: &[u8]) -> bool {
        AtomicBloomFilter::contains(self, element)
    }

    fn insert(&mut self, element: &[u8]) {
        AtomicBloomFilter::insert(self, element)
    }

    fn check_and_insert(&mut self, element: &[u8]) -> bool {
        AtomicBloomFilter::check_and_insert(self, element)
    }
}

impl ConcurrentMembershipFilter for AtomicBloomFilter {
    fn contains_shared(&self, element: &[u8]) -> bool {
        AtomicBloomFilter::contains(self, element)
    }

    fn insert_shared(&self, element: &[u8]) {
        AtomicBloomFilter::insert(self, element)
    }

    fn check_and_insert_shared(&self, element: &[u8]) -> bool {
        AtomicBloomFilter::check_and_insert(self, element)
    }
}
