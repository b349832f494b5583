//! Hash functions for the membership filters
//!
//! Uses MurmurHash3 (x64, 128-bit) and derives the k probe positions by
//! double hashing: `position_i = (h1 + i * h2) mod m`.

use std::io::Cursor;

/// Hash an element with MurmurHash3 x64/128 and split the digest
///
/// Returns `(h1, h2)` where `h1` is the low half and `h2` the high half.
/// `h2` is forced odd so consecutive probes never collapse onto `h1`.
pub fn murmur_hash_pair(element: &[u8], seed: u32) -> (u64, u64) {
    let mut cursor = Cursor::new(element);

    // Reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    let h1 = hash as u64;
    let h2 = (hash >> 64) as u64 | 1;
    (h1, h2)
}

/// Iterator over the k bit positions of one element
///
/// Allocation-free so the hot path of `contains`/`insert` stays on the stack.
#[derive(Clone, Debug)]
pub struct HashPositions {
    h1: u64,
    h2: u64,
    m: u64,
    i: u64,
    k: u64,
}

impl HashPositions {
    pub fn new(element: &[u8], k: usize, m: usize, seed: u32) -> Self {
        let (h1, h2) = murmur_hash_pair(element, seed);
        Self {
            h1,
            h2,
            m: m as u64,
            i: 0,
            k: k as u64,
        }
    }
}

impl Iterator for HashPositions {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.i >= self.k {
            return None;
        }
        let hash = self.h1.wrapping_add(self.i.wrapping_mul(self.h2));
        self.i += 1;
        Some((hash % self.m) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k - self.i) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HashPositions {}

/// Compute k hash positions for an element
pub fn compute_hash_positions(element: &[u8], k: usize, m: usize, seed: u32) -> HashPositions {
    HashPositions::new(element, k, m, seed)
}
