//! Deduplication operator
//!
//! For each incoming record the filter is asked whether the record was
//! probably seen. Probably-new records are inserted and forwarded;
//! probably-seen records are dropped. One linear pass, no buffering.
//!
//! Sequential passes keep exactly the first occurrence of every record (up to
//! filter false positives). Parallel passes follow the relaxed contract of
//! [`ConcurrentMembershipFilter`]: racing duplicates may both survive.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{BloomFilter, DedupConfig, RecordKey};
use crate::error::FilterError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{ConcurrentMembershipFilter, MembershipFilter};

/// Lazy iterator adapter that drops probable duplicates
///
/// Not restartable: every record it pulls is recorded in the filter.
/// Created by [`dedupe`] or [`DedupExt::dedupe_with`].
#[derive(Debug)]
pub struct Dedup<I, F, M = NoOpMetrics> {
    inner: I,
    filter: F,
    metrics: M,
    seen: u64,
    emitted: u64,
    finished: bool,
}

impl<I, F> Dedup<I, F> {
    pub fn new(inner: I, filter: F) -> Self {
        Self {
            inner,
            filter,
            metrics: NoOpMetrics,
            seen: 0,
            emitted: 0,
            finished: false,
        }
    }
}

impl<I, F, M> Dedup<I, F, M> {
    /// Report every examined record to `metrics`
    pub fn with_metrics<R: MetricsRecorder>(self, metrics: R) -> Dedup<I, F, R> {
        Dedup {
            inner: self.inner,
            filter: self.filter,
            metrics,
            seen: self.seen,
            emitted: self.emitted,
            finished: self.finished,
        }
    }

    /// The filter holding this pass's "seen" state
    pub fn membership_filter(&self) -> &F {
        &self.filter
    }

    /// Stop the pass and hand the filter back for reuse
    pub fn into_filter(self) -> F {
        self.filter
    }

    /// Records pulled from the input so far
    pub fn records_seen(&self) -> u64 {
        self.seen
    }

    /// Records forwarded so far
    pub fn records_emitted(&self) -> u64 {
        self.emitted
    }
}

impl<I, F, M> Iterator for Dedup<I, F, M>
where
    I: Iterator,
    I::Item: RecordKey,
    F: MembershipFilter,
    M: MetricsRecorder,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        for record in self.inner.by_ref() {
            self.seen += 1;
            let is_new = self.filter.check_and_insert(&record.key_bytes());
            self.metrics.record_outcome(is_new);
            if is_new {
                self.emitted += 1;
                return Some(record);
            }
        }

        if !self.finished {
            self.finished = true;
            debug!(
                records_seen = self.seen,
                records_emitted = self.emitted,
                duplicates_dropped = self.seen - self.emitted,
                "Deduplication pass complete"
            );
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Any record may turn out to be a duplicate
        (0, self.inner.size_hint().1)
    }
}

/// Drop probable duplicates from `records` using `filter`
///
/// Pass `&mut filter` to keep the filter after the pass, or an owned filter
/// and recover it with [`Dedup::into_filter`].
pub fn dedupe<I, F>(records: I, filter: F) -> Dedup<I::IntoIter, F>
where
    I: IntoIterator,
    I::Item: RecordKey,
    F: MembershipFilter,
{
    Dedup::new(records.into_iter(), filter)
}

/// Drop probable duplicates using a filter sized from `config`
pub fn dedupe_with_config<I>(
    records: I,
    config: &DedupConfig,
) -> Result<Dedup<I::IntoIter, BloomFilter>, FilterError>
where
    I: IntoIterator,
    I::Item: RecordKey,
{
    let filter = BloomFilter::from_config(config)?;
    Ok(dedupe(records, filter))
}

/// Drop probable duplicates using the default sizing
///
/// Sized for 10^8 records at a false positive probability of 0.0001, which
/// allocates roughly 240 MB. Prefer [`dedupe_with_config`] when the input
/// size is known.
pub fn dedupe_with_defaults<I>(records: I) -> Result<Dedup<I::IntoIter, BloomFilter>, FilterError>
where
    I: IntoIterator,
    I::Item: RecordKey,
{
    dedupe_with_config(records, &DedupConfig::default())
}

/// Iterator extension for [`Dedup`]
pub trait DedupExt: Iterator + Sized {
    /// Drop probable duplicates using `filter`
    fn dedupe_with<F>(self, filter: F) -> Dedup<Self, F>
    where
        Self::Item: RecordKey,
        F: MembershipFilter,
    {
        Dedup::new(self, filter)
    }
}

impl<I: Iterator> DedupExt for I {}

/// Drop probable duplicates from a parallel, unordered traversal
///
/// All workers share `filter` by reference for the whole pass. Output order
/// follows rayon's semantics for the input; under races more than one copy
/// of a duplicated record may survive.
pub fn par_dedupe<'a, P, F>(
    records: P,
    filter: &'a F,
) -> impl ParallelIterator<Item = P::Item> + 'a
where
    P: IntoParallelIterator + 'a,
    P::Iter: 'a,
    P::Item: RecordKey,
    F: ConcurrentMembershipFilter,
{
    par_dedupe_recorded(records, filter, NoOpMetrics)
}

/// [`par_dedupe`] reporting every examined record to `metrics`
pub fn par_dedupe_recorded<'a, P, F, M>(
    records: P,
    filter: &'a F,
    metrics: M,
) -> impl ParallelIterator<Item = P::Item> + 'a
where
    P: IntoParallelIterator + 'a,
    P::Iter: 'a,
    P::Item: RecordKey,
    F: ConcurrentMembershipFilter,
    M: MetricsRecorder + 'a,
{
    records.into_par_iter().filter(move |record| {
        let is_new = filter.check_and_insert_shared(&record.key_bytes());
        metrics.record_outcome(is_new);
        is_new
    })
}
