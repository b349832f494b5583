//! # Deduplication Behaviour Tests
//!
//! End-to-end checks of the deduplication operator through the public API.
//!
//! ## Test Categories
//!
//! 1. **Edge Cases** - empty input, single record, distinct records
//! 2. **Duplicate Runs** - first occurrence survives, order preserved
//! 3. **Scale** - many unique records interleaved with a long duplicate run,
//!    sequential and parallel
//! 4. **Properties** - proptest over arbitrary inputs

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bloom_dedup::{
    dedupe, dedupe_with_config, dedupe_with_defaults, par_dedupe_recorded, AtomicBloomFilter,
    BloomFilter, DedupConfig, DedupExt, DedupMetrics, FilterError, FilterParams, KeyBytes,
    RecordKey,
};
use proptest::prelude::*;
use rayon::prelude::*;
use tracing::debug;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Record identified by name and age; `serial` is not part of its key
#[derive(Clone, Debug, PartialEq)]
struct Person {
    name: String,
    age: u32,
    serial: u64,
}

impl Person {
    fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            serial: 0,
        }
    }

    fn with_serial(mut self, serial: u64) -> Self {
        self.serial = serial;
        self
    }
}

impl RecordKey for Person {
    fn key_bytes(&self) -> KeyBytes<'_> {
        let mut bytes = Vec::with_capacity(self.name.len() + 5);
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&self.age.to_le_bytes());
        KeyBytes::Owned(bytes)
    }
}

fn neo() -> Person {
    Person::new("Neo", 30)
}

fn oracle() -> Person {
    Person::new("Oracle", 0)
}

fn mr_smith() -> Person {
    Person::new("Mr Smith", 30)
}

fn matrix_person(no: u64) -> Person {
    Person::new(format!("Person No: {}", no), 30)
}

/// Filter roomy enough that false positives cannot occur in these tests
fn roomy_filter() -> BloomFilter {
    BloomFilter::with_capacity(100_000, 0.0001).expect("valid parameters")
}

// =============================================================================
// EDGE CASES
// =============================================================================

#[test]
fn test_empty_collection_contains_no_duplicates() {
    let out: Vec<Person> = dedupe(Vec::<Person>::new(), roomy_filter()).collect();
    assert!(out.is_empty());
}

#[test]
fn test_one_person_collection_remains_one_person() {
    let out: Vec<Person> = dedupe(vec![neo()], roomy_filter()).collect();
    assert_eq!(out, vec![neo()]);
}

#[test]
fn test_unique_people_remain_unchanged() {
    let out: Vec<Person> = dedupe(vec![neo(), oracle()], roomy_filter()).collect();
    assert_eq!(out, vec![neo(), oracle()]);
}

#[test]
fn test_invalid_parameters_are_rejected_at_construction() {
    assert!(matches!(
        BloomFilter::with_capacity(0, 0.0001),
        Err(FilterError::InvalidParameter { .. })
    ));
    assert!(matches!(
        AtomicBloomFilter::with_capacity(10, 0.0),
        Err(FilterError::InvalidParameter { .. })
    ));
    let config = DedupConfig::default().with_false_positive_probability(2.0);
    assert!(dedupe_with_config(vec![neo()], &config).is_err());
}

#[test]
fn test_hand_built_params_cannot_swallow_the_first_record() {
    let zero_hashes = FilterParams {
        size_bits: 1024,
        hash_count: 0,
        expected_items: 100,
        expected_fpr: 0.0,
    };
    assert!(BloomFilter::from_params(zero_hashes, 0).is_err());
    assert!(AtomicBloomFilter::from_params(zero_hashes, 0).is_err());

    let zero_bits = FilterParams {
        size_bits: 0,
        hash_count: 7,
        ..zero_hashes
    };
    assert!(BloomFilter::from_params(zero_bits, 0).is_err());
    assert!(AtomicBloomFilter::from_params(zero_bits, 0).is_err());

    let smallest = FilterParams {
        size_bits: 1,
        hash_count: 1,
        ..zero_hashes
    };
    let filter = BloomFilter::from_params(smallest, 0).expect("one bit, one hash is valid");
    let out: Vec<Person> = dedupe(vec![neo()], filter).collect();
    assert_eq!(out, vec![neo()]);
}

#[test]
fn test_pass_exposes_its_filter_mid_pass() {
    let mut pass = dedupe(vec![neo(), oracle()], roomy_filter());

    assert_eq!(pass.next(), Some(neo()));
    assert!(pass.membership_filter().contains(&neo().key_bytes()));
    assert!(!pass.membership_filter().contains(&oracle().key_bytes()));
    assert_eq!(pass.membership_filter().elements_inserted(), 1);
}

// =============================================================================
// DUPLICATE RUNS
// =============================================================================

#[test]
fn test_only_first_duplicate_remains() {
    let smiths = (0..20).map(|i| mr_smith().with_serial(i));

    let out: Vec<Person> = dedupe(smiths, roomy_filter()).collect();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].serial, 0, "The first Mr Smith must survive");
}

#[test]
fn test_unique_and_first_duplicate_remain() {
    let matrix = vec![neo(), oracle()]
        .into_iter()
        .chain((0..20).map(|i| mr_smith().with_serial(i)));

    let out: Vec<Person> = matrix.dedupe_with(roomy_filter()).collect();

    assert_eq!(out, vec![neo(), oracle(), mr_smith()]);
}

#[test]
fn test_duplicates_interleaved_with_unique_records_keep_first_positions() {
    let matrix = vec![
        mr_smith().with_serial(1),
        neo(),
        mr_smith().with_serial(2),
        oracle(),
        neo(),
        mr_smith().with_serial(3),
    ];

    let out: Vec<Person> = dedupe(matrix, roomy_filter()).collect();

    assert_eq!(out, vec![mr_smith().with_serial(1), neo(), oracle()]);
}

#[test]
fn test_default_entry_point_removes_duplicates() {
    init_tracing();

    let people = vec![neo(), mr_smith(), mr_smith(), oracle()];
    let out: Vec<Person> = dedupe_with_defaults(people)
        .expect("default sizing is valid")
        .collect();

    assert_eq!(out, vec![neo(), mr_smith(), oracle()]);
}

#[test]
fn test_contains_is_monotonic_across_a_pass() {
    let mut filter = roomy_filter();
    let people: Vec<Person> = (0..1_000).map(matrix_person).collect();

    let mut pass = dedupe(&people, &mut filter);
    let first = pass.next().expect("first record survives");
    assert_eq!(first, &people[0]);
    let _ = pass.count();

    for person in &people {
        assert!(
            filter.contains(&person.key_bytes()),
            "False negative for {}",
            person.name
        );
    }
}

// =============================================================================
// SCALE
// =============================================================================

const UNIQUE_PEOPLE: u64 = 100_000;
const MR_SMITHS: u64 = 150_000;

/// Neo, unique people, a long run of Mr Smiths, then Oracle
fn big_matrix() -> Vec<Person> {
    std::iter::once(neo())
        .chain((0..UNIQUE_PEOPLE).map(matrix_person))
        .chain((0..MR_SMITHS).map(|i| mr_smith().with_serial(i)))
        .chain(std::iter::once(oracle()))
        .collect()
}

fn scale_config() -> DedupConfig {
    DedupConfig::new(10_000_000, 0.0001).expect("valid parameters")
}

#[test]
fn test_big_overflow_of_duplicates_is_managed_sequentially() {
    init_tracing();

    let matrix = big_matrix();
    let whole = matrix.len() as u64;
    let metrics = DedupMetrics::new();
    let started = Instant::now();

    let out: Vec<Person> = dedupe_with_config(matrix, &scale_config())
        .expect("valid config")
        .with_metrics(&metrics)
        .collect();

    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        eliminated = whole - out.len() as u64,
        remaining = out.len(),
        whole,
        "Sequential pass finished"
    );

    assert_eq!(out.len() as u64, UNIQUE_PEOPLE + 3);
    assert_eq!(out[0], neo());
    assert_eq!(out[out.len() - 2], mr_smith(), "First Mr Smith keeps its place");
    assert_eq!(out[out.len() - 1], oracle());
    assert_eq!(metrics.snapshot().duplicates_dropped, MR_SMITHS - 1);
}

#[test]
fn test_big_overflow_of_duplicates_is_managed_in_parallel() {
    init_tracing();

    let config = scale_config();
    let filter = AtomicBloomFilter::from_config(&config).expect("valid config");
    let metrics = DedupMetrics::new();
    let processed = AtomicU64::new(0);

    let kept = par_dedupe_recorded(big_matrix(), &filter, &metrics)
        .map(|person| {
            let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if n % 10_000 == 0 {
                debug!(processed = n, "Processed records");
            }
            person
        })
        .filter(|person| person.name == "Mr Smith")
        .count() as u64;
    let total = processed.load(Ordering::Relaxed);

    let expected = UNIQUE_PEOPLE + 3;
    let tolerance = (expected as f64 * config.false_positive_probability).ceil() as u64;
    assert!(
        total + tolerance >= expected,
        "Lost too many unique records: {} < {}",
        total,
        expected
    );
    // Every surviving Mr Smith flipped at least one of his k bits
    assert!(kept >= 1 && kept as usize <= filter.hash_count(), "kept {} Mr Smiths", kept);
    assert!(total <= expected + filter.hash_count() as u64);
    assert_eq!(metrics.snapshot().records_seen, UNIQUE_PEOPLE + MR_SMITHS + 2);
}

#[test]
fn test_parallel_and_sequential_agree_on_distinct_records() {
    let config = DedupConfig::new(1_000_000, 0.0001).expect("valid parameters");
    let records: Vec<u64> = (0..50_000).collect();

    let sequential: HashSet<u64> = dedupe_with_config(records.clone(), &config)
        .expect("valid config")
        .collect();

    let filter = AtomicBloomFilter::from_config(&config).expect("valid config");
    let parallel: HashSet<u64> = bloom_dedup::par_dedupe(records, &filter).collect();

    assert_eq!(sequential, parallel);
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_output_never_longer_than_input(input in prop::collection::vec(any::<u16>(), 0..300)) {
        let out: Vec<u16> = dedupe(input.clone(), roomy_filter()).collect();
        prop_assert!(out.len() <= input.len());
    }

    #[test]
    fn prop_output_has_no_repeated_keys(input in prop::collection::vec(0u8..16, 0..300)) {
        let out: Vec<u8> = dedupe(input, roomy_filter()).collect();
        let unique: HashSet<u8> = out.iter().copied().collect();
        prop_assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn prop_keeps_first_occurrences_in_order(input in prop::collection::vec(0u32..64, 0..300)) {
        let mut seen = HashSet::new();
        let expected: Vec<u32> = input.iter().copied().filter(|x| seen.insert(*x)).collect();

        let out: Vec<u32> = dedupe(input, roomy_filter()).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_no_false_negatives(input in prop::collection::vec(".{0,24}", 0..100)) {
        let mut filter = roomy_filter();
        let _ = dedupe(&input, &mut filter).count();
        for s in &input {
            prop_assert!(filter.contains(s.as_bytes()));
        }
    }
}
