//! Property-based tests for histogram population, serialization, and
//! estimation
//!
//! These exercise the invariants a query optimizer relies on: serialized
//! histograms round-trip byte-exactly, cumulative estimates are monotone,
//! every inserted value is accounted for, and merging is associative.

use std::sync::Arc;

use optstats_core::ValueType;
use optstats_histogram::{EqWidthHistogram, EqWidthHistogramEstimator};
use proptest::prelude::*;

fn populated_i64_histogram(
    num_buckets: usize,
    range_start: i64,
    span: i64,
    values: &[i64],
) -> EqWidthHistogram {
    let mut hist = EqWidthHistogram::new(num_buckets, ValueType::Int64).unwrap();
    hist.initialize_buckets(range_start, range_start + span).unwrap();
    for &v in values {
        hist.add_value(v);
    }
    hist
}

proptest! {
    // Property: deserializing a serialized histogram reproduces it exactly.
    #[test]
    fn prop_serialization_round_trip(
        num_buckets in 1usize..16,
        range_start in -1000i64..1000,
        span in 1i64..1000,
        values in prop::collection::vec(-5000i64..5000, 0..200),
    ) {
        let hist = populated_i64_histogram(num_buckets, range_start, span, &values);
        let blob = hist.to_bytes();
        prop_assert_eq!(blob.len(), EqWidthHistogram::binary_size(num_buckets));
        let restored = EqWidthHistogram::from_bytes(&blob).unwrap();
        prop_assert_eq!(restored, hist);
    }

    // Property: every inserted value lands in exactly one bucket.
    #[test]
    fn prop_insertion_conserves_counts(
        num_buckets in 1usize..16,
        range_start in -1000i64..1000,
        span in 1i64..1000,
        values in prop::collection::vec(-5000i64..5000, 0..200),
    ) {
        let hist = populated_i64_histogram(num_buckets, range_start, span, &values);
        prop_assert_eq!(hist.num_elements(), values.len() as u64);

        let est = EqWidthHistogramEstimator::new(Arc::new(hist));
        prop_assert_eq!(est.num_elements(), values.len() as u64);
        // Any probe at or beyond the last boundary sees the whole count.
        prop_assert_eq!(est.estimate_less_or_equal(i64::MAX), values.len() as u64);
    }

    // Property: inclusive cumulative estimates are monotone in the probe.
    #[test]
    fn prop_cumulative_estimates_are_monotone(
        num_buckets in 1usize..16,
        range_start in -1000i64..1000,
        span in 1i64..1000,
        values in prop::collection::vec(-5000i64..5000, 1..200),
        mut probes in prop::collection::vec(-6000i64..6000, 2..40),
    ) {
        let hist = populated_i64_histogram(num_buckets, range_start, span, &values);
        let est = EqWidthHistogramEstimator::new(Arc::new(hist));

        probes.sort_unstable();
        for pair in probes.windows(2) {
            prop_assert!(est.estimate_less_or_equal(pair[0]) <= est.estimate_less_or_equal(pair[1]));
            prop_assert!(est.estimate_greater_or_equal(pair[0]) >= est.estimate_greater_or_equal(pair[1]));
        }
    }

    // Property: exclusive queries read the cumulative table one bucket
    // back, which tightens the prefix side and widens the suffix side.
    #[test]
    fn prop_exclusive_queries_step_back_one_bucket(
        num_buckets in 1usize..16,
        range_start in -1000i64..1000,
        span in 1i64..1000,
        values in prop::collection::vec(-5000i64..5000, 1..200),
        probe in -6000i64..6000,
    ) {
        let hist = populated_i64_histogram(num_buckets, range_start, span, &values);
        let est = EqWidthHistogramEstimator::new(Arc::new(hist));

        prop_assert!(est.estimate_less(probe) <= est.estimate_less_or_equal(probe));
        prop_assert!(est.estimate_greater(probe) >= est.estimate_greater_or_equal(probe));
        prop_assert!(est.estimate_equal(probe) >= 1);
    }

    // Property: merging is associative for identical layouts.
    #[test]
    fn prop_merge_associativity(
        num_buckets in 1usize..16,
        range_start in -1000i64..1000,
        span in 1i64..1000,
        values_a in prop::collection::vec(-5000i64..5000, 0..100),
        values_b in prop::collection::vec(-5000i64..5000, 0..100),
        values_c in prop::collection::vec(-5000i64..5000, 0..100),
    ) {
        let a = populated_i64_histogram(num_buckets, range_start, span, &values_a);
        let b = populated_i64_histogram(num_buckets, range_start, span, &values_b);
        let c = populated_i64_histogram(num_buckets, range_start, span, &values_c);

        let mut left = a.clone();
        left.aggregate(&b).unwrap();
        left.aggregate(&c).unwrap();

        let mut bc = b.clone();
        bc.aggregate(&c).unwrap();
        let mut right = a.clone();
        right.aggregate(&bc).unwrap();

        prop_assert_eq!(left, right);
    }

    // Property: the raw-bytes insertion path agrees with the typed one.
    #[test]
    fn prop_raw_insertion_matches_typed(
        values in prop::collection::vec(-5000i32..5000, 0..100),
    ) {
        let mut typed = EqWidthHistogram::new(8, ValueType::Int32).unwrap();
        typed.initialize_buckets(-1000i32, 1000i32).unwrap();
        let mut raw = typed.clone();

        for &v in &values {
            typed.add_value(v);
            raw.add_element(&v.to_le_bytes()).unwrap();
        }
        prop_assert_eq!(typed, raw);
    }
}
