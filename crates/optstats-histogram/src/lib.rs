//! Equal-width histograms for query selectivity estimation
//!
//! A query optimizer needs a cheap approximation of how a column's values
//! are distributed so it can cost predicates without scanning the data. This
//! crate provides that approximation as an equal-width histogram: an ordered
//! sequence of buckets, each covering a contiguous value range and counting
//! the rows that fell inside it, plus an estimator that answers range and
//! equality selectivity queries over the finished histogram in `O(log N)`.
//!
//! The histogram carries a byte-exact serialized form so a statistics
//! producer and an optimizer consumer can exchange it between processes.
//!
//! # Building and querying
//!
//! ```rust
//! use optstats_histogram::{EqWidthHistogram, EqWidthHistogramEstimator};
//! use optstats_core::ValueType;
//! use std::sync::Arc;
//!
//! let mut hist = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
//! hist.initialize_buckets(0i32, 100i32).unwrap();
//! for v in [5i32, 50, 150, 250, 350] {
//!     hist.add_value(v);
//! }
//!
//! // Once populated the histogram is immutable; wrap it in an estimator.
//! let estimator = EqWidthHistogramEstimator::new(Arc::new(hist));
//! assert_eq!(estimator.num_elements(), 5);
//! assert_eq!(estimator.estimate_less_or_equal(60i32), 2);
//! assert_eq!(estimator.estimate_greater_or_equal(200i32), 2);
//! ```
//!
//! # Cross-process exchange
//!
//! ```rust
//! use optstats_histogram::EqWidthHistogram;
//! use optstats_core::ValueType;
//!
//! let mut hist = EqWidthHistogram::new(2, ValueType::Uint64).unwrap();
//! hist.initialize_buckets(0u64, 1000u64).unwrap();
//! hist.add_value(17u64);
//!
//! let blob = hist.to_bytes();
//! let restored = EqWidthHistogram::from_bytes(&blob).unwrap();
//! assert_eq!(restored, hist);
//! ```

pub mod builders;
pub mod estimator;
pub mod serialize;
pub mod types;

pub use builders::FixedRangeBuilder;
pub use estimator::EqWidthHistogramEstimator;
pub use types::{Bucket, EqWidthHistogram};
