//! Column statistics for query selectivity estimation
//!
//! This facade re-exports the optstats workspace crates:
//!
//! - [`optstats_core`] — unified error type and the closed set of numeric
//!   kinds a histogram boundary can hold
//! - [`optstats_histogram`] — the equal-width histogram, its byte-exact
//!   serialization, and the selectivity estimator built on top of it
//!
//! # Example
//!
//! ```rust
//! use optstats::{EqWidthHistogram, EqWidthHistogramEstimator, ValueType};
//! use std::sync::Arc;
//!
//! let mut hist = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
//! hist.initialize_buckets(0i32, 100i32).unwrap();
//! for v in [5i32, 50, 150, 250, 350] {
//!     hist.add_value(v);
//! }
//!
//! let estimator = EqWidthHistogramEstimator::new(Arc::new(hist));
//! assert_eq!(estimator.num_elements(), 5);
//! assert_eq!(estimator.estimate_less_or_equal(60i32), 2);
//! ```

pub use optstats_core::{
    dispatch_value_type, BucketValue, Error, Result, ValueType, BOUNDARY_STORAGE_SIZE,
};
pub use optstats_histogram::{
    Bucket, EqWidthHistogram, EqWidthHistogramEstimator, FixedRangeBuilder,
};
