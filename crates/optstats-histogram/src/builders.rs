//! Building histograms from sampled column values
//!
//! The statistics-collection pipeline that scans a column lives outside this
//! crate; [`FixedRangeBuilder`] is that producer at its boundary. It declares
//! a bucket count, derives the value range from the sample it is handed,
//! and feeds every value through the insertion path.

use optstats_core::{BucketValue, Error, Result};

use crate::types::EqWidthHistogram;

/// Builds a populated histogram from a sample of column values.
pub struct FixedRangeBuilder {
    num_buckets: usize,
}

impl FixedRangeBuilder {
    /// Create a builder with the given bucket count.
    pub fn new(num_buckets: usize) -> Self {
        Self {
            num_buckets: num_buckets.max(1),
        }
    }

    /// Build a histogram over the sample's own `[min, max]` domain.
    ///
    /// The range end is widened by one step past the maximum so the maximum
    /// itself sits inside a bucket range; at the type's maximum the widening
    /// saturates and the maximum is absorbed by the last bucket instead.
    /// Fails on an empty sample. Bucket spread follows the
    /// boundary-initialization stride, so the counts land where a consumer
    /// of the serialized form expects them.
    pub fn build<T: BucketValue>(&self, sample: &[T]) -> Result<EqWidthHistogram> {
        let Some(&first) = sample.first() else {
            return Err(Error::InvalidParameter(
                "cannot build a histogram from an empty sample".to_string(),
            ));
        };

        let mut min = first;
        let mut max = first;
        for &val in sample {
            if val.cmp_less(min) {
                min = val;
            }
            if max.cmp_less(val) {
                max = val;
            }
        }

        let range_end = if max.cmp_eq(T::max_value()) {
            max
        } else {
            max + T::one()
        };
        if !min.cmp_less(range_end) {
            return Err(Error::InvalidParameter(
                "sample range cannot be represented as a bucket range".to_string(),
            ));
        }
        self.build_over(sample, min, range_end)
    }

    /// Build a histogram over an explicitly declared `[range_start,
    /// range_end)` domain, as the upstream pipeline does when it already
    /// knows the column's bounds.
    pub fn build_over<T: BucketValue>(
        &self,
        sample: &[T],
        range_start: T,
        range_end: T,
    ) -> Result<EqWidthHistogram> {
        let mut hist = EqWidthHistogram::new(self.num_buckets, T::VALUE_TYPE)?;
        hist.initialize_buckets(range_start, range_end)?;
        for &val in sample {
            hist.add_value(val);
        }
        Ok(hist)
    }
}
