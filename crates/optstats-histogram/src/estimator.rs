//! Selectivity estimation over a finished histogram

use std::sync::Arc;

use optstats_core::BucketValue;

use crate::types::EqWidthHistogram;

/// Answers selectivity queries over a read-only [`EqWidthHistogram`].
///
/// Construction walks the bucket counts once to build prefix and suffix
/// cumulative sums; every query afterwards is one bucket lookup plus a table
/// read. The histogram is held through a shared handle, so any number of
/// estimators can wrap the same histogram across query-planning threads.
///
/// All estimates assume values are uniformly distributed within a bucket;
/// they approximate, they do not count.
pub struct EqWidthHistogramEstimator {
    histogram: Arc<EqWidthHistogram>,
    prefix_sum: Vec<u64>,
    suffix_sum: Vec<u64>,
}

impl EqWidthHistogramEstimator {
    /// Wrap a histogram, precomputing the cumulative count tables.
    pub fn new(histogram: Arc<EqWidthHistogram>) -> Self {
        let counts: Vec<u64> = (0..histogram.num_buckets())
            .map(|i| histogram.count_in_bucket(i))
            .collect();

        let mut prefix_sum = Vec::with_capacity(counts.len());
        let mut running = 0u64;
        for &count in &counts {
            running += count;
            prefix_sum.push(running);
        }

        let mut suffix_sum = vec![0u64; counts.len()];
        let mut running = 0u64;
        for (i, &count) in counts.iter().enumerate().rev() {
            running += count;
            suffix_sum[i] = running;
        }

        Self {
            histogram,
            prefix_sum,
            suffix_sum,
        }
    }

    /// The wrapped histogram.
    pub fn histogram(&self) -> &Arc<EqWidthHistogram> {
        &self.histogram
    }

    /// Estimated number of values `<= val`.
    pub fn estimate_less_or_equal<T: BucketValue>(&self, val: T) -> u64 {
        self.estimate_or_equal(val, &self.prefix_sum)
    }

    /// Estimated number of values `>= val`.
    pub fn estimate_greater_or_equal<T: BucketValue>(&self, val: T) -> u64 {
        self.estimate_or_equal(val, &self.suffix_sum)
    }

    /// Estimated number of values `< val`: the prefix sum one bucket back,
    /// so the located bucket's own count is excluded.
    pub fn estimate_less<T: BucketValue>(&self, val: T) -> u64 {
        self.estimate_excluding(val, &self.prefix_sum)
    }

    /// Estimated number of values `> val`: the suffix sum one bucket back.
    /// Stepping back on the suffix side adds the preceding bucket's count
    /// rather than excluding the located one, so this is an upper bound.
    pub fn estimate_greater<T: BucketValue>(&self, val: T) -> u64 {
        self.estimate_excluding(val, &self.suffix_sum)
    }

    /// Estimated number of values `== val`, assuming a uniform distribution
    /// within the bucket. Never returns zero.
    pub fn estimate_equal<T: BucketValue>(&self, val: T) -> u64 {
        let index = self.histogram.find_bucket_index(val);
        let width = self.histogram.bucket_width::<T>();
        (self.histogram.count_in_bucket(index) / width).max(1)
    }

    /// Total number of elements in the histogram; useful to scale estimates
    /// into selectivity fractions.
    pub fn num_elements(&self) -> u64 {
        self.prefix_sum.last().copied().unwrap_or(0)
    }

    fn estimate_or_equal<T: BucketValue>(&self, val: T, sums: &[u64]) -> u64 {
        sums[self.histogram.find_bucket_index(val)]
    }

    // Reads the cumulative table one bucket back; bucket 0 has nowhere to
    // step to and falls back to its inclusive sum. For the prefix table the
    // step excludes the located bucket, for the suffix table it widens the
    // estimate by the preceding bucket.
    fn estimate_excluding<T: BucketValue>(&self, val: T, sums: &[u64]) -> u64 {
        let index = self.histogram.find_bucket_index(val);
        if index == 0 {
            sums[0]
        } else {
            sums[index - 1]
        }
    }
}
