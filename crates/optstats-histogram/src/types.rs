//! Core types for the equal-width histogram

use std::fmt;

use log::warn;
use optstats_core::{dispatch_value_type, BucketValue, Error, Result, ValueType, BOUNDARY_STORAGE_SIZE};

/// A single bucket in an equal-width histogram.
///
/// The boundary slot holds the raw encoding of the bucket's lower boundary,
/// interpreted per the owning histogram's [`ValueType`]. A bucket covers the
/// half-open range `[start[i], start[i + 1])`; the last bucket is unbounded
/// above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub(crate) count: u64,
    pub(crate) start: [u8; BOUNDARY_STORAGE_SIZE],
}

impl Bucket {
    /// Number of values attributed to this bucket.
    pub fn count(&self) -> u64 {
        self.count
    }
}

// Transient [start, end) pair used only while initializing boundaries; the
// values round-trip through the boundary encoding so initialization sees
// exactly what lookups will see later.
#[derive(Default)]
struct BucketRange {
    start: [u8; BOUNDARY_STORAGE_SIZE],
    end: [u8; BOUNDARY_STORAGE_SIZE],
}

/// An equal-width histogram over one column's values.
///
/// Buckets are kept in strictly ascending boundary order. Population
/// (boundary initialization, insertion, merge) is single-threaded; once
/// stable, the histogram is read-only and can be shared across estimator
/// threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqWidthHistogram {
    value_type: ValueType,
    buckets: Vec<Bucket>,
}

impl EqWidthHistogram {
    /// Create a histogram with `num_buckets` zeroed buckets.
    ///
    /// Boundaries are undefined until [`initialize_buckets`] is called;
    /// lookups and insertions are meaningless before that.
    ///
    /// [`initialize_buckets`]: EqWidthHistogram::initialize_buckets
    pub fn new(num_buckets: usize, value_type: ValueType) -> Result<Self> {
        if num_buckets == 0 {
            return Err(Error::InvalidParameter(
                "histogram needs at least one bucket".to_string(),
            ));
        }
        Ok(Self {
            value_type,
            buckets: vec![
                Bucket {
                    count: 0,
                    start: [0u8; BOUNDARY_STORAGE_SIZE],
                };
                num_buckets
            ],
        })
    }

    /// Number of buckets in the histogram.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// The declared numeric kind of the boundary values.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub(crate) fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub(crate) fn from_parts(value_type: ValueType, buckets: Vec<Bucket>) -> Self {
        Self { value_type, buckets }
    }

    /// Number of values attributed to the bucket at `index`.
    pub fn count_in_bucket(&self, index: usize) -> u64 {
        debug_assert!(index < self.num_buckets());
        self.buckets[index].count
    }

    /// Decoded lower boundary of the bucket at `index`.
    pub fn start_boundary<T: BucketValue>(&self, index: usize) -> T {
        debug_assert!(index < self.num_buckets());
        debug_assert_eq!(T::VALUE_TYPE, self.value_type);
        T::load(&self.buckets[index].start)
    }

    /// Total number of values across all buckets.
    pub fn num_elements(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Initialize bucket boundaries from the given range.
    ///
    /// Bucket 0 starts at `range_start`; every subsequent boundary advances
    /// by the full `range_end - range_start` span, so bucket `i` starts at
    /// `range_start + i * (range_end - range_start)`. Note that the stride is
    /// the whole span, not `span / num_buckets`: the buckets do not subdivide
    /// the given range. Fails unless `range_start < range_end`, and fails if
    /// the stride would push a later boundary past the type's maximum.
    pub fn initialize_buckets<T: BucketValue>(&mut self, range_start: T, range_end: T) -> Result<()> {
        debug_assert_eq!(T::VALUE_TYPE, self.value_type);
        let mut range = BucketRange::default();
        range_start.store(&mut range.start);
        range_end.store(&mut range.end);
        let start = T::load(&range.start);
        let end = T::load(&range.end);
        if !start.cmp_less(end) {
            return Err(Error::InvalidParameter(format!(
                "bucket range start {start:?} must be less than end {end:?}"
            )));
        }
        let span = end - start;
        // Later boundaries must stay representable; the full-span stride
        // makes that easy to exceed for narrow kinds. Doubles skip the check
        // (their maximum exceeds the i128 domain) and saturate instead of
        // wrapping.
        if let (Some(start_i), Some(span_i), Some(max_i)) =
            (start.to_i128(), span.to_i128(), T::max_value().to_i128())
        {
            let last = (self.num_buckets() as i128 - 1)
                .checked_mul(span_i)
                .and_then(|offset| offset.checked_add(start_i));
            if !matches!(last, Some(last) if last <= max_i) {
                return Err(Error::InvalidParameter(format!(
                    "bucket boundaries starting at {start:?} with stride {span:?} do not fit the value type"
                )));
            }
        }
        self.buckets[0].start = range.start;
        for i in 1..self.num_buckets() {
            let prev = T::load(&self.buckets[i - 1].start);
            (prev + span).store(&mut self.buckets[i].start);
        }
        Ok(())
    }

    /// Index of the bucket that stores `val`, in `[0, num_buckets - 1]`.
    ///
    /// Returns the rightmost bucket whose boundary is `<= val`, clamped into
    /// range: values below the first boundary map to bucket 0 and values at
    /// or beyond the last boundary map to the last bucket. Not a plain
    /// lower-bound search; the returned index must line up with the prefix
    /// and suffix sum tables the estimator builds over the bucket counts.
    pub fn find_bucket_index<T: BucketValue>(&self, val: T) -> usize {
        debug_assert_eq!(T::VALUE_TYPE, self.value_type);
        let mut start = 0usize;
        let mut end = self.num_buckets() - 1;
        while start < end {
            let mid = start + (end - start + 1) / 2;
            if val.cmp_less(T::load(&self.buckets[mid].start)) {
                end = mid - 1;
            } else {
                start = mid;
            }
        }
        start
    }

    /// Add one value to the histogram, incrementing exactly one bucket.
    pub fn add_value<T: BucketValue>(&mut self, val: T) {
        debug_assert_eq!(T::VALUE_TYPE, self.value_type);
        let index = self.find_bucket_index(val);
        let boundary = T::load(&self.buckets[index].start);
        // The looked-up boundary can compare greater than the value when the
        // kind's equality is wider than its ordering (epsilon ties on
        // doubles); attribute the value to the preceding bucket then.
        if index == 0 || boundary.cmp_eq(val) || boundary.cmp_less(val) {
            self.buckets[index].count += 1;
        } else {
            self.buckets[index - 1].count += 1;
        }
    }

    /// Add one value from its raw encoding.
    ///
    /// `data` must be exactly the declared kind's encoded width.
    pub fn add_element(&mut self, data: &[u8]) -> Result<()> {
        let width = self.value_type.encoded_width().ok_or_else(|| {
            Error::InvalidParameter("cannot add to an unsupported histogram value type".to_string())
        })?;
        if data.len() != width {
            return Err(Error::InvalidParameter(format!(
                "value encoding is {} bytes, expected {width}",
                data.len()
            )));
        }
        let mut slot = [0u8; BOUNDARY_STORAGE_SIZE];
        slot[..width].copy_from_slice(data);
        dispatch_value_type!(self.value_type, T => {
            self.add_value(T::load(&slot));
            Ok(())
        }, _ => unreachable!("encoded_width ruled out the sentinel"))
    }

    /// Width of one bucket, as an unsigned count of domain points.
    ///
    /// The floating-point kind reports a synthetic width of 1 (a range
    /// length is not a count for a continuous domain). A single-bucket
    /// histogram reports its own boundary, clamped to at least 1.
    ///
    /// # Panics
    ///
    /// Panics if the histogram's value type is the `NotSupported` sentinel.
    pub fn bucket_width<T: BucketValue>(&self) -> u64 {
        match self.value_type {
            ValueType::NotSupported => panic!("bucket width on unsupported histogram value type"),
            ValueType::Double => return 1,
            _ => {}
        }
        debug_assert_eq!(T::VALUE_TYPE, self.value_type);
        if self.num_buckets() == 1 {
            // avoid a zero width and casts of negative boundaries
            match self.start_boundary::<T>(0).to_u64() {
                Some(val) if val > 0 => val,
                _ => 1,
            }
        } else {
            let width = self.start_boundary::<T>(1) - self.start_boundary::<T>(0);
            width.to_u64().unwrap_or(1)
        }
    }

    /// Merge `other` into `self` by summing counts elementwise.
    ///
    /// Both histograms must have the same bucket count, value type, and
    /// boundary sequence; on mismatch the receiver is left unmodified.
    pub fn aggregate(&mut self, other: &EqWidthHistogram) -> Result<()> {
        let equal = dispatch_value_type!(self.value_type, T => self.buckets_equal::<T>(other),
            _ => panic!("aggregate on unsupported histogram value type"));
        if !equal {
            warn!(
                "refusing to aggregate histograms with different layouts: {self} vs {other}"
            );
            return Err(Error::LayoutMismatch(
                "histograms differ in bucket count, value type, or boundaries".to_string(),
            ));
        }
        for (bucket, theirs) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            bucket.count += theirs.count;
        }
        Ok(())
    }

    fn buckets_equal<T: BucketValue>(&self, other: &EqWidthHistogram) -> bool {
        if self.num_buckets() != other.num_buckets() {
            return false;
        }
        if self.value_type != other.value_type() {
            return false;
        }
        if self.bucket_width::<T>() != other.bucket_width::<T>() {
            return false;
        }
        (0..self.num_buckets())
            .all(|i| self.start_boundary::<T>(i).cmp_eq(other.start_boundary::<T>(i)))
    }
}

impl fmt::Display for EqWidthHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EqWidthHistogram({:?}, {} buckets, n={})",
            self.value_type,
            self.num_buckets(),
            self.num_elements()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_histogram() -> EqWidthHistogram {
        let mut hist = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
        hist.initialize_buckets(0i32, 100i32).unwrap();
        for v in [5i32, 50, 150, 250, 350] {
            hist.add_value(v);
        }
        hist
    }

    #[test]
    fn test_new_rejects_zero_buckets() {
        assert!(EqWidthHistogram::new(0, ValueType::Int32).is_err());
    }

    #[test]
    fn test_full_span_stride_boundaries() {
        let hist = scenario_histogram();
        let boundaries: Vec<i32> = (0..4).map(|i| hist.start_boundary::<i32>(i)).collect();
        assert_eq!(boundaries, vec![0, 100, 200, 300]);
    }

    #[test]
    fn test_scenario_counts() {
        let hist = scenario_histogram();
        let counts: Vec<u64> = (0..4).map(|i| hist.count_in_bucket(i)).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
        assert_eq!(hist.num_elements(), 5);
    }

    #[test]
    fn test_initialize_rejects_empty_range() {
        let mut hist = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
        assert!(hist.initialize_buckets(10i32, 10i32).is_err());
        assert!(hist.initialize_buckets(10i32, 5i32).is_err());
    }

    #[test]
    fn test_initialize_rejects_unrepresentable_boundaries() {
        // Three i16 buckets over [0, 30000) would need boundaries at 30000
        // and 60000; the latter does not fit the type.
        let mut hist = EqWidthHistogram::new(3, ValueType::Int16).unwrap();
        assert!(hist.initialize_buckets(0i16, 30000i16).is_err());

        // The same shape fits once the stride does.
        hist.initialize_buckets(0i16, 10000i16).unwrap();
        assert_eq!(hist.start_boundary::<i16>(2), 20000);
    }

    #[test]
    fn test_lookup_clamps_into_range() {
        let hist = scenario_histogram();
        // Below the first boundary and far beyond the last one.
        assert_eq!(hist.find_bucket_index(-1000i32), 0);
        assert_eq!(hist.find_bucket_index(1_000_000i32), 3);
    }

    #[test]
    fn test_lookup_ties_go_right() {
        let hist = scenario_histogram();
        // A value exactly on bucket i's boundary belongs to bucket i.
        assert_eq!(hist.find_bucket_index(100i32), 1);
        assert_eq!(hist.find_bucket_index(200i32), 2);
        assert_eq!(hist.find_bucket_index(300i32), 3);
        assert_eq!(hist.find_bucket_index(99i32), 0);
    }

    #[test]
    fn test_add_element_raw() {
        let mut hist = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
        hist.initialize_buckets(0i32, 100i32).unwrap();
        hist.add_element(&150i32.to_le_bytes()).unwrap();
        assert_eq!(hist.count_in_bucket(1), 1);

        // Wrong encoded width is rejected without touching the counts.
        assert!(hist.add_element(&[0u8; 2]).is_err());
        assert_eq!(hist.num_elements(), 1);
    }

    #[test]
    fn test_negative_ranges() {
        let mut hist = EqWidthHistogram::new(3, ValueType::Int64).unwrap();
        hist.initialize_buckets(-100i64, -50i64).unwrap();
        assert_eq!(hist.start_boundary::<i64>(0), -100);
        assert_eq!(hist.start_boundary::<i64>(1), -50);
        assert_eq!(hist.start_boundary::<i64>(2), 0);
        hist.add_value(-75i64);
        assert_eq!(hist.count_in_bucket(0), 1);
    }

    #[test]
    fn test_bucket_width_multi_bucket() {
        let hist = scenario_histogram();
        assert_eq!(hist.bucket_width::<i32>(), 100);
    }

    #[test]
    fn test_bucket_width_single_bucket() {
        let mut hist = EqWidthHistogram::new(1, ValueType::Int32).unwrap();
        hist.initialize_buckets(25i32, 75i32).unwrap();
        assert_eq!(hist.bucket_width::<i32>(), 25);

        let mut hist = EqWidthHistogram::new(1, ValueType::Int32).unwrap();
        hist.initialize_buckets(-10i32, 75i32).unwrap();
        // Negative boundary clamps to 1 instead of wrapping through a cast.
        assert_eq!(hist.bucket_width::<i32>(), 1);
    }

    #[test]
    fn test_bucket_width_double_is_synthetic() {
        let mut hist = EqWidthHistogram::new(4, ValueType::Double).unwrap();
        hist.initialize_buckets(0.0f64, 10.0f64).unwrap();
        assert_eq!(hist.bucket_width::<f64>(), 1);
    }

    #[test]
    #[should_panic(expected = "unsupported histogram value type")]
    fn test_bucket_width_panics_on_sentinel() {
        let hist = EqWidthHistogram::new(1, ValueType::NotSupported).unwrap();
        hist.bucket_width::<i32>();
    }

    #[test]
    fn test_double_histogram_population() {
        let mut hist = EqWidthHistogram::new(4, ValueType::Double).unwrap();
        hist.initialize_buckets(0.0f64, 1.0f64).unwrap();
        for v in [0.25f64, 0.75, 1.0, 2.5, 3.9] {
            hist.add_value(v);
        }
        let counts: Vec<u64> = (0..4).map(|i| hist.count_in_bucket(i)).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_aggregate_sums_counts() {
        let mut a = scenario_histogram();
        let b = scenario_histogram();
        a.aggregate(&b).unwrap();
        let counts: Vec<u64> = (0..4).map(|i| a.count_in_bucket(i)).collect();
        assert_eq!(counts, vec![4, 2, 2, 2]);
    }

    #[test]
    fn test_aggregate_rejects_mismatched_layouts() {
        let mut a = scenario_histogram();
        let before = a.clone();

        let mut different_range = EqWidthHistogram::new(4, ValueType::Int32).unwrap();
        different_range.initialize_buckets(0i32, 50i32).unwrap();
        assert!(a.aggregate(&different_range).is_err());

        let different_count = EqWidthHistogram::new(2, ValueType::Int32).unwrap();
        assert!(a.aggregate(&different_count).is_err());

        // The receiver is untouched on failure.
        assert_eq!(a, before);
    }

    #[test]
    fn test_display() {
        let hist = scenario_histogram();
        assert_eq!(hist.to_string(), "EqWidthHistogram(Int32, 4 buckets, n=5)");
    }
}
