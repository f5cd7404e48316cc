//! Byte-exact serialization of histograms
//!
//! The serialized form is the sole exchange contract between the statistics
//! producer and the optimizer consumer:
//!
//! ```text
//! [type_tag     : 1 byte]
//! [bucket_count : 8 bytes, unsigned little-endian]
//! repeated bucket_count times:
//!   [count    : 8 bytes, unsigned little-endian]
//!   [boundary : 8 bytes, raw kind-specific encoding, zero-padded]
//! ```
//!
//! The layout is packed by hand rather than derived from the in-memory
//! structs, so it is identical regardless of host alignment or build
//! configuration.

use log::debug;
use optstats_core::{Error, Result, ValueType, BOUNDARY_STORAGE_SIZE};

use crate::types::{Bucket, EqWidthHistogram};

const HEADER_SIZE: usize = 1 + 8;
const BUCKET_RECORD_SIZE: usize = 8 + BOUNDARY_STORAGE_SIZE;

impl EqWidthHistogram {
    /// Serialized size of a histogram with the given bucket count.
    pub fn binary_size(num_buckets: usize) -> usize {
        HEADER_SIZE + num_buckets * BUCKET_RECORD_SIZE
    }

    /// Serialize into the packed wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::binary_size(self.num_buckets()));
        out.push(self.value_type().tag());
        out.extend_from_slice(&(self.num_buckets() as u64).to_le_bytes());
        for bucket in self.buckets() {
            out.extend_from_slice(&bucket.count.to_le_bytes());
            out.extend_from_slice(&bucket.start);
        }
        out
    }

    /// Reconstruct a histogram from its serialized form.
    ///
    /// Rejects buffers whose length disagrees with the declared bucket
    /// count, unrecognized type tags, and a zero bucket count.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::size_mismatch(HEADER_SIZE, data.len()));
        }
        let value_type = ValueType::from_tag(data[0])?;

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&data[1..HEADER_SIZE]);
        let declared = u64::from_le_bytes(count_bytes);
        if declared == 0 {
            return Err(Error::Decode(
                "histogram needs at least one bucket".to_string(),
            ));
        }

        // The count is attacker-controlled; size it up with checked
        // arithmetic before trusting it.
        let expected = usize::try_from(declared)
            .ok()
            .and_then(|n| n.checked_mul(BUCKET_RECORD_SIZE))
            .and_then(|size| size.checked_add(HEADER_SIZE))
            .ok_or_else(|| {
                Error::Decode(format!(
                    "declared bucket count {declared} does not fit in any buffer"
                ))
            })?;
        if data.len() != expected {
            return Err(Error::size_mismatch(expected, data.len()));
        }
        let num_buckets = declared as usize;

        let mut buckets = Vec::with_capacity(num_buckets);
        for record in data[HEADER_SIZE..].chunks_exact(BUCKET_RECORD_SIZE) {
            count_bytes.copy_from_slice(&record[..8]);
            let mut start = [0u8; BOUNDARY_STORAGE_SIZE];
            start.copy_from_slice(&record[8..]);
            buckets.push(Bucket {
                count: u64::from_le_bytes(count_bytes),
                start,
            });
        }

        debug!("decoded {value_type:?} histogram with {num_buckets} buckets");
        Ok(Self::from_parts(value_type, buckets))
    }
}
