//! Closed numeric-kind layer for histogram boundaries
//!
//! A histogram declares one of a small set of numeric kinds and stores every
//! bucket boundary as that kind's raw encoding inside a fixed 8-byte slot.
//! [`ValueType`] is the runtime tag, [`BucketValue`] is the compile-time side
//! of the same set: encode/decode into the slot, ordering, and the span
//! arithmetic boundary initialization needs. The two are bridged by
//! [`dispatch_value_type!`], which picks the concrete type from a tag.
//!
//! Encodings are explicitly little-endian so a serialized histogram is
//! byte-identical across build configurations.

use std::ops::{Add, Sub};

use num_traits::{Bounded, One, ToPrimitive, Zero};

use crate::error::{Error, Result};

/// Fixed storage size of one bucket boundary, independent of the value kind.
/// Narrower kinds are zero-padded up to this size.
pub const BOUNDARY_STORAGE_SIZE: usize = 8;

/// Tag identifying the numeric kind of a histogram's boundary values.
///
/// The discriminants are the wire tags; `NotSupported` is a sentinel for
/// histograms whose column type has no numeric mapping and never appears in
/// a valid serialized blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Int16 = 0,
    Int32 = 1,
    Int64 = 2,
    Uint16 = 3,
    Uint32 = 4,
    Uint64 = 5,
    Double = 6,
    NotSupported = 7,
}

impl ValueType {
    /// The wire tag for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag back into a kind.
    ///
    /// The `NotSupported` sentinel is not a wire type and is rejected along
    /// with unknown tags.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ValueType::Int16),
            1 => Ok(ValueType::Int32),
            2 => Ok(ValueType::Int64),
            3 => Ok(ValueType::Uint16),
            4 => Ok(ValueType::Uint32),
            5 => Ok(ValueType::Uint64),
            6 => Ok(ValueType::Double),
            _ => Err(Error::unknown_tag(tag)),
        }
    }

    /// Size in bytes of the kind's raw encoding, or `None` for the sentinel.
    pub fn encoded_width(self) -> Option<usize> {
        match self {
            ValueType::Int16 | ValueType::Uint16 => Some(2),
            ValueType::Int32 | ValueType::Uint32 => Some(4),
            ValueType::Int64 | ValueType::Uint64 | ValueType::Double => Some(8),
            ValueType::NotSupported => None,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A numeric kind usable as a histogram bucket boundary.
///
/// Implemented for exactly the seven types named by [`ValueType`]'s
/// non-sentinel variants; the trait is sealed so the set stays closed.
///
/// Comparison goes through [`cmp_eq`](BucketValue::cmp_eq) and
/// [`cmp_less`](BucketValue::cmp_less) rather than the operators directly so
/// the floating-point kind can use an epsilon equality.
pub trait BucketValue:
    sealed::Sealed
    + Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Zero
    + One
    + Bounded
    + ToPrimitive
    + std::fmt::Debug
    + 'static
{
    /// The runtime tag matching this type.
    const VALUE_TYPE: ValueType;
    /// Size in bytes of the raw encoding.
    const ENCODED_WIDTH: usize;

    /// Write the value's little-endian encoding into a boundary slot,
    /// zero-padding the tail if the kind is narrower than the slot.
    fn store(self, storage: &mut [u8; BOUNDARY_STORAGE_SIZE]);

    /// Read a value back from a boundary slot.
    fn load(storage: &[u8; BOUNDARY_STORAGE_SIZE]) -> Self;

    /// Equality under this kind's comparison semantics.
    fn cmp_eq(self, other: Self) -> bool {
        self == other
    }

    /// Strict ordering under this kind's comparison semantics.
    fn cmp_less(self, other: Self) -> bool {
        self < other
    }
}

macro_rules! impl_bucket_value {
    ($ty:ty, $value_type:expr, $width:expr) => {
        impl sealed::Sealed for $ty {}

        impl BucketValue for $ty {
            const VALUE_TYPE: ValueType = $value_type;
            const ENCODED_WIDTH: usize = $width;

            fn store(self, storage: &mut [u8; BOUNDARY_STORAGE_SIZE]) {
                storage.fill(0);
                storage[..Self::ENCODED_WIDTH].copy_from_slice(&self.to_le_bytes());
            }

            fn load(storage: &[u8; BOUNDARY_STORAGE_SIZE]) -> Self {
                let mut bytes = [0u8; $width];
                bytes.copy_from_slice(&storage[..Self::ENCODED_WIDTH]);
                Self::from_le_bytes(bytes)
            }
        }
    };
}

impl_bucket_value!(i16, ValueType::Int16, 2);
impl_bucket_value!(i32, ValueType::Int32, 4);
impl_bucket_value!(i64, ValueType::Int64, 8);
impl_bucket_value!(u16, ValueType::Uint16, 2);
impl_bucket_value!(u32, ValueType::Uint32, 4);
impl_bucket_value!(u64, ValueType::Uint64, 8);

impl sealed::Sealed for f64 {}

impl BucketValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;
    const ENCODED_WIDTH: usize = 8;

    fn store(self, storage: &mut [u8; BOUNDARY_STORAGE_SIZE]) {
        storage.copy_from_slice(&self.to_le_bytes());
    }

    fn load(storage: &[u8; BOUNDARY_STORAGE_SIZE]) -> Self {
        f64::from_le_bytes(*storage)
    }

    fn cmp_eq(self, other: Self) -> bool {
        (self - other).abs() < f64::EPSILON
    }
}

/// Monomorphize an expression over the supported numeric kinds.
///
/// Binds the given identifier as a type alias for the kind selected by the
/// tag and evaluates the body with it; the fallback expression runs for the
/// `NotSupported` sentinel.
///
/// ```rust
/// use optstats_core::{dispatch_value_type, BucketValue, ValueType};
///
/// let vt = ValueType::Int32;
/// let width = dispatch_value_type!(vt, T => T::ENCODED_WIDTH, _ => 0);
/// assert_eq!(width, 4);
/// ```
#[macro_export]
macro_rules! dispatch_value_type {
    ($value_type:expr, $ty:ident => $body:expr, _ => $fallback:expr $(,)?) => {
        match $value_type {
            $crate::ValueType::Int16 => {
                type $ty = i16;
                $body
            }
            $crate::ValueType::Int32 => {
                type $ty = i32;
                $body
            }
            $crate::ValueType::Int64 => {
                type $ty = i64;
                $body
            }
            $crate::ValueType::Uint16 => {
                type $ty = u16;
                $body
            }
            $crate::ValueType::Uint32 => {
                type $ty = u32;
                $body
            }
            $crate::ValueType::Uint64 => {
                type $ty = u64;
                $body
            }
            $crate::ValueType::Double => {
                type $ty = f64;
                $body
            }
            $crate::ValueType::NotSupported => $fallback,
        }
    };
}
