//! Foundation types for optstats histograms
//!
//! This crate carries the pieces every histogram consumer needs but that do
//! not belong to any particular histogram shape:
//!
//! - a unified [`Error`] type and [`Result`] alias
//! - the closed set of numeric kinds a bucket boundary can hold
//!   ([`ValueType`]) and the [`BucketValue`] trait that gives each kind its
//!   fixed 8-byte encoding, ordering, and span arithmetic
//! - the [`dispatch_value_type!`] macro that monomorphizes an expression
//!   over the supported kinds from a runtime tag

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{BucketValue, ValueType, BOUNDARY_STORAGE_SIZE};
