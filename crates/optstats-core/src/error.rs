//! Error types for histogram construction and estimation
//!
//! Provides a unified error type for all optstats crates.

use thiserror::Error;

/// Core error type for histogram operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed or truncated serialized data
    #[error("Decode error: {0}")]
    Decode(String),

    /// Two histograms cannot be combined because their layouts differ
    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a buffer whose length disagrees with its header
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::Decode(format!(
            "buffer length {actual} does not match declared size {expected}"
        ))
    }

    /// Create an error for an unrecognized value type tag
    pub fn unknown_tag(tag: u8) -> Self {
        Self::Decode(format!("unrecognized value type tag {tag}"))
    }
}
