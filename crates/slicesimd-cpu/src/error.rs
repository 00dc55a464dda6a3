//! Error type shared by the slicesimd crates.
//!
//! The kernel libraries themselves never return errors: degenerate inputs
//! are clamped or no-ops, and bounds violations on explicitly offset
//! operations panic because they indicate a caller defect. This type backs
//! the `try_*` entry points and fallible backend constructors.

use thiserror::Error;

/// Error type for the fallible slicesimd entry points.
#[derive(Error, Debug)]
pub enum Error {
    /// A vectorized backend was requested on hardware that lacks it.
    #[error("Feature not available: {0}")]
    FeatureUnavailable(String),

    /// An explicit offset would write past the destination.
    #[error("offset {offset} + length {len} exceeds destination capacity {capacity}")]
    OffsetOutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = Error::FeatureUnavailable("AVX2+F16C".to_string());
        assert_eq!(err.to_string(), "Feature not available: AVX2+F16C");

        let err = Error::OffsetOutOfBounds {
            offset: 90,
            len: 20,
            capacity: 100,
        };
        assert_eq!(
            err.to_string(),
            "offset 90 + length 20 exceeds destination capacity 100"
        );
    }
}
