//! Error types for favormap

use thiserror::Error;

/// Errors returned by the surface builders.
///
/// Degenerate input (no points, every cell masked) is not an error; it yields
/// [`Grid::empty`](crate::Grid::empty).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Grid of {width}x{height} cells still exceeds the ceiling of {ceiling} after coarsening")]
    CellCeiling {
        width: usize,
        height: usize,
        ceiling: usize,
    },

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Invalid boundary: {0}")]
    Boundary(String),
}

impl Error {
    /// Build an [`Error::InvalidParameter`] for a value that must be finite and positive.
    pub(crate) fn not_positive(name: &'static str, value: f64) -> Self {
        Error::InvalidParameter { name, value: value.to_string(), reason: "must be finite and > 0" }
    }
}

/// Result type alias for favormap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 { Ok(()) } else { Err(Error::not_positive(name, value)) }
}
