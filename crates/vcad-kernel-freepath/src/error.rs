//! Error types for free-path computation.

use thiserror::Error;
use vcad_kernel_math::ToleranceError;

/// Errors that can occur while computing free paths.
///
/// Absent contacts are not errors; they are reported as `None` or as the
/// unknown height of the active [`Tolerance`](vcad_kernel_math::Tolerance).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FreePathError {
    /// The scan line has zero (or non-finite) length.
    #[error("degenerate scan line (length {length})")]
    DegenerateScanLine {
        /// Measured length of the line.
        length: f64,
    },

    /// Tolerance values are unusable.
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(#[from] ToleranceError),

    /// Mesh data cannot be turned into a model or collision shape.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Tool dimensions are unusable.
    #[error("invalid tool: {0}")]
    InvalidTool(String),
}

/// Result type for free-path operations.
pub type Result<T> = std::result::Result<T, FreePathError>;
