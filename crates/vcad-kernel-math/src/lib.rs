#![warn(missing_docs)]

//! Math types for the vcad kernel.
//!
//! Thin wrappers around nalgebra providing the point and vector types used
//! by the machining kernels, plus the [`Tolerance`] value that carries the
//! comparison epsilon and the "infinite" sentinel explicitly instead of as
//! process-wide constants.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Invalid tolerance configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToleranceError {
    /// Epsilon must be finite and strictly positive.
    #[error("epsilon must be finite and positive, got {0}")]
    Epsilon(f64),

    /// The infinite sentinel must be finite and larger than epsilon.
    #[error("infinite sentinel {infinite} must be finite and greater than epsilon {epsilon}")]
    Infinite {
        /// Configured sentinel.
        infinite: f64,
        /// Configured epsilon.
        epsilon: f64,
    },
}

/// Tolerance values for geometric comparisons.
///
/// `epsilon` is the distance below which two scalar positions or heights are
/// considered equal. `infinite` is the sentinel for "no valid contact": any
/// height at or above it is not a real surface height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Linear comparison tolerance in mm.
    pub epsilon: f64,
    /// Sentinel height meaning "no intersection".
    pub infinite: f64,
}

impl Tolerance {
    /// Default machining tolerances (1e-4 mm, sentinel at 10 m).
    pub const DEFAULT: Self = Self {
        epsilon: 1e-4,
        infinite: 10_000.0,
    };

    /// Create a tolerance with the given epsilon and the default sentinel.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::DEFAULT
        }
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ToleranceError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ToleranceError::Epsilon(self.epsilon));
        }
        if !self.infinite.is_finite() || self.infinite <= self.epsilon {
            return Err(ToleranceError::Infinite {
                infinite: self.infinite,
                epsilon: self.epsilon,
            });
        }
        Ok(())
    }

    /// The "minus infinite" height used for unknown or absent contacts.
    pub fn unknown_height(&self) -> f64 {
        -self.infinite
    }

    /// Whether a height is a real contact (strictly below the sentinel).
    pub fn is_valid_height(&self, z: f64) -> bool {
        z < self.infinite
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
