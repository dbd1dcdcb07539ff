//! Scan windows: the straight line a scan runs along.

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point3, Vec3};

/// Rectangle whose diagonal from (min_x, min_y) to (max_x, max_y) is the
/// scan line. Usually `min_x == max_x` or `min_y == max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanWindow {
    /// Start X.
    pub min_x: f64,
    /// End X.
    pub max_x: f64,
    /// Start Y.
    pub min_y: f64,
    /// End Y.
    pub max_y: f64,
}

impl ScanWindow {
    /// Create a window.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// A scan along X at fixed `y`.
    pub fn along_x(min_x: f64, max_x: f64, y: f64) -> Self {
        Self::new(min_x, max_x, y, y)
    }

    /// A scan along Y at fixed `x`.
    pub fn along_y(x: f64, min_y: f64, max_y: f64) -> Self {
        Self::new(x, x, min_y, max_y)
    }

    /// Scan start at level `z`.
    pub fn start(&self, z: f64) -> Point3 {
        Point3::new(self.min_x, self.min_y, z)
    }

    /// Scan end at level `z`.
    pub fn end(&self, z: f64) -> Point3 {
        Point3::new(self.max_x, self.max_y, z)
    }

    /// Horizontal extent from start to end.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.max_x - self.min_x, self.max_y - self.min_y, 0.0)
    }

    /// Length of the scan line.
    pub fn length(&self) -> f64 {
        let dx = self.max_x - self.min_x;
        let dy = self.max_y - self.min_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// X/Y midpoint of the scan line.
    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Split at the midpoint into the first and second half.
    pub fn split(&self) -> (Self, Self) {
        let (middle_x, middle_y) = self.midpoint();
        (
            Self::new(self.min_x, middle_x, self.min_y, middle_y),
            Self::new(middle_x, self.max_x, middle_y, self.max_y),
        )
    }
}
