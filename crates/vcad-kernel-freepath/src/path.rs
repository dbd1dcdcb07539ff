//! Free-path results.
//!
//! Scanners return a flat point list where each consecutive pair is one
//! collision-free segment. The helpers here read that list without changing
//! its layout.

use vcad_kernel_math::Point3;

/// One collision-free segment of a scan line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreePath {
    /// Where the tool may start moving.
    pub begin: Point3,
    /// Where the tool has to stop.
    pub end: Point3,
}

impl FreePath {
    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.end - self.begin).norm()
    }
}

/// Pair up a flat endpoint list. A trailing unpaired point is ignored.
pub fn segments(points: &[Point3]) -> Vec<FreePath> {
    points
        .chunks_exact(2)
        .map(|pair| FreePath {
            begin: pair[0],
            end: pair[1],
        })
        .collect()
}

/// Total free length of a flat endpoint list.
pub fn free_length(points: &[Point3]) -> f64 {
    segments(points).iter().map(FreePath::length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segments_pairs_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        let paths = segments(&points);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].begin, points[2]);
        assert_relative_eq!(free_length(&points), 7.0);
        assert_relative_eq!(paths[0].length(), 2.0);
    }

    #[test]
    fn test_segments_empty() {
        assert!(segments(&[]).is_empty());
        assert_eq!(free_length(&[]), 0.0);
    }
}
