//! Flat end mill geometry.
//!
//! A flat end mill has three drop contact regions:
//! 1. Bottom face - the highest point of the triangle plane under the disc
//! 2. Corner (bottom edge) - contact with triangle edges
//! 3. Corner - contact with triangle vertices

use vcad_kernel_math::{Point3, Vec3};

use super::{prism_sweep_entry, Cutter};
use crate::model::Triangle;

/// Flat end mill: a cylinder of `radius` from the tip up to `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCutter {
    /// Cylinder radius.
    pub radius: f64,
    /// Tool length above the tip.
    pub height: f64,
}

impl FlatCutter {
    /// Create a flat cutter.
    pub fn new(radius: f64, height: f64) -> Self {
        Self { radius, height }
    }
}

impl Cutter for FlatCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn intersect(
        &self,
        location: &Point3,
        direction: &Vec3,
        triangle: &Triangle,
    ) -> Option<(Point3, f64)> {
        prism_sweep_entry(
            location,
            direction,
            self.radius,
            location.z,
            location.z + self.height,
            triangle,
        )
        .map(|t| (location + direction * t, t))
    }

    fn drop_contact(&self, location: &Point3, triangle: &Triangle) -> Option<Point3> {
        let (x, y, r) = (location.x, location.y, self.radius);

        let mut max_z = face_drop(x, y, r, triangle);
        for [a, b] in triangle.edges() {
            max_z = max_z.max(edge_drop(x, y, r, &a, &b));
        }
        for v in &triangle.v {
            max_z = max_z.max(vertex_drop(x, y, r, v));
        }

        (max_z > f64::NEG_INFINITY).then(|| Point3::new(x, y, max_z))
    }
}

/// Highest point of the triangle interior under the disc.
fn face_drop(x: f64, y: f64, r: f64, tri: &Triangle) -> f64 {
    let n = tri.normal();
    if n.z <= 1e-10 {
        return f64::NEG_INFINITY;
    }

    // The plane rises against the horizontal part of its normal
    let slope = (n.x * n.x + n.y * n.y).sqrt();
    let (px, py) = if slope < 1e-12 {
        (x, y)
    } else {
        (x - r * n.x / slope, y - r * n.y / slope)
    };

    if !tri.contains_xy(px, py) {
        return f64::NEG_INFINITY;
    }
    tri.z_at_xy(px, py).unwrap_or(f64::NEG_INFINITY)
}

/// Highest point of edge `a`-`b` inside the disc.
fn edge_drop(x: f64, y: f64, r: f64, a: &Point3, b: &Point3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-20 {
        // Vertical or degenerate edge, treat as vertex
        return vertex_drop(x, y, r, a).max(vertex_drop(x, y, r, b));
    }

    // Parameter range of the edge inside the disc
    let wx = a.x - x;
    let wy = a.y - y;
    let qb = 2.0 * (wx * dx + wy * dy);
    let qc = wx * wx + wy * wy - r * r;
    let disc = qb * qb - 4.0 * len_sq * qc;
    if disc < 0.0 {
        return f64::NEG_INFINITY;
    }
    let root = disc.sqrt();
    let t0 = ((-qb - root) / (2.0 * len_sq)).max(0.0);
    let t1 = ((-qb + root) / (2.0 * len_sq)).min(1.0);
    if t0 > t1 {
        return f64::NEG_INFINITY;
    }

    // Z is linear along the edge, so the clipped ends bound it
    let dz = b.z - a.z;
    (a.z + t0 * dz).max(a.z + t1 * dz)
}

/// Vertex height if the vertex lies under the disc.
fn vertex_drop(x: f64, y: f64, r: f64, v: &Point3) -> f64 {
    let dist_sq = (x - v.x) * (x - v.x) + (y - v.y) * (y - v.y);
    if dist_sq <= r * r {
        v.z
    } else {
        f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped() -> Triangle {
        // Sloped triangle from z=0 to z=10
        Triangle::from_arrays([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [5.0, 10.0, 10.0])
    }

    #[test]
    fn test_flat_face_contact() {
        let cutter = FlatCutter::new(1.0, 20.0);
        let cl = cutter
            .drop_contact(&Point3::new(5.0, 2.0, 0.0), &sloped())
            .unwrap();
        // Plane z = y, disc reaches up to y = 3
        assert!((cl.z - 3.0).abs() < 1e-9, "got {}", cl.z);
    }

    #[test]
    fn test_flat_vertex_contact() {
        let cutter = FlatCutter::new(2.0, 20.0);
        // Just within radius of the apex vertex, beyond the triangle
        let cl = cutter
            .drop_contact(&Point3::new(5.0, 11.5, 0.0), &sloped())
            .unwrap();
        assert!((cl.z - 10.0).abs() < 1e-9, "got {}", cl.z);
    }

    #[test]
    fn test_flat_edge_contact() {
        // Ridge along x at y = 0, z = 5, falling towards -y
        let tri = Triangle::from_arrays([10.0, 0.0, 5.0], [-10.0, 0.0, 5.0], [0.0, -10.0, 0.0]);
        let cutter = FlatCutter::new(1.0, 20.0);
        let cl = cutter.drop_contact(&Point3::new(0.0, 0.5, 0.0), &tri).unwrap();
        assert!((cl.z - 5.0).abs() < 1e-9, "got {}", cl.z);
    }

    #[test]
    fn test_flat_no_contact() {
        let cutter = FlatCutter::new(1.0, 20.0);
        assert!(cutter
            .drop_contact(&Point3::new(100.0, 100.0, 0.0), &sloped())
            .is_none());
    }

    #[test]
    fn test_flat_push_into_ramp() {
        // Plane z = y rising along +y; the cylinder at z = 2 meets it where
        // the ramp reaches the tool's bottom, at y = 2 (disc front at y + r).
        let ramp = Triangle::from_arrays([-10.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 10.0]);
        let cutter = FlatCutter::new(1.0, 5.0);
        let (cl, d) = cutter
            .intersect(&Point3::new(0.0, -5.0, 2.0), &Vec3::y(), &ramp)
            .unwrap();
        assert!((d - 6.0).abs() < 1e-9, "got {d}");
        assert!((cl - Point3::new(0.0, 1.0, 2.0)).norm() < 1e-9);
    }

    #[test]
    fn test_flat_push_misses_beside() {
        let wall = Triangle::from_arrays([5.0, 3.0, 0.0], [5.0, 5.0, 0.0], [5.0, 4.0, 10.0]);
        let cutter = FlatCutter::new(1.0, 5.0);
        assert!(cutter
            .intersect(&Point3::new(0.0, 0.0, 1.0), &Vec3::x(), &wall)
            .is_none());
    }
}
