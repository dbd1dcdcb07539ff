//! Ball end mill geometry.
//!
//! A ball end mill has a spherical tip. The contact regions are:
//! 1. Sphere-triangle face contact
//! 2. Sphere-edge contact
//! 3. Sphere-vertex contact
//!
//! Horizontal pushes also test the cylindrical shank above the sphere.

use vcad_kernel_math::{Point3, Vec3};

use super::{prism_sweep_entry, Cutter};
use crate::model::Triangle;

/// Ball end mill: sphere of `radius` at the tip plus a shank up to `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallCutter {
    /// Sphere (and shank) radius.
    pub radius: f64,
    /// Tool length above the tip.
    pub height: f64,
}

impl BallCutter {
    /// Create a ball cutter.
    pub fn new(radius: f64, height: f64) -> Self {
        Self { radius, height }
    }

    fn center(&self, location: &Point3) -> Point3 {
        Point3::new(location.x, location.y, location.z + self.radius)
    }
}

impl Cutter for BallCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn intersect(
        &self,
        location: &Point3,
        direction: &Vec3,
        triangle: &Triangle,
    ) -> Option<(Point3, f64)> {
        let r = self.radius;
        let center = self.center(location);

        let mut best = face_entry(&center, direction, r, triangle);
        let mut take = |t: Option<f64>| {
            if let Some(t) = t {
                best = Some(best.map_or(t, |b: f64| b.min(t)));
            }
        };

        for [a, b] in triangle.edges() {
            take(edge_entry(&center, direction, r, &a, &b));
        }
        for v in &triangle.v {
            take(vertex_entry(&center, direction, r, v));
        }
        if self.height > r {
            take(prism_sweep_entry(
                &center,
                direction,
                r,
                location.z + r,
                location.z + self.height,
                triangle,
            ));
        }

        best.map(|t| (location + direction * t, t))
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

        // Heights are for the sphere center; the tool location is the tip.
        (max_z > f64::NEG_INFINITY).then(|| Point3::new(x, y, max_z - r))
    }
}

/// Earliest time the moving sphere touches the triangle interior.
fn face_entry(center: &Point3, dir: &Vec3, r: f64, tri: &Triangle) -> Option<f64> {
    let n = tri.normal();
    let k = n.dot(dir);
    if k.abs() < 1e-12 {
        return None;
    }
    let s0 = tri.plane_distance(center);
    let t = ((r - s0) / k).min((-r - s0) / k);
    let q = center + dir * t;
    let contact = q - n * tri.plane_distance(&q);
    tri.contains_on_plane(&contact).then_some(t)
}

/// Earliest time the moving sphere touches the interior of edge `a`-`b`.
fn edge_entry(center: &Point3, dir: &Vec3, r: f64, a: &Point3, b: &Point3) -> Option<f64> {
    let e = b - a;
    let len_sq = e.norm_squared();
    if len_sq < 1e-20 {
        return None;
    }
    let u = e / len_sq.sqrt();
    let perp = |w: Vec3| w - u * w.dot(&u);

    let p0 = perp(center - a);
    let pd = perp(*dir);
    let qa = pd.norm_squared();
    if qa < 1e-12 {
        // Moving parallel to the edge: only its endpoints can be hit.
        return None;
    }
    let qb = 2.0 * p0.dot(&pd);
    let qc = p0.norm_squared() - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let t = (-qb - disc.sqrt()) / (2.0 * qa);
    let s = ((center + dir * t) - a).dot(&e) / len_sq;
    (0.0..=1.0).contains(&s).then_some(t)
}

/// Earliest time the moving sphere touches vertex `v`.
fn vertex_entry(center: &Point3, dir: &Vec3, r: f64, v: &Point3) -> Option<f64> {
    let qa = dir.norm_squared();
    if qa < 1e-24 {
        return None;
    }
    let w = center - v;
    let qb = 2.0 * w.dot(dir);
    let qc = w.norm_squared() - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    Some((-qb - disc.sqrt()) / (2.0 * qa))
}

/// Sphere center Z for face contact.
fn face_drop(x: f64, y: f64, r: f64, tri: &Triangle) -> f64 {
    let n = tri.normal();
    if n.z <= 1e-10 {
        return f64::NEG_INFINITY;
    }

    // Center sits on the plane offset by r along the normal
    let cz = (r + tri.d - n.x * x - n.y * y) / n.z;
    let contact = Point3::new(x, y, cz) - n * r;
    if tri.contains_on_plane(&contact) {
        cz
    } else {
        f64::NEG_INFINITY
    }
}

/// Sphere center Z for edge contact.
fn edge_drop(x: f64, y: f64, r: f64, a: &Point3, b: &Point3) -> f64 {
    let e = b - a;
    let len_sq = e.norm_squared();
    if len_sq < 1e-20 {
        return f64::NEG_INFINITY;
    }
    let u = e / len_sq.sqrt();
    let perp = |w: Vec3| w - u * w.dot(&u);

    // Center (x, y, cz) at distance r from the edge line, highest root
    let w0 = Vec3::new(x - a.x, y - a.y, -a.z);
    let p0 = perp(w0);
    let pz = perp(Vec3::z());
    let qa = pz.norm_squared();
    if qa < 1e-12 {
        // Vertical edge: covered by its endpoints and the faces.
        return f64::NEG_INFINITY;
    }
    let qb = 2.0 * p0.dot(&pz);
    let qc = p0.norm_squared() - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return f64::NEG_INFINITY;
    }
    let cz = (-qb + disc.sqrt()) / (2.0 * qa);
    let s = (w0 + Vec3::z() * cz).dot(&e) / len_sq;
    if (0.0..=1.0).contains(&s) {
        cz
    } else {
        f64::NEG_INFINITY
    }
}

/// Sphere center Z for vertex contact.
fn vertex_drop(x: f64, y: f64, r: f64, v: &Point3) -> f64 {
    let dist_sq = (x - v.x) * (x - v.x) + (y - v.y) * (y - v.y);
    if dist_sq > r * r {
        return f64::NEG_INFINITY;
    }
    v.z + (r * r - dist_sq).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_floor() -> Triangle {
        Triangle::from_arrays([0.0, 0.0, 0.0], [20.0, 0.0, 0.0], [10.0, 20.0, 0.0])
    }

    fn sloped() -> Triangle {
        // Rises 45 degrees towards +y
        Triangle::from_arrays([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [5.0, 10.0, 10.0])
    }

    #[test]
    fn test_ball_flat_face_drop() {
        let cutter = BallCutter::new(3.0, 20.0);
        let cl = cutter
            .drop_contact(&Point3::new(10.0, 10.0, 100.0), &flat_floor())
            .unwrap();
        assert!(cl.z.abs() < 1e-9, "tip should rest on the floor, got {}", cl.z);
        assert!((cl.x - 10.0).abs() < 1e-12 && (cl.y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_ball_sloped_face_drop() {
        let cutter = BallCutter::new(2.0, 20.0);
        let cl = cutter
            .drop_contact(&Point3::new(5.0, 4.0, 0.0), &sloped())
            .unwrap();
        // Surface under the tool is at z = 4; the sphere touches uphill of it
        // with center at 4 + r * sqrt(2), tip at 4 + r * (sqrt(2) - 1).
        let expected = 4.0 + 2.0 * (2.0_f64.sqrt() - 1.0);
        assert!((cl.z - expected).abs() < 1e-9, "got {}", cl.z);
    }

    #[test]
    fn test_ball_vertex_drop() {
        // Needle-like triangle whose top vertex is the only reachable feature
        let tri = Triangle::from_arrays([0.0, 0.0, 5.0], [-10.0, 0.0, 0.0], [-10.0, 0.1, 0.0]);
        let cutter = BallCutter::new(2.0, 20.0);
        let cl = cutter.drop_contact(&Point3::new(1.0, 0.0, 0.0), &tri).unwrap();
        // Vertex at horizontal distance 1: center = 5 + sqrt(3), tip = center - 2
        let expected = 5.0 + 3.0_f64.sqrt() - 2.0;
        assert!((cl.z - expected).abs() < 1e-6, "got {}", cl.z);
    }

    #[test]
    fn test_ball_edge_drop() {
        // Horizontal ridge edge along x at y = 0, z = 5, triangle below it
        let tri = Triangle::from_arrays([10.0, 0.0, 5.0], [-10.0, 0.0, 5.0], [0.0, -10.0, 0.0]);
        let cutter = BallCutter::new(2.0, 20.0);
        // Beside the ridge on the far side (y = 1): only the edge is reachable
        let cl = cutter.drop_contact(&Point3::new(0.0, 1.0, 0.0), &tri).unwrap();
        let expected = 5.0 + 3.0_f64.sqrt() - 2.0;
        assert!((cl.z - expected).abs() < 1e-6, "got {}", cl.z);
    }

    #[test]
    fn test_ball_no_drop_contact() {
        let cutter = BallCutter::new(2.0, 20.0);
        assert!(cutter
            .drop_contact(&Point3::new(100.0, 100.0, 0.0), &flat_floor())
            .is_none());
    }

    #[test]
    fn test_ball_push_into_wall() {
        // Wall facing -x at x = 5
        let wall = Triangle::from_arrays([5.0, -5.0, 0.0], [5.0, 0.0, 10.0], [5.0, 5.0, 0.0]);
        assert!(wall.normal().x < 0.0);
        let cutter = BallCutter::new(1.0, 10.0);
        let (cl, d) = cutter
            .intersect(&Point3::new(0.0, 0.0, 1.0), &Vec3::x(), &wall)
            .unwrap();
        assert!((d - 4.0).abs() < 1e-9, "got {d}");
        assert!((cl - Point3::new(4.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_ball_push_backward_gives_positive_distance() {
        let wall = Triangle::from_arrays([5.0, -5.0, 0.0], [5.0, 5.0, 0.0], [5.0, 0.0, 10.0]);
        let cutter = BallCutter::new(1.0, 10.0);
        let (cl, d) = cutter
            .intersect(&Point3::new(10.0, 0.0, 1.0), &-Vec3::x(), &wall)
            .unwrap();
        assert!((d - 4.0).abs() < 1e-9, "got {d}");
        assert!((cl.x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ball_push_over_low_triangle() {
        // Floor far below the tool: no contact
        let cutter = BallCutter::new(1.0, 10.0);
        let hit = cutter.intersect(&Point3::new(0.0, 0.0, 5.0), &Vec3::x(), &flat_floor());
        assert!(hit.is_none());
    }

    #[test]
    fn test_ball_push_hits_vertex() {
        // Spike whose apex pokes up in front of the sphere
        let spike = Triangle::from_arrays([5.0, -1.0, 0.0], [5.0, 1.0, 0.0], [5.0, 0.0, 0.5]);
        let cutter = BallCutter::new(1.0, 10.0);
        let (_, d) = cutter
            .intersect(&Point3::new(0.0, 0.0, 0.0), &Vec3::x(), &spike)
            .unwrap();
        // Sphere center at z = 1, touches apex at z = 0.5: dx = sqrt(1 - 0.25)
        let expected = 5.0 - 0.75_f64.sqrt();
        assert!((d - expected).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn test_ball_shank_catches_tall_wall() {
        // Thin plate floating above the sphere, reachable only by the shank
        let plate = Triangle::from_arrays([5.0, -5.0, 4.0], [5.0, 5.0, 4.0], [5.0, 0.0, 6.0]);
        let short = BallCutter::new(1.0, 1.0);
        assert!(short
            .intersect(&Point3::new(0.0, 0.0, 0.0), &Vec3::x(), &plate)
            .is_none());

        let long = BallCutter::new(1.0, 10.0);
        let (_, d) = long
            .intersect(&Point3::new(0.0, 0.0, 0.0), &Vec3::x(), &plate)
            .unwrap();
        assert!((d - 4.0).abs() < 1e-9, "got {d}");
    }
}
