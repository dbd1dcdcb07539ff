//! Cutter geometry: horizontal push contacts and vertical drop contacts.
//!
//! A cutter is located by its tip, the lowest point of the tool. Both
//! queries take that location as an argument, so cutters are plain values
//! that can be shared between scans.
//!
//! # Supported Tool Types
//!
//! - **Flat end mill**: cylinder from the tip upwards
//! - **Ball end mill**: sphere at the tip with a cylindrical shank

mod ball;
mod flat;

pub use ball::BallCutter;
pub use flat::FlatCutter;

use nalgebra::Vector2;
use vcad_kernel_math::{Point3, Vec3};

use crate::error::Result;
use crate::model::Triangle;
use crate::Tool;

/// Contact geometry of a cutting tool against single triangles.
pub trait Cutter {
    /// Horizontal influence radius, used to pad triangle queries.
    fn radius(&self) -> f64;

    /// Push the cutter from `location` along the horizontal unit `direction`
    /// and report where it first touches `triangle`.
    ///
    /// Returns the tool location at contact and the signed travel distance
    /// (negative when the contact lies behind `location`).
    fn intersect(
        &self,
        location: &Point3,
        direction: &Vec3,
        triangle: &Triangle,
    ) -> Option<(Point3, f64)>;

    /// Drop the cutter vertically at the (x, y) of `location` onto
    /// `triangle` and report the tool location of the highest contact.
    fn drop_contact(&self, location: &Point3, triangle: &Triangle) -> Option<Point3>;
}

/// Build the cutter model for a tool definition.
pub fn cutter_for(tool: &Tool) -> Result<Box<dyn Cutter>> {
    tool.validate()?;
    match tool {
        Tool::FlatEndMill {
            diameter,
            flute_length,
        } => Ok(Box::new(FlatCutter::new(diameter / 2.0, *flute_length))),
        Tool::BallEndMill {
            diameter,
            flute_length,
        } => Ok(Box::new(BallCutter::new(diameter / 2.0, *flute_length))),
    }
}

type Vec2 = Vector2<f64>;

fn xy(p: &Point3) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Earliest time the disc `center + t * dir` of radius `r` touches `p`.
fn disc_point_entry(center: Vec2, dir: Vec2, p: Vec2, r: f64) -> Option<f64> {
    let a = dir.dot(&dir);
    if a < 1e-24 {
        return None;
    }
    let w = center - p;
    let b = 2.0 * w.dot(&dir);
    let c = w.dot(&w) - r * r;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    Some((-b - disc.sqrt()) / (2.0 * a))
}

/// Earliest time the moving disc touches the interior of segment `a`-`b`.
fn disc_segment_entry(center: Vec2, dir: Vec2, a: Vec2, b: Vec2, r: f64) -> Option<f64> {
    let e = b - a;
    let len_sq = e.dot(&e);
    if len_sq < 1e-20 {
        return None;
    }
    let m = Vec2::new(-e.y, e.x) / len_sq.sqrt();
    let k = m.dot(&dir);
    if k.abs() < 1e-12 {
        return None;
    }
    let s0 = m.dot(&(center - a));
    let t = ((r - s0) / k).min((-r - s0) / k);
    let q = center + dir * t;
    let u = (q - a).dot(&e) / len_sq;
    (0.0..=1.0).contains(&u).then_some(t)
}

/// Clip a triangle to the slab `z_lo <= z <= z_hi`.
fn clip_to_slab(tri: &Triangle, z_lo: f64, z_hi: f64) -> Vec<Point3> {
    let mut poly: Vec<Point3> = tri.v.to_vec();
    poly = clip_polygon(&poly, |p| p.z - z_lo);
    clip_polygon(&poly, |p| z_hi - p.z)
}

/// Keep the part of `poly` where `side(p) >= 0`.
fn clip_polygon(poly: &[Point3], side: impl Fn(&Point3) -> f64) -> Vec<Point3> {
    let mut out = Vec::with_capacity(poly.len() + 1);
    for (i, cur) in poly.iter().enumerate() {
        let next = &poly[(i + 1) % poly.len()];
        let sc = side(cur);
        let sn = side(next);
        if sc >= 0.0 {
            out.push(*cur);
        }
        if (sc >= 0.0) != (sn >= 0.0) {
            let t = sc / (sc - sn);
            out.push(cur + (next - cur) * t);
        }
    }
    out
}

/// Earliest time a vertical cylinder (axis through `center`, radius `r`,
/// spanning `z_lo..=z_hi`) moving along horizontal `dir` touches `tri`.
fn prism_sweep_entry(
    center: &Point3,
    dir: &Vec3,
    r: f64,
    z_lo: f64,
    z_hi: f64,
    tri: &Triangle,
) -> Option<f64> {
    if z_hi < z_lo {
        return None;
    }
    let poly = clip_to_slab(tri, z_lo, z_hi);
    if poly.is_empty() {
        return None;
    }

    let c = xy(center);
    let d = Vec2::new(dir.x, dir.y);
    let mut best: Option<f64> = None;
    let mut take = |t: Option<f64>| {
        if let Some(t) = t {
            best = Some(best.map_or(t, |b| b.min(t)));
        }
    };

    for (i, p) in poly.iter().enumerate() {
        let q = &poly[(i + 1) % poly.len()];
        take(disc_point_entry(c, d, xy(p), r));
        take(disc_segment_entry(c, d, xy(p), xy(q), r));
    }

    best
}
