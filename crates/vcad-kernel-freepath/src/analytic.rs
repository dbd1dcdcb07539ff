//! Analytic free-path scanner.
//!
//! Pushes the cutter along the scan line against every nearby triangle,
//! collects the contacts as [`Hit`]s, resolves the support height at each
//! and walks them in order to find the stretches where the tool fits.

use tracing::{debug, instrument, trace};
use vcad_kernel_math::{Point3, Tolerance, Vec3};

use crate::cutter::Cutter;
use crate::error::{FreePathError, Result};
use crate::height::drop_height;
use crate::hit::{dedup_hits, sort_hits, Approach, Hit};
use crate::model::{Aabb3, SurfaceModel};
use crate::window::ScanWindow;

/// Free segments of the scan line from `window.start(z)` to `window.end(z)`.
///
/// Returns a flat point list; each consecutive pair is one segment.
///
/// # Errors
///
/// [`FreePathError::DegenerateScanLine`] for a zero-length window and
/// [`FreePathError::InvalidTolerance`] for unusable tolerances.
#[instrument(level = "debug", skip(model, cutter, tolerance))]
pub fn free_paths_analytic<M, C>(
    model: &M,
    cutter: &C,
    window: &ScanWindow,
    z: f64,
    tolerance: &Tolerance,
) -> Result<Vec<Point3>>
where
    M: SurfaceModel + ?Sized,
    C: Cutter + ?Sized,
{
    tolerance.validate()?;
    let eps = tolerance.epsilon;

    let length = window.length();
    if !length.is_finite() || length <= 0.0 {
        return Err(FreePathError::DegenerateScanLine { length });
    }

    let mut hits = collect_hits(model, cutter, window, z, tolerance);
    for hit in &mut hits {
        hit.height = drop_height(cutter, model, &hit.contact, tolerance).height;
        trace!(
            position = hit.position,
            height = hit.height,
            boundary = hit.is_boundary(),
            "resolved hit"
        );
    }

    let points = collect_free_paths(&hits, z, eps);
    debug!(
        hits = hits.len(),
        segments = points.len() / 2,
        "analytic scan complete"
    );
    Ok(points)
}

/// Contact bursts and both end points of the scan line, sorted along the
/// line and deduplicated. Heights are not resolved yet.
///
/// `window` must have a positive length.
pub(crate) fn collect_hits<'m, M, C>(
    model: &'m M,
    cutter: &C,
    window: &ScanWindow,
    z: f64,
    tolerance: &Tolerance,
) -> Vec<Hit<'m>>
where
    M: SurfaceModel + ?Sized,
    C: Cutter + ?Sized,
{
    let eps = tolerance.epsilon;
    let length = window.length();
    let extent = window.extent();
    let forward = Vec3::new(extent.x.abs(), extent.y.abs(), 0.0) / length;
    let backward = -forward;
    let forward_small = forward * eps;
    let backward_small = backward * eps;

    let start = window.start(z);
    let end = window.end(z);

    // Everything the tool can reach from the level upwards
    let r = cutter.radius();
    let bounds = Aabb3::new(
        Point3::new(
            window.min_x.min(window.max_x) - r,
            window.min_y.min(window.max_y) - r,
            z,
        ),
        Point3::new(
            window.min_x.max(window.max_x) + r,
            window.min_y.max(window.max_y) + r,
            tolerance.infinite,
        ),
    );
    let triangles = model.triangles(Some(&bounds));

    let mut hits = Vec::with_capacity(2 + 6 * triangles.len());
    hits.push(Hit::boundary(start, 0.0, tolerance));

    for &tri in &triangles {
        // Normals point outward and the model is approached from outside,
        // so a triangle only stops the tool coming against its normal.
        let n = tri.normal().dot(&forward);
        if n >= 0.0 {
            if let Some((cl, d)) = cutter.intersect(&start, &backward, tri) {
                hits.push(Hit::contact(cl, tri, -d, Approach::Backward, tolerance));
                hits.push(Hit::contact(
                    cl - backward_small,
                    tri,
                    -d + eps,
                    Approach::Backward,
                    tolerance,
                ));
                hits.push(Hit::contact(
                    cl + backward_small,
                    tri,
                    -d - eps,
                    Approach::Backward,
                    tolerance,
                ));
            }
        }
        if n <= 0.0 {
            if let Some((cl, d)) = cutter.intersect(&start, &forward, tri) {
                hits.push(Hit::contact(cl, tri, d, Approach::Forward, tolerance));
                hits.push(Hit::contact(
                    cl + forward_small,
                    tri,
                    d + eps,
                    Approach::Forward,
                    tolerance,
                ));
                hits.push(Hit::contact(
                    cl - forward_small,
                    tri,
                    d - eps,
                    Approach::Forward,
                    tolerance,
                ));
            }
        }
    }

    hits.push(Hit::boundary(end, length, tolerance));
    debug!(
        triangles = triangles.len(),
        hits = hits.len(),
        "collected scan line hits"
    );

    sort_hits(&mut hits);
    dedup_hits(&mut hits, eps);
    hits
}

/// Walk resolved hits in order and emit the clear stretches between blocked
/// ones.
///
/// A hit is blocked when its height is at or above `z - epsilon / 10` and
/// clear when at or below `z + epsilon / 10`. A hit inside both bands first
/// closes the open segment and then starts a new one.
pub fn collect_free_paths(hits: &[Hit<'_>], z: f64, epsilon: f64) -> Vec<Point3> {
    let blocked_from = z - epsilon / 10.0;
    let clear_until = z + epsilon / 10.0;

    let mut points = Vec::new();
    let mut begin = hits.first().map(|h| h.contact);
    let mut end = None;

    for hit in hits {
        if hit.height >= blocked_from {
            if let (Some(b), Some(e)) = (begin, end) {
                points.push(b);
                points.push(e);
            }
            begin = None;
            end = None;
        }
        if hit.height <= clear_until {
            if begin.is_none() {
                begin = Some(hit.contact);
            } else {
                end = Some(hit.contact);
            }
        }
    }

    if let (Some(b), Some(e)) = (begin, end) {
        points.push(b);
        points.push(e);
    }

    points
}
