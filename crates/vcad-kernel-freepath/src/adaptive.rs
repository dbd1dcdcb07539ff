//! Adaptive free-path scanner.
//!
//! Instead of intersecting the tool with every triangle, this scanner asks a
//! collision engine whether the tool swept along an interval touches the
//! model, and bisects blocked intervals until the recursion depth runs out.
//! The result is accurate to `length / 2^depth`.

use std::cell::{RefCell, RefMut};

use tracing::{debug, instrument, trace};
use vcad_kernel_math::{Point3, Vec3};

use crate::window::ScanWindow;

/// Tool swept horizontally from `position` to `position + extent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillSweep {
    /// Tool tip at the start of the sweep.
    pub position: Point3,
    /// Horizontal travel of the sweep.
    pub extent: Vec3,
}

impl DrillSweep {
    /// Sweep along the whole scan line of `window` at level `z`.
    pub fn along(window: &ScanWindow, z: f64) -> Self {
        Self {
            position: window.start(z),
            extent: window.extent(),
        }
    }

    /// Tool tip at the end of the sweep.
    pub fn end(&self) -> Point3 {
        self.position + self.extent
    }
}

/// Collision engine queried by [`free_paths_adaptive`].
///
/// Queries take the sweep as an argument, so answering one never changes
/// the answer to the next.
pub trait CollisionProbe {
    /// Whether the swept tool touches the model.
    fn collides(&self, sweep: &DrillSweep) -> bool;
}

impl<P: CollisionProbe + ?Sized> CollisionProbe for &P {
    fn collides(&self, sweep: &DrillSweep) -> bool {
        (**self).collides(sweep)
    }
}

/// Collision engine that keeps the drill shape as mutable state.
pub trait Drill {
    /// Stretch the drill by a sweep vector.
    fn extend_drill(&mut self, dx: f64, dy: f64, dz: f64);
    /// Move the drill tip.
    fn set_drill_position(&mut self, x: f64, y: f64, z: f64);
    /// Test the current drill against the model.
    fn check_collision(&mut self) -> bool;
    /// Restore the unextended drill.
    fn reset_drill(&mut self);
}

/// [`CollisionProbe`] over a stateful [`Drill`].
///
/// Every query resets the drill when it finishes, including when the drill
/// panics.
#[derive(Debug)]
pub struct StatefulProbe<D> {
    drill: RefCell<D>,
}

impl<D: Drill> StatefulProbe<D> {
    /// Wrap a drill.
    pub fn new(drill: D) -> Self {
        Self {
            drill: RefCell::new(drill),
        }
    }

    /// Unwrap the drill.
    pub fn into_inner(self) -> D {
        self.drill.into_inner()
    }
}

struct DrillGuard<'a, D: Drill> {
    drill: RefMut<'a, D>,
}

impl<D: Drill> Drop for DrillGuard<'_, D> {
    fn drop(&mut self) {
        self.drill.reset_drill();
    }
}

impl<D: Drill> CollisionProbe for StatefulProbe<D> {
    fn collides(&self, sweep: &DrillSweep) -> bool {
        let mut guard = DrillGuard {
            drill: self.drill.borrow_mut(),
        };
        let drill = &mut *guard.drill;
        drill.extend_drill(sweep.extent.x, sweep.extent.y, sweep.extent.z);
        drill.set_drill_position(sweep.position.x, sweep.position.y, sweep.position.z);
        drill.check_collision()
    }
}

/// Free segments of the scan line of `window` at level `z`, found by
/// bisecting blocked intervals up to `depth` times.
///
/// Returns a flat point list; each consecutive pair is one segment. An
/// interval that is still blocked at depth zero contributes nothing.
#[instrument(level = "debug", skip(probe))]
pub fn free_paths_adaptive<P>(probe: &P, window: &ScanWindow, z: f64, depth: u32) -> Vec<Point3>
where
    P: CollisionProbe + ?Sized,
{
    let points = scan(probe, window, z, depth);
    debug!(segments = points.len() / 2, "adaptive scan complete");
    points
}

fn scan<P>(probe: &P, window: &ScanWindow, z: f64, depth: u32) -> Vec<Point3>
where
    P: CollisionProbe + ?Sized,
{
    if !probe.collides(&DrillSweep::along(window, z)) {
        return vec![window.start(z), window.end(z)];
    }
    if depth == 0 {
        trace!(?window, "interval blocked");
        return Vec::new();
    }

    let (first, second) = window.split();
    let group1 = scan(probe, &first, z, depth - 1);
    let group2 = scan(probe, &second, z, depth - 1);
    stitch(group1, group2)
}

/// Join two halves, merging the segments that meet at the seam.
fn stitch(mut group1: Vec<Point3>, group2: Vec<Point3>) -> Vec<Point3> {
    let joined = match (group1.last(), group2.first()) {
        (Some(last), Some(first)) => last.x == first.x && last.y == first.y,
        _ => false,
    };
    if joined {
        group1.pop();
        group1.extend_from_slice(&group2[1..]);
    } else {
        group1.extend(group2);
    }
    group1
}
