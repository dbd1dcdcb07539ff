//! Candidate events along a scan line.

use vcad_kernel_math::{Point3, Tolerance};

use crate::model::Triangle;

/// Travel direction that produced a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Tool pushed from the scan start towards the scan end.
    Forward,
    /// Tool pushed from the scan start away from the scan end.
    Backward,
}

/// One candidate event (triangle contact or scan boundary) on a scan line.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'m> {
    /// Tool location at the event.
    pub contact: Point3,
    /// Triangle that produced the event; `None` for scan boundaries.
    pub triangle: Option<&'m Triangle>,
    /// Signed distance from the scan start along the scan direction.
    pub position: f64,
    /// Push direction; `None` for scan boundaries.
    pub approach: Option<Approach>,
    /// Highest tool support at `contact`, unknown until resolved.
    pub height: f64,
}

impl<'m> Hit<'m> {
    /// A synthetic scan boundary event.
    pub fn boundary(contact: Point3, position: f64, tolerance: &Tolerance) -> Self {
        Self {
            contact,
            triangle: None,
            position,
            approach: None,
            height: tolerance.unknown_height(),
        }
    }

    /// A contact against `triangle`.
    pub fn contact(
        contact: Point3,
        triangle: &'m Triangle,
        position: f64,
        approach: Approach,
        tolerance: &Tolerance,
    ) -> Self {
        Self {
            contact,
            triangle: Some(triangle),
            position,
            approach: Some(approach),
            height: tolerance.unknown_height(),
        }
    }

    /// Whether this is one of the two scan boundary events.
    pub fn is_boundary(&self) -> bool {
        self.triangle.is_none()
    }
}

/// Stable sort by scan position.
pub fn sort_hits(hits: &mut [Hit<'_>]) {
    hits.sort_by(|a, b| a.position.total_cmp(&b.position));
}

/// Drop every hit within `epsilon / 2` of the last surviving one.
///
/// Expects sorted input. Runs of close hits collapse into their first member;
/// the comparison is always against that survivor, not the neighbour.
pub fn dedup_hits(hits: &mut Vec<Hit<'_>>, epsilon: f64) {
    let half = epsilon / 2.0;
    hits.dedup_by(|hit, kept| (hit.position - kept.position).abs() < half);
}
