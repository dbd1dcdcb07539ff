//! Height probe: highest valid tool support at a single location.

use vcad_kernel_math::{Point3, Tolerance};

use crate::cutter::Cutter;
use crate::model::{SurfaceModel, Triangle};

/// Highest support found by [`drop_height`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support<'m> {
    /// Tool tip height, or the unknown height when nothing supports the tool.
    pub height: f64,
    /// Triangle that produced `height`.
    pub triangle: Option<&'m Triangle>,
}

/// Drop `cutter` at the (x, y) of `location` onto every triangle of `model`.
///
/// Triangles facing downwards are skipped. Contacts at or above the
/// tolerance's infinite sentinel are not real contacts and are ignored.
pub fn drop_height<'m, M, C>(
    cutter: &C,
    model: &'m M,
    location: &Point3,
    tolerance: &Tolerance,
) -> Support<'m>
where
    M: SurfaceModel + ?Sized,
    C: Cutter + ?Sized,
{
    let mut best = Support {
        height: tolerance.unknown_height(),
        triangle: None,
    };

    for tri in model.triangles(None) {
        if tri.normal().z < 0.0 {
            continue;
        }
        if let Some(cl) = cutter.drop_contact(location, tri) {
            if cl.z > best.height && tolerance.is_valid_height(cl.z) {
                best = Support {
                    height: cl.z,
                    triangle: Some(tri),
                };
            }
        }
    }

    best
}
