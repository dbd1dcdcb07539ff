//! Surface model access: triangles and bounded triangle queries.
//!
//! The scanners only see a model through [`SurfaceModel`]. [`MeshModel`] is
//! the in-crate implementation, a triangle list with a uniform 2D grid for
//! bounded lookups.

use std::collections::HashMap;

use vcad_kernel_math::{Point3, Vec3};

use crate::error::{FreePathError, Result};

/// A surface triangle with precomputed plane data.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Vertex positions, counter-clockwise seen from outside.
    pub v: [Point3; 3],
    normal: Vec3,
    /// Plane equation: normal · p = d
    pub d: f64,
    /// 2D bounding box [min_x, min_y, max_x, max_y].
    pub bbox_2d: [f64; 4],
    /// Z extent (min, max).
    pub z_range: (f64, f64),
}

impl Triangle {
    /// Create a new triangle from vertices.
    ///
    /// The outward normal follows the right-hand rule on `v0 -> v1 -> v2`.
    /// Degenerate triangles get an upward normal.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        let n = (v1 - v0).cross(&(v2 - v0));
        let len = n.norm();
        let normal = if len > 1e-10 { n / len } else { Vec3::z() };
        let d = normal.dot(&v0.coords);

        let min_x = v0.x.min(v1.x).min(v2.x);
        let min_y = v0.y.min(v1.y).min(v2.y);
        let max_x = v0.x.max(v1.x).max(v2.x);
        let max_y = v0.y.max(v1.y).max(v2.y);
        let min_z = v0.z.min(v1.z).min(v2.z);
        let max_z = v0.z.max(v1.z).max(v2.z);

        Self {
            v: [v0, v1, v2],
            normal,
            d,
            bbox_2d: [min_x, min_y, max_x, max_y],
            z_range: (min_z, max_z),
        }
    }

    /// Create a triangle from raw coordinates.
    pub fn from_arrays(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> Self {
        Self::new(Point3::from(v0), Point3::from(v1), Point3::from(v2))
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance of `p` from the triangle plane (positive outside).
    pub fn plane_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.d
    }

    /// Get the Z coordinate on the triangle plane at (x, y).
    /// Returns None if the normal is nearly horizontal.
    pub fn z_at_xy(&self, x: f64, y: f64) -> Option<f64> {
        if self.normal.z.abs() < 1e-10 {
            return None;
        }
        Some((self.d - self.normal.x * x - self.normal.y * y) / self.normal.z)
    }

    /// Check if point (x, y) is inside the triangle in 2D projection.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        let [v0, v1, v2] = &self.v;

        let d00 = (v1.x - v0.x) * (v1.x - v0.x) + (v1.y - v0.y) * (v1.y - v0.y);
        let d01 = (v1.x - v0.x) * (v2.x - v0.x) + (v1.y - v0.y) * (v2.y - v0.y);
        let d11 = (v2.x - v0.x) * (v2.x - v0.x) + (v2.y - v0.y) * (v2.y - v0.y);
        let d20 = (x - v0.x) * (v1.x - v0.x) + (y - v0.y) * (v1.y - v0.y);
        let d21 = (x - v0.x) * (v2.x - v0.x) + (y - v0.y) * (v2.y - v0.y);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-10 {
            return false;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        // Small negative slack keeps points on shared edges inside
        let eps = -1e-8;
        u >= eps && v >= eps && w >= eps
    }

    /// Check if a point lying on the triangle plane is inside the triangle.
    pub fn contains_on_plane(&self, p: &Point3) -> bool {
        let [v0, v1, v2] = &self.v;
        let e0 = v1 - v0;
        let e1 = v2 - v0;
        let w = p - v0;

        let d00 = e0.dot(&e0);
        let d01 = e0.dot(&e1);
        let d11 = e1.dot(&e1);
        let d20 = w.dot(&e0);
        let d21 = w.dot(&e1);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-10 {
            return false;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        let eps = -1e-8;
        u >= eps && v >= eps && w >= eps
    }

    /// Get the edges of the triangle as line segments.
    pub fn edges(&self) -> [[Point3; 2]; 3] {
        [
            [self.v[0], self.v[1]],
            [self.v[1], self.v[2]],
            [self.v[2], self.v[0]],
        ]
    }
}

/// An axis-aligned box used to bound triangle queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create a box from two corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Whether a triangle's bounds overlap this box.
    pub fn overlaps(&self, tri: &Triangle) -> bool {
        tri.bbox_2d[0] <= self.max.x
            && tri.bbox_2d[2] >= self.min.x
            && tri.bbox_2d[1] <= self.max.y
            && tri.bbox_2d[3] >= self.min.y
            && tri.z_range.0 <= self.max.z
            && tri.z_range.1 >= self.min.z
    }
}

/// Read-only triangle access for the scanners.
pub trait SurfaceModel {
    /// Triangles that can possibly intersect `bounds`, or all triangles when
    /// `bounds` is `None`. Implementations may return extra triangles but
    /// never omit one that touches the box.
    fn triangles(&self, bounds: Option<&Aabb3>) -> Vec<&Triangle>;
}

/// Triangle mesh with a 2D grid accelerator.
#[derive(Debug, Clone)]
pub struct MeshModel {
    triangles: Vec<Triangle>,
    cell_size: f64,
    bounds: [f64; 4], // [min_x, min_y, max_x, max_y]
    grid_nx: usize,
    grid_ny: usize,
    cells: HashMap<(usize, usize), Vec<usize>>,
}

impl MeshModel {
    /// Create a model from vertices and triangle indices.
    ///
    /// # Arguments
    ///
    /// * `vertices` - Vertex positions as [x, y, z]
    /// * `indices` - Triangle indices (groups of 3)
    /// * `cell_size` - Size of grid cells for spatial hashing
    pub fn new(vertices: &[[f64; 3]], indices: &[u32], cell_size: f64) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(FreePathError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for chunk in indices.chunks(3) {
            let mut v = [[0.0; 3]; 3];
            for (slot, &i) in v.iter_mut().zip(chunk) {
                *slot = *vertices.get(i as usize).ok_or_else(|| {
                    FreePathError::InvalidMesh(format!(
                        "index {} out of range for {} vertices",
                        i,
                        vertices.len()
                    ))
                })?;
            }
            triangles.push(Triangle::from_arrays(v[0], v[1], v[2]));
        }

        Self::from_triangles(triangles, cell_size)
    }

    /// Create from flat vertex array (interleaved x, y, z).
    pub fn from_flat_vertices(vertices: &[f64], indices: &[u32], cell_size: f64) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(FreePathError::InvalidMesh(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        let verts: Vec<[f64; 3]> = vertices.chunks(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(&verts, indices, cell_size)
    }

    /// Create a model from ready-made triangles.
    pub fn from_triangles(triangles: Vec<Triangle>, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(FreePathError::InvalidMesh(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        if triangles.is_empty() {
            return Ok(Self {
                triangles,
                cell_size,
                bounds: [0.0; 4],
                grid_nx: 0,
                grid_ny: 0,
                cells: HashMap::new(),
            });
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for tri in &triangles {
            min_x = min_x.min(tri.bbox_2d[0]);
            min_y = min_y.min(tri.bbox_2d[1]);
            max_x = max_x.max(tri.bbox_2d[2]);
            max_y = max_y.max(tri.bbox_2d[3]);
        }

        // Add small padding
        let padding = cell_size * 0.1;
        min_x -= padding;
        min_y -= padding;
        max_x += padding;
        max_y += padding;

        let grid_nx = ((max_x - min_x) / cell_size).ceil() as usize + 1;
        let grid_ny = ((max_y - min_y) / cell_size).ceil() as usize + 1;

        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (tri_idx, tri) in triangles.iter().enumerate() {
            let x0 = ((tri.bbox_2d[0] - min_x) / cell_size).floor() as usize;
            let y0 = ((tri.bbox_2d[1] - min_y) / cell_size).floor() as usize;
            let x1 = ((tri.bbox_2d[2] - min_x) / cell_size).floor() as usize;
            let y1 = ((tri.bbox_2d[3] - min_y) / cell_size).floor() as usize;

            for iy in y0..=y1.min(grid_ny - 1) {
                for ix in x0..=x1.min(grid_nx - 1) {
                    cells.entry((ix, iy)).or_default().push(tri_idx);
                }
            }
        }

        Ok(Self {
            triangles,
            cell_size,
            bounds: [min_x, min_y, max_x, max_y],
            grid_nx,
            grid_ny,
            cells,
        })
    }

    /// Indices of triangles whose grid cells touch the xy range of `bounds`.
    fn candidates(&self, bounds: &Aabb3) -> Vec<usize> {
        if self.triangles.is_empty() {
            return Vec::new();
        }

        let x0 = ((bounds.min.x - self.bounds[0]) / self.cell_size).floor() as isize;
        let y0 = ((bounds.min.y - self.bounds[1]) / self.cell_size).floor() as isize;
        let x1 = ((bounds.max.x - self.bounds[0]) / self.cell_size).floor() as isize;
        let y1 = ((bounds.max.y - self.bounds[1]) / self.cell_size).floor() as isize;

        let mut seen = vec![false; self.triangles.len()];
        for iy in y0.max(0)..=y1.min(self.grid_ny as isize - 1) {
            for ix in x0.max(0)..=x1.min(self.grid_nx as isize - 1) {
                if let Some(indices) = self.cells.get(&(ix as usize, iy as usize)) {
                    for &idx in indices {
                        seen[idx] = true;
                    }
                }
            }
        }

        seen.iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect()
    }

    /// Triangle at `idx`, if there is one.
    pub fn triangle(&self, idx: usize) -> Option<&Triangle> {
        self.triangles.get(idx)
    }

    /// Get all triangles.
    pub fn all_triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the model has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get the Z extent of the mesh.
    pub fn z_bounds(&self) -> (f64, f64) {
        self.triangles
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), tri| {
                (lo.min(tri.z_range.0), hi.max(tri.z_range.1))
            })
    }
}

impl SurfaceModel for MeshModel {
    fn triangles(&self, bounds: Option<&Aabb3>) -> Vec<&Triangle> {
        match bounds {
            None => self.triangles.iter().collect(),
            Some(b) => self
                .candidates(b)
                .into_iter()
                .map(|i| &self.triangles[i])
                .filter(|tri| b.overlaps(tri))
                .collect(),
        }
    }
}

impl SurfaceModel for [Triangle] {
    fn triangles(&self, bounds: Option<&Aabb3>) -> Vec<&Triangle> {
        self.iter()
            .filter(|tri| bounds.map_or(true, |b| b.overlaps(tri)))
            .collect()
    }
}

impl SurfaceModel for Vec<Triangle> {
    fn triangles(&self, bounds: Option<&Aabb3>) -> Vec<&Triangle> {
        self.as_slice().triangles(bounds)
    }
}
