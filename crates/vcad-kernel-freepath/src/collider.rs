//! Collision probe backed by parry3d.
//!
//! The model becomes a parry [`TriMesh`]; each query builds the tool swept
//! along the interval from convex pieces and tests them against the mesh
//! surface. A tool buried entirely inside a closed solid touches no triangle
//! and is not reported.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Point3 as P3, Vector3};
use parry3d::query::intersection_test;
use parry3d::shape::{Capsule, Cuboid, Cylinder, Shape, TriMesh};
use tracing::{debug, warn};

use crate::adaptive::{CollisionProbe, DrillSweep};
use crate::error::{FreePathError, Result};
use crate::model::SurfaceModel;
use crate::Tool;

/// Tool body used for collision tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolBody {
    /// Sphere of `radius` at the tip with a cylindrical shank up to `height`.
    Ball {
        /// Sphere and shank radius.
        radius: f64,
        /// Total tool height above the tip.
        height: f64,
    },
    /// Cylinder of `radius` from the tip up to `height`.
    Flat {
        /// Cylinder radius.
        radius: f64,
        /// Cylinder height.
        height: f64,
    },
}

impl ToolBody {
    /// Body of a vcad tool definition.
    pub fn from_tool(tool: &Tool) -> Result<Self> {
        tool.validate()?;
        let (radius, height) = (tool.radius(), tool.flute_length());
        Ok(match tool {
            Tool::FlatEndMill { .. } => ToolBody::Flat { radius, height },
            Tool::BallEndMill { .. } => ToolBody::Ball { radius, height },
        })
    }
}

/// [`CollisionProbe`] over a triangle mesh.
pub struct MeshCollider {
    mesh: TriMesh,
    body: ToolBody,
}

impl MeshCollider {
    /// Build a collider for `model` and `body`.
    pub fn new<M: SurfaceModel + ?Sized>(model: &M, body: ToolBody) -> Result<Self> {
        let triangles = model.triangles(None);
        if triangles.is_empty() {
            return Err(FreePathError::InvalidMesh(
                "no triangles to collide with".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(triangles.len() * 3);
        let mut indices = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            let base = (i * 3) as u32;
            vertices.extend(tri.v.iter().map(|p| P3::new(p.x as f32, p.y as f32, p.z as f32)));
            indices.push([base, base + 1, base + 2]);
        }

        let mesh = TriMesh::new(vertices, indices)
            .map_err(|e| FreePathError::InvalidMesh(format!("failed to build trimesh: {e:?}")))?;
        debug!(triangles = triangles.len(), "built collision mesh");

        Ok(Self { mesh, body })
    }

    /// Build a collider for a vcad tool definition.
    pub fn for_tool<M: SurfaceModel + ?Sized>(model: &M, tool: &Tool) -> Result<Self> {
        Self::new(model, ToolBody::from_tool(tool)?)
    }

    /// Tool body being tested.
    pub fn body(&self) -> ToolBody {
        self.body
    }

    fn touches(&self, pos: &Isometry3<f32>, shape: &dyn Shape) -> bool {
        match intersection_test(&Isometry3::identity(), &self.mesh, pos, shape) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(?e, "unsupported collision query, treating as blocked");
                true
            }
        }
    }

    /// Cylinder of `radius` between `z_lo` and `z_hi` swept along `sweep`.
    fn body_touches(&self, sweep: &DrillSweep, radius: f32, z_lo: f32, z_hi: f32) -> bool {
        let half_height = (z_hi - z_lo) / 2.0;
        if half_height <= 0.0 {
            return false;
        }
        let z_mid = z_lo + half_height;
        let start = sweep.position;
        let end = sweep.end();

        // parry cylinders run along Y; stand them up along Z
        let cylinder = Cylinder::new(half_height, radius);
        let upright = Vector3::x() * FRAC_PI_2;
        for p in [start, end] {
            let pos = Isometry3::new(Vector3::new(p.x as f32, p.y as f32, z_mid), upright);
            if self.touches(&pos, &cylinder) {
                return true;
            }
        }

        let dx = sweep.extent.x as f32;
        let dy = sweep.extent.y as f32;
        let travel = (dx * dx + dy * dy).sqrt();
        if travel <= 0.0 {
            return false;
        }
        let slab = Cuboid::new(Vector3::new(travel / 2.0, radius, half_height));
        let center = Vector3::new(
            start.x as f32 + dx / 2.0,
            start.y as f32 + dy / 2.0,
            z_mid,
        );
        let pos = Isometry3::new(center, Vector3::z() * dy.atan2(dx));
        self.touches(&pos, &slab)
    }
}

impl CollisionProbe for MeshCollider {
    fn collides(&self, sweep: &DrillSweep) -> bool {
        let z = sweep.position.z as f32;
        match self.body {
            ToolBody::Ball { radius, height } => {
                let r = radius as f32;
                let a = P3::new(sweep.position.x as f32, sweep.position.y as f32, z + r);
                let end = sweep.end();
                let b = P3::new(end.x as f32, end.y as f32, z + r);
                if self.touches(&Isometry3::identity(), &Capsule::new(a, b, r)) {
                    return true;
                }
                self.body_touches(sweep, r, z + r, z + height as f32)
            }
            ToolBody::Flat { radius, height } => {
                self.body_touches(sweep, radius as f32, z, z + height as f32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::free_paths_adaptive;
    use crate::model::{MeshModel, Triangle};
    use crate::window::ScanWindow;
    use vcad_kernel_math::Point3;

    fn pyramid() -> MeshModel {
        let vertices = [
            [4.0, -1.0, -1.0],
            [6.0, -1.0, -1.0],
            [6.0, 1.0, -1.0],
            [4.0, 1.0, -1.0],
            [5.0, 0.0, 3.0],
        ];
        let indices = [0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4];
        MeshModel::new(&vertices, &indices, 2.0).unwrap()
    }

    fn floor(z: f64) -> Vec<Triangle> {
        vec![
            Triangle::from_arrays([0.0, 0.0, z], [10.0, 0.0, z], [10.0, 10.0, z]),
            Triangle::from_arrays([0.0, 0.0, z], [10.0, 10.0, z], [0.0, 10.0, z]),
        ]
    }

    fn sweep(x0: f64, x1: f64, y: f64, z: f64) -> DrillSweep {
        DrillSweep::along(&ScanWindow::along_x(x0, x1, y), z)
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let model: Vec<Triangle> = Vec::new();
        let body = ToolBody::Ball {
            radius: 1.0,
            height: 5.0,
        };
        assert!(matches!(
            MeshCollider::new(&model, body),
            Err(FreePathError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_tool_bodies() {
        let flat = ToolBody::from_tool(&Tool::default_endmill()).unwrap();
        assert_eq!(
            flat,
            ToolBody::Flat {
                radius: 3.0,
                height: 20.0
            }
        );
        let ball = ToolBody::from_tool(&Tool::default_ball()).unwrap();
        assert!(matches!(ball, ToolBody::Ball { radius, .. } if radius == 3.0));
        let broken = Tool::BallEndMill {
            diameter: f64::NAN,
            flute_length: 20.0,
        };
        assert!(matches!(
            ToolBody::from_tool(&broken),
            Err(FreePathError::InvalidTool(_))
        ));
    }

    #[test]
    fn test_ball_above_floor() {
        let model = floor(0.0);
        let collider = MeshCollider::new(
            &model,
            ToolBody::Ball {
                radius: 1.0,
                height: 5.0,
            },
        )
        .unwrap();
        assert!(!collider.collides(&sweep(2.0, 8.0, 5.0, 0.5)));
        assert!(collider.collides(&sweep(2.0, 8.0, 5.0, -0.5)));
    }

    #[test]
    fn test_flat_against_wall() {
        // Vertical wall across the scan line at x = 5
        let model = vec![
            Triangle::from_arrays([5.0, -5.0, -1.0], [5.0, 5.0, -1.0], [5.0, 5.0, 3.0]),
            Triangle::from_arrays([5.0, -5.0, -1.0], [5.0, 5.0, 3.0], [5.0, -5.0, 3.0]),
        ];
        let collider = MeshCollider::new(
            &model,
            ToolBody::Flat {
                radius: 0.5,
                height: 5.0,
            },
        )
        .unwrap();
        assert!(collider.collides(&sweep(0.0, 10.0, 0.0, 0.0)));
        assert!(!collider.collides(&sweep(0.0, 4.0, 0.0, 0.0)));
        assert!(!collider.collides(&sweep(6.0, 10.0, 0.0, 0.0)));
        // Passing over the top of the wall
        assert!(!collider.collides(&sweep(0.0, 10.0, 0.0, 3.5)));
    }

    #[test]
    fn test_ball_shank_catches_overhang() {
        // Horizontal plate well above the ball, within the shank height
        let model = floor(4.0);
        let tall = MeshCollider::new(
            &model,
            ToolBody::Ball {
                radius: 1.0,
                height: 6.0,
            },
        )
        .unwrap();
        assert!(tall.collides(&sweep(2.0, 8.0, 5.0, 0.0)));

        let short = MeshCollider::new(
            &model,
            ToolBody::Ball {
                radius: 1.0,
                height: 1.0,
            },
        )
        .unwrap();
        assert!(!short.collides(&sweep(2.0, 8.0, 5.0, 0.0)));
    }

    #[test]
    fn test_adaptive_scan_around_pyramid() {
        let model = pyramid();
        let collider = MeshCollider::new(
            &model,
            ToolBody::Ball {
                radius: 1.0,
                height: 10.0,
            },
        )
        .unwrap();
        let window = ScanWindow::along_x(0.0, 10.0, 0.0);

        let points = free_paths_adaptive(&collider, &window, 0.0, 4);
        assert_eq!(
            points,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(3.125, 0.0, 0.0),
                Point3::new(6.875, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
            ]
        );

        let above = free_paths_adaptive(&collider, &window, 3.5, 4);
        assert_eq!(above.len(), 2);
    }
}
