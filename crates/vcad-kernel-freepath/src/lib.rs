#![warn(missing_docs)]

//! Collision-free scan-line paths for vcad CAM.
//!
//! Given a triangulated surface and a cutting tool, this crate finds the
//! parts of a straight horizontal line at a fixed height along which the tool
//! can travel without cutting into the model.
//!
//! # Scanners
//!
//! - [`free_paths_analytic`] - exact contacts of the cutter with every nearby
//!   triangle, resolved with the [`drop_height`] probe
//! - [`free_paths_adaptive`] - bisection driven by a [`CollisionProbe`],
//!   accurate to `length / 2^depth`
//!
//! Both return a flat point list in which each consecutive pair is one free
//! segment; [`segments`] reads it as [`FreePath`] values.
//!
//! # Example
//!
//! ```
//! use vcad_kernel_freepath::{
//!     cutter::cutter_for, free_paths_analytic, segments, MeshModel, ScanWindow, Tolerance, Tool,
//! };
//!
//! // A flat plate at z = -1
//! let vertices = [[0.0, 0.0, -1.0], [20.0, 0.0, -1.0], [20.0, 20.0, -1.0], [0.0, 20.0, -1.0]];
//! let model = MeshModel::new(&vertices, &[0, 1, 2, 0, 2, 3], 5.0).unwrap();
//! let cutter = cutter_for(&Tool::default_ball()).unwrap();
//!
//! let window = ScanWindow::along_x(0.0, 20.0, 10.0);
//! let tolerance = Tolerance::DEFAULT;
//! let points = free_paths_analytic(&model, cutter.as_ref(), &window, 0.0, &tolerance).unwrap();
//! assert_eq!(segments(&points).len(), 1);
//! ```

mod adaptive;
mod analytic;
mod collider;
pub mod cutter;
mod error;
mod height;
mod hit;
mod model;
mod path;
mod tool;
mod window;

// Re-exports
pub use adaptive::{free_paths_adaptive, CollisionProbe, Drill, DrillSweep, StatefulProbe};
pub use analytic::{collect_free_paths, free_paths_analytic};
pub use collider::{MeshCollider, ToolBody};
pub use error::{FreePathError, Result};
pub use height::{drop_height, Support};
pub use hit::{dedup_hits, sort_hits, Approach, Hit};
pub use model::{Aabb3, MeshModel, SurfaceModel, Triangle};
pub use path::{free_length, segments, FreePath};
pub use tool::Tool;
pub use vcad_kernel_math::{Point3, Tolerance, ToleranceError, Vec3};
pub use window::ScanWindow;
