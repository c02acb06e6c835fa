//! Incremental Delaunay mesh over a fixed outer triangle, refined around a
//! moving viewer.
//!
//! Vertices are stored as barycentric weights of the outer triangle and
//! inserted with Bowyer-Watson. A [`Refiner`] splits triangles whose
//! circumradius is too coarse for their distance to the viewer.
//!
//! ```rust
//! use lod_mesh::{LodConfig, Mesh, Point, RefineConfig, Refiner};
//!
//! let mut mesh = Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap();
//! let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(10., 2.).unwrap()));
//!
//! let stats = refiner.refine(&mut mesh, &Point::new(5., 3.));
//! assert!(stats.inserted > 0);
//! mesh.validate().unwrap();
//! ```
mod builder;
mod context;
mod domain;
mod edges;
mod error;
mod lod;
mod mesh;
mod observer;
mod points;
mod refine;
pub mod sampling;
mod shape;
mod triangles;
mod utils;
mod validation;

pub use builder::MeshBuilder;
pub use domain::OuterTriangle;
pub use edges::{EdgeId, EdgeStore};
pub use error::{MeshError, ValidationError};
pub use lod::LodConfig;
pub use mesh::{Insertion, Mesh, DEFAULT_TOLERANCE};
pub use observer::Observer;
pub use points::{VertexId, Vertices};
pub use refine::{PassStats, RefineConfig, Refiner, ViewerSource};
pub use shape::{Barycentric, Circumcircle, Edge, Point, Triangle};
pub use triangles::{TriangleId, TriangleStore};

/// exported for callers measuring distances the way the refiner does
pub use utils::{dist2_to_segment, dist2_to_triangle};
