//! Constructive Solid Geometry on triangle meshes, using BSP trees.
//!
//! Meshes are ingested into [`Solid`]s, combined with [`Solid::union`],
//! [`Solid::subtract`] and [`Solid::intersect`], and exported back to indexed
//! triangle buffers with [`Solid::to_mesh`].

pub mod analysis;
pub mod bsp;
mod error;
pub mod mesh;
mod plane;
mod polygon;
pub mod primitives;
pub mod reconstruct;
mod solid;
mod vertex;

pub use bsp::BspNode;
pub use error::{Buffer, CsgError, Result};
pub use mesh::{MeshBuffers, MeshDescriptor};
pub use plane::{Classification, Plane, PointSide, Split, PLANE_EPSILON};
pub use polygon::Polygon;
pub use reconstruct::ExportOptions;
pub use solid::Solid;
pub use vertex::Vertex;
