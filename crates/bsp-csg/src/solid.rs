//! Solids: closed meshes held as BSP trees, and the Boolean operations on them.

use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::bsp::BspNode;
use crate::error::{CsgError, Result};
use crate::mesh::{to_columns, MeshBuffers, MeshDescriptor};
use crate::reconstruct::{polygons_to_mesh, ExportOptions};
use crate::{Polygon, Vertex};

/// Normal given to vertices of meshes that carry none.
const DEFAULT_NORMAL: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// A closed volume, stored in world space as a BSP tree.
///
/// Solids never change after construction. Every Boolean operation works on
/// private copies of both operand trees and returns a new solid.
///
/// # Example
///
/// ```ignore
/// use bsp_csg::{primitives, Solid};
/// use nalgebra::Vector3;
///
/// let a = Solid::from_mesh(&primitives::cube(1.0), None)?;
/// let b = Solid::from_mesh(&primitives::uv_sphere(0.6, 24, 12), None)?;
///
/// let carved = a.subtract(&b);
/// let mesh = carved.to_mesh()?;
/// ```
#[derive(Debug, Clone)]
pub struct Solid {
    transform: Matrix4<f64>,
    root: BspNode,
}

impl Default for Solid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Solid {
    /// A solid enclosing nothing, with the identity transform.
    pub fn empty() -> Self {
        Self {
            transform: Matrix4::identity(),
            root: BspNode::new(),
        }
    }

    /// Ingests a triangle mesh.
    ///
    /// Every position is mapped to world space by `transform`, falling back
    /// to the descriptor's own transform and then to identity. One polygon is
    /// created per triangle; zero-area triangles are accepted here and
    /// discarded while the tree is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers are inconsistent (see
    /// [`MeshDescriptor::validate`]).
    pub fn from_mesh(mesh: &MeshDescriptor, transform: Option<Matrix4<f64>>) -> Result<Self> {
        mesh.validate()?;
        let transform = transform.unwrap_or_else(|| mesh.transform_matrix());

        let vertex = |index: usize| {
            let p = &mesh.positions[index * 3..index * 3 + 3];
            let local = Point3::new(p[0] as f64, p[1] as f64, p[2] as f64);
            let position = transform.transform_point(&local);
            let normal = match &mesh.normals {
                Some(normals) => {
                    let n = &normals[index * 3..index * 3 + 3];
                    Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64)
                }
                None => DEFAULT_NORMAL,
            };
            Vertex::new(position, normal)
        };

        let triangles = mesh.triangle_count();
        let mut polygons = Vec::with_capacity(triangles);
        for t in 0..triangles {
            let corners = [0, 1, 2].map(|j| match &mesh.indices {
                Some(indices) => indices[t * 3 + j] as usize,
                None => t * 3 + j,
            });
            polygons.extend(Polygon::new(corners.map(vertex).to_vec()));
        }

        debug!("ingested {} triangles", polygons.len());
        Ok(Self::from_polygons(polygons, transform))
    }

    /// Builds a solid from world-space polygons.
    pub fn from_polygons(polygons: Vec<Polygon>, transform: Matrix4<f64>) -> Self {
        Self {
            transform,
            root: BspNode::from_polygons(polygons),
        }
    }

    /// The transform that maps this solid's local space to world space.
    #[inline]
    pub fn transform(&self) -> &Matrix4<f64> {
        &self.transform
    }

    /// The root of the BSP tree.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    /// All polygons of the surface, in world space.
    pub fn polygons(&self) -> Vec<Polygon> {
        self.root.all_polygons()
    }

    /// Number of polygons on the surface.
    pub fn polygon_count(&self) -> usize {
        self.root.polygon_count()
    }

    /// Returns `true` if the solid has no surface.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the space covered by either solid.
    ///
    /// The result keeps `self`'s transform.
    pub fn union(&self, other: &Solid) -> Solid {
        if self.is_empty() || other.is_empty() {
            let mut polygons = self.polygons();
            polygons.extend(other.polygons());
            return self.with_polygons(polygons);
        }

        let mut a = self.root.clone();
        let mut b = other.root.clone();

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.into_polygons());

        self.finish("union", other, a)
    }

    /// Returns the space covered by `self` but not by `other`.
    ///
    /// The result keeps `self`'s transform.
    pub fn subtract(&self, other: &Solid) -> Solid {
        if self.is_empty() || other.is_empty() {
            return self.with_polygons(self.polygons());
        }

        let mut a = self.root.clone();
        let mut b = other.root.clone();

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.into_polygons());
        a.invert();

        self.finish("subtract", other, a)
    }

    /// Returns the space covered by both solids.
    ///
    /// The result keeps `self`'s transform.
    pub fn intersect(&self, other: &Solid) -> Solid {
        if self.is_empty() || other.is_empty() {
            return self.with_polygons(Vec::new());
        }

        let mut a = self.root.clone();
        let mut b = other.root.clone();

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(b.into_polygons());
        a.invert();

        self.finish("intersect", other, a)
    }

    /// Wraps the working tree of an operation into a fresh solid.
    ///
    /// The working tree still holds planes of faces that were clipped away,
    /// so the result is rebuilt from its surviving polygons.
    fn finish(&self, operation: &str, other: &Solid, tree: BspNode) -> Solid {
        let result = self.with_polygons(tree.into_polygons());
        debug!(
            "{}: {} + {} polygons -> {} polygons",
            operation,
            self.polygon_count(),
            other.polygon_count(),
            result.polygon_count()
        );
        result
    }

    fn with_polygons(&self, polygons: Vec<Polygon>) -> Solid {
        Solid::from_polygons(polygons, self.transform)
    }

    /// Exports the surface as an indexed mesh in this solid's local space,
    /// with the default [`ExportOptions`].
    pub fn to_mesh(&self) -> Result<MeshBuffers> {
        self.to_mesh_with(&ExportOptions::default())
    }

    /// Exports the surface as an indexed mesh in this solid's local space.
    ///
    /// The mesh carries this solid's transform, so
    /// [`MeshBuffers::into_descriptor`] re-ingests it in the same place.
    ///
    /// # Errors
    ///
    /// Returns [`CsgError::SingularTransform`] if the transform cannot be
    /// inverted.
    pub fn to_mesh_with(&self, options: &ExportOptions) -> Result<MeshBuffers> {
        let inverse = self
            .transform
            .try_inverse()
            .ok_or(CsgError::SingularTransform)?;
        let mut mesh = polygons_to_mesh(&self.polygons(), &inverse, options);
        mesh.transform = Some(to_columns(&self.transform));
        Ok(mesh)
    }
}
