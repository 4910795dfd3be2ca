//! Convex polygons with per-vertex normals.

use nalgebra::{Point3, Vector3};

use crate::{Plane, Vertex};

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices should be coplanar and in counter-clockwise winding order
/// when viewed from the front (the direction the normal points). The plane is
/// derived from the first three vertices when the polygon is constructed and
/// kept in sync by every operation that reorders them.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// Returns `None` if fewer than 3 vertices are provided. Collinear leading
    /// vertices are accepted and produce a [degenerate](Self::is_degenerate)
    /// polygon.
    pub fn new(vertices: Vec<Vertex>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(
            &vertices[0].position,
            &vertices[1].position,
            &vertices[2].position,
        );
        Some(Self { vertices, plane })
    }

    /// Creates a polygon from bare positions, giving every vertex `normal`.
    pub fn from_positions(positions: &[Point3<f64>], normal: Vector3<f64>) -> Option<Self> {
        Self::new(
            positions
                .iter()
                .map(|p| Vertex::new(*p, normal))
                .collect(),
        )
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Consumes the polygon, returning its vertices.
    #[inline]
    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }

    /// Returns the plane that this polygon lies on.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Returns the unit normal (zero when degenerate).
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal()
    }

    /// Returns the plane offset `normal · vertices[0]`.
    #[inline]
    pub fn w(&self) -> f64 {
        self.plane.w()
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// A polygon never holds fewer than 3 vertices, so this is false.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns `true` if the first three vertices are collinear, so the
    /// polygon has no usable plane.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.plane.is_degenerate()
    }

    /// Turns the polygon around: reverses the winding, flips every vertex
    /// normal and the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Returns a flipped copy of the polygon.
    pub fn flipped(&self) -> Self {
        let mut polygon = self.clone();
        polygon.flip();
        polygon
    }

    /// Computes the area enclosed by the polygon.
    pub fn area(&self) -> f64 {
        let origin = self.vertices[0].position;
        let doubled: Vector3<f64> = self
            .vertices
            .windows(2)
            .skip(1)
            .map(|pair| (pair[0].position - origin).cross(&(pair[1].position - origin)))
            .sum();
        0.5 * doubled.norm()
    }

    /// Computes the centroid (average of the vertex positions).
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|v| v.position.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }
}

impl From<Polygon> for Plane {
    fn from(polygon: Polygon) -> Self {
        polygon.plane
    }
}

impl From<&Polygon> for Plane {
    fn from(polygon: &Polygon) -> Self {
        polygon.plane
    }
}
