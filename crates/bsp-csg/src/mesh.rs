//! Triangle buffers exchanged with the host scene.
//!
//! Buffers are flat `f32` arrays (`[x0, y0, z0, x1, ...]`) with optional
//! `u32` indices, the layout a GPU vertex buffer uses. Transforms are 4x4
//! matrices stored column-major.

use nalgebra::{Matrix4, Point3};

use crate::error::{Buffer, CsgError, Result};

/// Input triangle soup for building a [`Solid`](crate::Solid).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDescriptor {
    /// Vertex positions, three floats per vertex.
    pub positions: Vec<f32>,
    /// Per-vertex normals. Missing normals default to `+Z`.
    pub normals: Option<Vec<f32>>,
    /// Triangle indices. Without them, every three vertices form a triangle.
    pub indices: Option<Vec<u32>>,
    /// Local-to-world transform, column-major. Identity when absent.
    pub transform: Option<[f32; 16]>,
}

impl MeshDescriptor {
    /// Creates a non-indexed descriptor from positions only.
    pub fn new(positions: Vec<f32>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    /// Sets per-vertex normals.
    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Sets the index buffer.
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Sets the transform from a matrix.
    pub fn with_transform(mut self, transform: &Matrix4<f64>) -> Self {
        self.transform = Some(to_columns(transform));
        self
    }

    /// Number of vertices in the position buffer.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles the descriptor describes.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Returns the transform as a matrix, identity when absent.
    pub fn transform_matrix(&self) -> Matrix4<f64> {
        match &self.transform {
            Some(columns) => Matrix4::from_iterator(columns.iter().map(|v| *v as f64)),
            None => Matrix4::identity(),
        }
    }

    /// Checks the buffers against each other.
    ///
    /// Every error here is a broken caller contract; nothing downstream can
    /// recover from inconsistent buffer lengths.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(CsgError::PositionsNotTriples {
                len: self.positions.len(),
            });
        }
        check_finite(&self.positions, Buffer::Positions)?;

        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(CsgError::NormalsLengthMismatch {
                    positions: self.positions.len(),
                    normals: normals.len(),
                });
            }
            check_finite(normals, Buffer::Normals)?;
        }

        if let Some(transform) = &self.transform {
            check_finite(transform, Buffer::Transform)?;
        }

        let vertices = self.vertex_count();
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(CsgError::IndicesNotTriangles { len: indices.len() });
                }
                if let Some((at, &index)) = indices
                    .iter()
                    .enumerate()
                    .find(|(_, index)| **index as usize >= vertices)
                {
                    return Err(CsgError::IndexOutOfRange {
                        index,
                        at,
                        vertices,
                    });
                }
            }
            None => {
                if vertices % 3 != 0 {
                    return Err(CsgError::VerticesNotTriangles { vertices });
                }
            }
        }

        Ok(())
    }
}

/// Flattens a matrix into column-major `f32`s.
pub(crate) fn to_columns(matrix: &Matrix4<f64>) -> [f32; 16] {
    let mut columns = [0.0f32; 16];
    for (dst, src) in columns.iter_mut().zip(matrix.iter()) {
        *dst = *src as f32;
    }
    columns
}

fn check_finite(values: &[f32], buffer: Buffer) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(offset) => Err(CsgError::NonFinite { buffer, offset }),
        None => Ok(()),
    }
}

/// Indexed triangle mesh produced by [`Solid::to_mesh`](crate::Solid::to_mesh).
///
/// Positions and normals are in the solid's local space; `transform` maps
/// them back to world space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    /// Local-to-world transform of the exporting solid, column-major.
    pub transform: Option<[f32; 16]>,
}

impl MeshBuffers {
    /// Number of (welded) vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the position of vertex `index`.
    pub fn position(&self, index: usize) -> Point3<f64> {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    /// Returns the corners of triangle `index`.
    pub fn triangle(&self, index: usize) -> [Point3<f64>; 3] {
        let t = &self.indices[index * 3..index * 3 + 3];
        [
            self.position(t[0] as usize),
            self.position(t[1] as usize),
            self.position(t[2] as usize),
        ]
    }

    /// Iterates over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        (0..self.triangle_count()).map(|i| self.triangle(i))
    }

    /// Turns the mesh into a descriptor so it can be ingested again.
    ///
    /// The transform travels along, so the re-ingested solid lands where the
    /// exporting one was.
    pub fn into_descriptor(self) -> MeshDescriptor {
        MeshDescriptor {
            positions: self.positions,
            normals: Some(self.normals),
            indices: Some(self.indices),
            transform: self.transform,
        }
    }
}
