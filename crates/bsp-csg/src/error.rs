//! Error types for mesh ingestion and export.
//!
//! Geometry degeneracy (slivers, zero-area fragments) is never an error: the
//! kernel drops it silently. Errors are reserved for buffers that break the
//! mesh contract, which can only be detected at the boundary.

use thiserror::Error;

/// Buffer that an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    Positions,
    Normals,
    Transform,
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Buffer::Positions => "positions",
            Buffer::Normals => "normals",
            Buffer::Transform => "transform",
        };
        f.write_str(name)
    }
}

/// Errors raised when a mesh descriptor cannot be turned into a solid, or a
/// solid cannot be turned back into a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    /// The position buffer does not hold whole `[x, y, z]` triples.
    #[error("positions length {len} is not a multiple of 3")]
    PositionsNotTriples { len: usize },

    /// Normals were supplied but do not pair up with the positions.
    #[error("normals length {normals} does not match positions length {positions}")]
    NormalsLengthMismatch { positions: usize, normals: usize },

    /// The index buffer does not hold whole triangles.
    #[error("indices length {len} is not a multiple of 3")]
    IndicesNotTriangles { len: usize },

    /// A non-indexed buffer must hold whole triangles of three vertices each.
    #[error("vertex count {vertices} is not a multiple of 3 for a non-indexed mesh")]
    VerticesNotTriangles { vertices: usize },

    /// An index points past the end of the vertex buffer.
    #[error("index {index} at position {at} is out of range for {vertices} vertices")]
    IndexOutOfRange {
        index: u32,
        at: usize,
        vertices: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite value in {buffer} buffer at offset {offset}")]
    NonFinite { buffer: Buffer, offset: usize },

    /// The solid's transform has no inverse, so results cannot be expressed
    /// back in local space.
    #[error("transform is not invertible")]
    SingularTransform,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CsgError>;
