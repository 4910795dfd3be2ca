//! Mesh generators for common operands, centred on the origin.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use crate::mesh::MeshDescriptor;

/// Corner bit layout: bit 0 selects +X, bit 1 +Y, bit 2 +Z. Each face lists
/// its corners counter-clockwise seen from outside, with its normal.
const CUBOID_FACES: [([usize; 4], [f64; 3]); 6] = [
    ([0, 4, 6, 2], [-1.0, 0.0, 0.0]),
    ([1, 3, 7, 5], [1.0, 0.0, 0.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
    ([2, 6, 7, 3], [0.0, 1.0, 0.0]),
    ([0, 2, 3, 1], [0.0, 0.0, -1.0]),
    ([4, 5, 7, 6], [0.0, 0.0, 1.0]),
];

/// Axis-aligned box with the given edge lengths.
///
/// Each face has its own four vertices so normals stay flat.
pub fn cuboid(size: Vector3<f64>) -> MeshDescriptor {
    let half = size / 2.0;
    let mut positions = Vec::with_capacity(6 * 4 * 3);
    let mut normals = Vec::with_capacity(6 * 4 * 3);
    let mut indices = Vec::with_capacity(6 * 6);

    for (face, (corners, normal)) in CUBOID_FACES.iter().enumerate() {
        for &corner in corners {
            let sign = |bit: usize| if corner & bit != 0 { 1.0 } else { -1.0 };
            positions.extend([
                (half.x * sign(1)) as f32,
                (half.y * sign(2)) as f32,
                (half.z * sign(4)) as f32,
            ]);
            normals.extend((*normal).map(|n| n as f32));
        }
        let base = (face * 4) as u32;
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshDescriptor::new(positions)
        .with_normals(normals)
        .with_indices(indices)
}

/// Cube with edge length `size`.
pub fn cube(size: f64) -> MeshDescriptor {
    cuboid(Vector3::repeat(size))
}

/// Latitude/longitude sphere around the Z axis.
///
/// `segments` is the number of slices around the axis (at least 3), `rings`
/// the number of bands from pole to pole (at least 2).
pub fn uv_sphere(radius: f64, segments: usize, rings: usize) -> MeshDescriptor {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let row = segments + 1;

    let mut positions = Vec::with_capacity((rings + 1) * row * 3);
    let mut normals = Vec::with_capacity((rings + 1) * row * 3);
    for j in 0..=rings {
        let phi = PI * j as f64 / rings as f64;
        for i in 0..=segments {
            let theta = TAU * i as f64 / segments as f64;
            let dir = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            positions.extend((dir * radius).iter().map(|v| *v as f32));
            normals.extend(dir.iter().map(|v| *v as f32));
        }
    }

    let index = |j: usize, i: usize| (j * row + i) as u32;
    let mut indices = Vec::with_capacity(segments * (rings - 1) * 6);
    for j in 0..rings {
        for i in 0..segments {
            let (a, b, c, d) = (index(j, i), index(j + 1, i), index(j + 1, i + 1), index(j, i + 1));
            // Rows 0 and `rings` collapse to the poles
            if j != rings - 1 {
                indices.extend([a, b, c]);
            }
            if j != 0 {
                indices.extend([a, c, d]);
            }
        }
    }

    MeshDescriptor::new(positions)
        .with_normals(normals)
        .with_indices(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{bounds, signed_volume};
    use crate::mesh::MeshBuffers;
    use approx::assert_relative_eq;

    fn buffers(mesh: MeshDescriptor) -> MeshBuffers {
        MeshBuffers {
            positions: mesh.positions,
            normals: mesh.normals.unwrap_or_default(),
            indices: mesh.indices.unwrap_or_default(),
            transform: mesh.transform,
        }
    }

    #[test]
    fn cuboid_is_closed_and_outward() {
        let mesh = cuboid(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 12);

        let mesh = buffers(mesh);
        assert_relative_eq!(signed_volume(&mesh), 6.0, epsilon = 1e-6);

        let b = bounds(&mesh).unwrap();
        assert_relative_eq!(b.min.z, -1.5);
        assert_relative_eq!(b.max.y, 1.0);
    }

    #[test]
    fn cube_faces_match_their_normals() {
        let mesh = buffers(cube(2.0));
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t);
            let face = (b - a).cross(&(c - a)).normalize();
            let i = mesh.indices[t * 3] as usize * 3;
            let normal = Vector3::new(
                mesh.normals[i] as f64,
                mesh.normals[i + 1] as f64,
                mesh.normals[i + 2] as f64,
            );
            assert_relative_eq!(face, normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn sphere_is_closed_with_positive_volume() {
        let mesh = uv_sphere(1.0, 32, 16);
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 32 * 2 + 32 * 14 * 2);

        let volume = signed_volume(&buffers(mesh));
        let exact = 4.0 / 3.0 * PI;
        assert!(volume > 0.9 * exact && volume < exact);
    }

    #[test]
    fn sphere_clamps_tessellation() {
        let mesh = uv_sphere(1.0, 1, 1);
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 3 * 2);
        assert!(signed_volume(&buffers(mesh)) > 0.0);
    }
}
