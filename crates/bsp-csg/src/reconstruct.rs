//! Turning polygon soups back into indexed triangle meshes.

use std::collections::HashMap;

use log::trace;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::mesh::MeshBuffers;
use crate::Polygon;

/// Highest supported welding precision; beyond this `f32` output can't tell
/// the difference anyway.
pub const MAX_WELD_DECIMALS: u32 = 9;

/// Settings for [`Solid::to_mesh_with`](crate::Solid::to_mesh_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Vertices whose coordinates agree to this many decimal places are
    /// merged into one. Pick it to match the scene's unit scale.
    pub weld_decimals: u32,
    /// Replace the normals carried through clipping with normals computed
    /// from the final triangles.
    pub recompute_normals: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            weld_decimals: 5,
            recompute_normals: true,
        }
    }
}

/// Builds an indexed mesh from `polygons`.
///
/// Each vertex is mapped through `inverse` (world back to local space) and
/// welded with every earlier vertex that rounds to the same coordinates.
/// Polygons are fan-triangulated around their first vertex.
pub fn polygons_to_mesh(
    polygons: &[Polygon],
    inverse: &Matrix4<f64>,
    options: &ExportOptions,
) -> MeshBuffers {
    let scale = 10f64.powi(options.weld_decimals.min(MAX_WELD_DECIMALS) as i32);
    let mut welded: HashMap<[i64; 3], u32> = HashMap::new();
    let mut mesh = MeshBuffers::default();

    for polygon in polygons {
        if polygon.len() < 3 {
            continue;
        }

        let mut corners = Vec::with_capacity(polygon.len());
        for vertex in polygon.vertices() {
            let position = inverse.transform_point(&vertex.position);
            let key = weld_key(&position, scale);
            let index = *welded.entry(key).or_insert_with(|| {
                let index = mesh.vertex_count() as u32;
                mesh.positions
                    .extend([position.x as f32, position.y as f32, position.z as f32]);
                mesh.normals.extend([
                    vertex.normal.x as f32,
                    vertex.normal.y as f32,
                    vertex.normal.z as f32,
                ]);
                index
            });
            corners.push(index);
        }

        for j in 1..corners.len() - 1 {
            mesh.indices.extend([corners[0], corners[j], corners[j + 1]]);
        }
    }

    if options.recompute_normals {
        mesh.normals = compute_vertex_normals(&mesh.positions, &mesh.indices);
    }

    trace!(
        "reconstructed {} polygons into {} vertices, {} triangles",
        polygons.len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

fn weld_key(position: &Point3<f64>, scale: f64) -> [i64; 3] {
    [
        (position.x * scale).round() as i64,
        (position.y * scale).round() as i64,
        (position.z * scale).round() as i64,
    ]
}

/// Computes smooth per-vertex normals for an indexed mesh.
///
/// Face normals are summed unnormalized, so larger triangles weigh more.
/// Vertices that touch no triangle with area get a zero normal.
pub fn compute_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vector3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let mut sums = vec![Vector3::<f32>::zeros(); positions.len() / 3];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2]));
        let face = (c - b).cross(&(a - b));
        for &i in tri {
            sums[i as usize] += face;
        }
    }

    sums.iter()
        .flat_map(|n| {
            let n = n.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            [n.x, n.y, n.z]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(z: f64) -> Polygon {
        Polygon::from_positions(
            &[
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ],
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn fan_triangulates_quads() {
        let mesh = polygons_to_mesh(&[quad(0.0)], &Matrix4::identity(), &ExportOptions::default());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shared_corners_are_welded() {
        let a = Polygon::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::z(),
        )
        .unwrap();
        // Within the welding precision of `a`'s corners
        let b = Polygon::from_positions(
            &[
                Point3::new(1.000_000_1, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 0.999_999_9, 0.0),
            ],
            Vector3::z(),
        )
        .unwrap();

        let mesh = polygons_to_mesh(&[a, b], &Matrix4::identity(), &ExportOptions::default());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn coarser_precision_welds_more() {
        let options = ExportOptions {
            weld_decimals: 0,
            ..ExportOptions::default()
        };
        let tiny = Polygon::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.1, 0.0, 0.0),
                Point3::new(0.0, 0.1, 0.0),
            ],
            Vector3::z(),
        )
        .unwrap();
        let mesh = polygons_to_mesh(&[tiny], &Matrix4::identity(), &options);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.indices, vec![0, 0, 0]);
    }

    #[test]
    fn inverse_transform_is_applied() {
        let inverse = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -5.0));
        let mesh = polygons_to_mesh(&[quad(5.0)], &inverse, &ExportOptions::default());
        assert!(mesh.positions.chunks(3).all(|p| p[2] == 0.0));
    }

    #[test]
    fn normals_are_recomputed_from_faces() {
        let mesh = polygons_to_mesh(&[quad(0.0)], &Matrix4::identity(), &ExportOptions::default());
        for n in mesh.normals.chunks(3) {
            assert_relative_eq!(n[0], 0.0);
            assert_relative_eq!(n[1], 0.0);
            assert_relative_eq!(n[2], 1.0);
        }
    }

    #[test]
    fn carried_normals_kept_when_asked() {
        let options = ExportOptions {
            recompute_normals: false,
            ..ExportOptions::default()
        };
        let mesh = polygons_to_mesh(&[quad(0.0)], &Matrix4::identity(), &options);
        assert_eq!(&mesh.normals[0..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_input_gives_empty_mesh() {
        let mesh = polygons_to_mesh(&[], &Matrix4::identity(), &ExportOptions::default());
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn vertex_normals_are_area_weighted() {
        // Two triangles sharing vertex 0; the larger one dominates
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 3.0, //
            0.0, -3.0, 0.0,
        ];
        let indices = vec![0, 1, 2, 0, 3, 4];
        let normals = compute_vertex_normals(&positions, &indices);

        let n0 = Vector3::new(normals[0], normals[1], normals[2]);
        assert_relative_eq!(n0.norm(), 1.0, epsilon = 1e-6);
        assert!(n0.x.abs() > n0.z.abs());
        // Vertex 1 only touches the first triangle
        assert_eq!(&normals[3..6], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn unreferenced_vertex_gets_zero_normal() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert_eq!(&normals[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn vertex_normals_follow_winding() {
        let positions = vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert_relative_eq!(normals[2], -1.0);
    }
}
