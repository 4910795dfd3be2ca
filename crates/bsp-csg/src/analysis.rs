//! Measurements on meshes and polygon soups: volume, bounds and point
//! containment.

use nalgebra::{Point3, Vector3};

use crate::mesh::MeshBuffers;
use crate::Polygon;

/// Rays shorter than this (or nearly parallel to a triangle) don't count.
const RAY_EPSILON: f64 = 1e-9;

/// Ray directions for containment voting. Deliberately off-axis so rays from
/// points on a grid don't run along the diagonals of axis-aligned faces.
const RAY_DIRECTIONS: [[f64; 3]; 5] = [
    [0.8731, 0.3142, 0.3729],
    [-0.4217, 0.8563, 0.2981],
    [-0.2864, -0.3517, 0.8911],
    [0.3313, -0.7892, -0.5171],
    [-0.6911, 0.1903, -0.6971],
];

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Size along each axis.
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Centre of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Volume enclosed by a closed, outward-facing triangle mesh.
///
/// Negative for inside-out meshes.
pub fn signed_volume(mesh: &MeshBuffers) -> f64 {
    mesh.triangles()
        .map(|[a, b, c]| tetra_volume(&a, &b, &c))
        .sum()
}

/// Volume enclosed by a closed set of convex polygons.
pub fn signed_volume_of_polygons(polygons: &[Polygon]) -> f64 {
    polygons
        .iter()
        .map(|polygon| {
            let v = polygon.vertices();
            (1..v.len() - 1)
                .map(|j| tetra_volume(&v[0].position, &v[j].position, &v[j + 1].position))
                .sum::<f64>()
        })
        .sum()
}

fn tetra_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
}

/// Bounds of the vertices referenced by the mesh's triangles, `None` for an
/// empty mesh.
pub fn bounds(mesh: &MeshBuffers) -> Option<Aabb> {
    let mut corners = mesh.indices.iter().map(|&i| mesh.position(i as usize));
    let first = corners.next()?;
    Some(corners.fold(Aabb { min: first, max: first }, |b, p| Aabb {
        min: b.min.inf(&p),
        max: b.max.sup(&p),
    }))
}

/// Tests whether `point` is inside a closed mesh.
///
/// Casts several rays and counts surface crossings along each; a ray with an
/// odd count votes "inside". The majority wins, which rides out rays that
/// graze an edge or vertex.
pub fn contains_point(mesh: &MeshBuffers, point: &Point3<f64>) -> bool {
    let votes = RAY_DIRECTIONS
        .iter()
        .filter(|dir| {
            let dir = Vector3::new(dir[0], dir[1], dir[2]);
            let hits = mesh
                .triangles()
                .filter(|[a, b, c]| ray_hits_triangle(point, &dir, a, b, c))
                .count();
            hits % 2 == 1
        })
        .count();
    votes * 2 > RAY_DIRECTIONS.len()
}

/// Möller–Trumbore ray/triangle test, forward hits only.
fn ray_hits_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> bool {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);
    // Parallel, or a zero-area triangle
    if a.abs() < RAY_EPSILON {
        return false;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    f * edge2.dot(&q) > RAY_EPSILON
}
