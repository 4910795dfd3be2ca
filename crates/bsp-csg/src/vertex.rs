//! Polygon vertices carrying a position and a normal.

use nalgebra::{Point3, Vector3};

/// A polygon corner: position plus the normal carried through clipping.
///
/// Normals are only advisory inside the kernel. Interpolated normals may drift
/// from the surface normal; the exported mesh recomputes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    /// Creates a vertex from a position and a normal.
    #[inline]
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Reverses the normal. Positions never change when a polygon is flipped.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Returns the vertex a fraction `t` of the way towards `other`.
    ///
    /// The position is interpolated linearly. The normal is interpolated and
    /// renormalized; if the blend cancels out, the zero vector is kept.
    pub fn interpolate(&self, other: &Vertex, t: f64) -> Vertex {
        let position = self.position + (other.position - self.position) * t;
        let normal = self.normal.lerp(&other.normal, t);
        Vertex {
            position,
            normal: normalize_or_zero(normal),
        }
    }
}

/// Normalizes `v`, returning the zero vector when `v` has no length.
#[inline]
pub(crate) fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flip_negates_normal_only() {
        let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        v.flip();
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.normal, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn interpolate_midpoint() {
        let a = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let b = Vertex::new(Point3::new(2.0, 4.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let m = a.interpolate(&b, 0.5);

        assert_relative_eq!(m.position, Point3::new(1.0, 2.0, 0.0));
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(m.normal, Vector3::new(expected, expected, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn interpolate_opposite_normals_gives_zero() {
        let a = Vertex::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
        let b = Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let m = a.interpolate(&b, 0.5);
        assert_eq!(m.normal, Vector3::zeros());
    }

    #[test]
    fn interpolate_endpoints() {
        let a = Vertex::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 0.0));
        let b = Vertex::new(Point3::new(3.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(a.interpolate(&b, 0.0).position, a.position);
        assert_relative_eq!(a.interpolate(&b, 1.0).position, b.position);
    }
}
