//! Plane representation and the polygon splitting step of the BSP kernel.

use nalgebra::{Point3, Vector3};

use crate::vertex::normalize_or_zero;
use crate::Polygon;

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Which side of a plane a point lies on.
///
/// The discriminants are bit flags: OR-ing the sides of every vertex of a
/// polygon yields its [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PointSide {
    /// Point lies on the plane (within epsilon tolerance)
    Coplanar = 0,
    /// Point is in front of the plane (positive side of normal)
    Front = 1,
    /// Point is behind the plane (negative side of normal)
    Back = 2,
}

/// Classification of a whole polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Classification {
    /// All vertices are on the plane
    Coplanar = 0,
    /// No vertex is behind the plane, at least one is in front
    Front = 1,
    /// No vertex is in front of the plane, at least one is behind
    Back = 2,
    /// Vertices are on both sides
    Spanning = 3,
}

impl Classification {
    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Classification::Coplanar,
            1 => Classification::Front,
            2 => Classification::Back,
            _ => Classification::Spanning,
        }
    }
}

/// Where a polygon ends up after being split by a plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// On the plane, facing the same way as the plane.
    CoplanarFront(Polygon),
    /// On the plane, facing away from the plane.
    CoplanarBack(Polygon),
    /// Entirely in front.
    Front(Polygon),
    /// Entirely behind.
    Back(Polygon),
    /// Straddles the plane. Either piece is `None` when it collapsed below
    /// three vertices.
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

/// A plane in 3D space, represented as `normal · point = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    /// Creates a plane from a normal vector and offset.
    ///
    /// The normal is normalized and the offset scaled to match. A zero normal
    /// is kept as is and describes a degenerate plane.
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        let norm = normal.norm();
        if norm > 0.0 {
            Self {
                normal: normal / norm,
                w: w / norm,
            }
        } else {
            Self {
                normal: Vector3::zeros(),
                w: 0.0,
            }
        }
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(c - b) × (a - b)`, which follows the counter-clockwise
    /// winding `a -> b -> c`. Collinear points give a zero normal.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let normal = normalize_or_zero((c - b).cross(&(a - b)));
        Self {
            normal,
            w: normal.dot(&a.coords),
        }
    }

    /// Returns the unit normal (zero for a degenerate plane).
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Returns `true` if the normal has no direction.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vector3::zeros()
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classifies which side of the plane a point lies on, using [`PLANE_EPSILON`].
    #[inline]
    pub fn classify_point(&self, point: &Point3<f64>) -> PointSide {
        let t = self.signed_distance(point);
        if t < -PLANE_EPSILON {
            PointSide::Back
        } else if t > PLANE_EPSILON {
            PointSide::Front
        } else {
            PointSide::Coplanar
        }
    }

    /// Classifies a polygon as the union of the sides of its vertices.
    pub fn classify(&self, polygon: &Polygon) -> Classification {
        let bits = polygon
            .vertices()
            .iter()
            .fold(0u8, |acc, v| acc | self.classify_point(&v.position) as u8);
        Classification::from_bits(bits)
    }

    /// Flips the plane in place.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Splits `polygon` by this plane.
    ///
    /// Coplanar polygons are told apart by the direction of their own normal.
    /// Spanning polygons are cut along every edge that crosses the plane;
    /// both pieces keep the original winding.
    pub fn split_polygon(&self, polygon: Polygon) -> Split {
        let sides: Vec<PointSide> = polygon
            .vertices()
            .iter()
            .map(|v| self.classify_point(&v.position))
            .collect();
        let bits = sides.iter().fold(0u8, |acc, side| acc | *side as u8);

        match Classification::from_bits(bits) {
            Classification::Coplanar => {
                if self.normal.dot(&polygon.plane().normal()) > 0.0 {
                    Split::CoplanarFront(polygon)
                } else {
                    Split::CoplanarBack(polygon)
                }
            }
            Classification::Front => Split::Front(polygon),
            Classification::Back => Split::Back(polygon),
            Classification::Spanning => self.split_spanning(&polygon, &sides),
        }
    }

    fn split_spanning(&self, polygon: &Polygon, sides: &[PointSide]) -> Split {
        let vertices = polygon.vertices();
        let count = vertices.len();
        let mut front = Vec::with_capacity(count + 1);
        let mut back = Vec::with_capacity(count + 1);

        for i in 0..count {
            let j = (i + 1) % count;
            let (ti, tj) = (sides[i], sides[j]);
            let (vi, vj) = (&vertices[i], &vertices[j]);

            if ti != PointSide::Back {
                front.push(*vi);
            }
            if ti != PointSide::Front {
                back.push(*vi);
            }

            if (ti as u8 | tj as u8) == Classification::Spanning as u8 {
                let t = (self.w - self.normal.dot(&vi.position.coords))
                    / self.normal.dot(&(vj.position - vi.position));
                let v = vi.interpolate(vj, t);
                front.push(v);
                back.push(v);
            }
        }

        Split::Spanning {
            front: Polygon::new(front),
            back: Polygon::new(back),
        }
    }
}
