//! Visitor pattern for BSP tree traversal.
//!
//! Visitors allow custom processing of polygons during tree traversal
//! without coupling traversal logic to specific use cases.

use nalgebra::Point3;

use crate::{PointSide, Polygon};

use super::node::{grow, BspNode};

/// Visitor for processing polygons during BSP tree traversal.
///
/// Implement this trait to define custom behavior when traversing the tree,
/// such as painter's-algorithm rendering.
pub trait BspVisitor {
    /// Called for each group of coplanar polygons during traversal.
    ///
    /// The polygons passed to this method are all coplanar with each other
    /// and belong to the same BSP node.
    fn visit(&mut self, polygons: &[Polygon]);
}

impl BspNode {
    /// Traverses the tree back-to-front relative to the given viewpoint.
    ///
    /// The visitor is called once per non-empty node, farthest polygons
    /// first. This is the order the painter's algorithm draws in.
    pub fn traverse_back_to_front<V: BspVisitor>(&self, eye: &Point3<f64>, visitor: &mut V) {
        let Some(plane) = self.plane() else {
            return;
        };

        let (near, far) = if plane.classify_point(eye) == PointSide::Back {
            (self.back(), self.front())
        } else {
            (self.front(), self.back())
        };

        if let Some(child) = far {
            grow(|| child.traverse_back_to_front(eye, visitor));
        }
        if !self.polygons().is_empty() {
            visitor.visit(self.polygons());
        }
        if let Some(child) = near {
            grow(|| child.traverse_back_to_front(eye, visitor));
        }
    }
}
