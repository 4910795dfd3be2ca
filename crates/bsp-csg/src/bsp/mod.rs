//! Binary Space Partitioning tree for 3D polygon management.
//!
//! This module provides a BSP tree implementation that recursively partitions
//! 3D space using planes derived from input polygons. A tree built from the
//! faces of a closed mesh describes that mesh's volume, which is what the
//! Boolean operations on [`Solid`](crate::Solid) work on:
//!
//! - [`BspNode::clip_polygons`] / [`BspNode::clip_to`] cut away what lies inside another tree
//! - [`BspNode::invert`] turns a volume into its complement
//! - [`BspNode::build`] merges more polygons into an existing tree
//!
//! # Example
//!
//! ```ignore
//! use bsp_csg::bsp::{BspNode, BspVisitor};
//! use bsp_csg::Polygon;
//! use nalgebra::Point3;
//!
//! struct Count(usize);
//!
//! impl BspVisitor for Count {
//!     fn visit(&mut self, polygons: &[Polygon]) {
//!         self.0 += polygons.len();
//!     }
//! }
//!
//! let mut a = BspNode::from_polygons(/* faces of A */);
//! let b = BspNode::from_polygons(/* faces of B */);
//!
//! // Drop the parts of A's surface that are inside B
//! a.clip_to(&b);
//!
//! // Back-to-front order for painter's algorithm rendering
//! let mut count = Count(0);
//! a.traverse_back_to_front(&Point3::new(0.0, 0.0, 10.0), &mut count);
//! ```
//!
//! # Architecture
//!
//! - [`BspNode`]: A splitting plane, the polygons on it, and two owned subtrees
//! - [`BspVisitor`]: Visitor trait for custom traversal behavior

mod node;
mod visitor;

// Re-export main types
pub use node::BspNode;
pub use visitor::BspVisitor;
