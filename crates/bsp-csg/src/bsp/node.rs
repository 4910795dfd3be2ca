//! BSP tree node implementation and the tree operations CSG is built from.

use log::trace;

use crate::{Plane, Polygon, Split};

/// Stack space that must remain before a recursive step grows the stack.
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated when the red zone is reached.
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[inline]
pub(super) fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}

/// A node in the BSP tree.
///
/// A node describes a volume. Its splitting plane is adopted from the first
/// polygon it is built with; `polygons` holds every polygon lying on that
/// plane, while polygons strictly in front of or behind it live in the
/// respective child subtrees.
///
/// A node without a plane is an empty leaf and represents empty space.
/// Faces point outwards, so "inside" is behind every plane on the path to a
/// missing back child.
///
/// # Coplanar Polygon Storage
///
/// Coplanar polygons facing either way share the one `polygons` list. The
/// facing only matters while clipping, where same-facing polygons are kept on
/// the front side and opposite-facing ones on the back side.
#[derive(Debug, Default)]
pub struct BspNode {
    /// The splitting plane for this node, `None` until the first build.
    plane: Option<Plane>,

    /// Polygons lying on the plane.
    polygons: Vec<Polygon>,

    /// Subtree containing polygons in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree containing polygons BEHIND the splitting plane.
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates an empty node with no plane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node and builds it from `polygons`.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::new();
        node.build(polygons);
        node
    }

    /// Returns the splitting plane, if the node has been built.
    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    /// Returns the polygons lying on this node's plane.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Returns `true` if the subtree holds no polygons at all.
    pub fn is_empty(&self) -> bool {
        self.polygon_count() == 0
    }

    /// Inserts polygons into the tree.
    ///
    /// An unbuilt node adopts the plane of the first usable polygon. Every
    /// polygon is split against this node's plane: coplanar pieces stay here,
    /// front and back pieces are pushed down into child nodes, which are
    /// created on demand. Degenerate polygons are dropped.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let mut polygons = polygons.into_iter().filter(|p| {
            let keep = !p.is_degenerate();
            if !keep {
                trace!("dropping degenerate polygon with {} vertices", p.len());
            }
            keep
        });

        let plane = match self.plane {
            Some(plane) => plane,
            None => {
                let Some(first) = polygons.next() else {
                    return;
                };
                let plane = *first.plane();
                self.plane = Some(plane);
                self.polygons.push(first);
                plane
            }
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                Split::Front(p) => front.push(p),
                Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        if !front.is_empty() {
            let child = self.front.get_or_insert_with(Box::default);
            grow(|| child.build(front));
        }
        if !back.is_empty() {
            let child = self.back.get_or_insert_with(Box::default);
            grow(|| child.build(back));
        }
    }

    /// Removes every part of `polygons` that lies inside the volume of this
    /// tree and returns what is left.
    ///
    /// Polygons on a plane are kept when they face the same way as the plane
    /// and sent inwards otherwise. An empty node clips nothing.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        let mut kept = match self.front.as_deref() {
            Some(node) => grow(|| node.clip_polygons(front)),
            None => front,
        };
        // Behind a plane with no back subtree is solid; nothing survives there
        if let Some(node) = self.back.as_deref() {
            kept.extend(grow(|| node.clip_polygons(back)));
        }
        kept
    }

    /// Removes every part of this tree's polygons that lies inside `other`.
    ///
    /// The tree structure (planes and children) is left untouched.
    pub fn clip_to(&mut self, other: &BspNode) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            node.polygons = other.clip_polygons(std::mem::take(&mut node.polygons));
            if let Some(front) = node.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = node.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    /// Turns the volume inside out.
    ///
    /// Every polygon and plane is flipped and the front and back subtrees
    /// swap places. Inverting twice restores the original tree.
    pub fn invert(&mut self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            if let Some(plane) = node.plane.as_mut() {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
            if let Some(front) = node.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = node.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    /// Collects copies of every polygon in the subtree.
    ///
    /// Order: this node's polygons, then the front subtree, then the back
    /// subtree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            result.extend(node.polygons.iter().cloned());
            if let Some(back) = node.back.as_deref() {
                stack.push(back);
            }
            if let Some(front) = node.front.as_deref() {
                stack.push(front);
            }
        }
        result
    }

    /// Consumes the tree and returns its polygons in [`all_polygons`](Self::all_polygons) order.
    pub fn into_polygons(mut self) -> Vec<Polygon> {
        let mut result = std::mem::take(&mut self.polygons);
        let mut stack: Vec<Box<BspNode>> = Vec::new();
        stack.extend(self.back.take());
        stack.extend(self.front.take());
        while let Some(mut node) = stack.pop() {
            result.append(&mut node.polygons);
            stack.extend(node.back.take());
            stack.extend(node.front.take());
        }
        result
    }

    /// Returns the total number of polygons in this subtree (including all descendants).
    pub fn polygon_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += node.polygons.len();
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
        }
        count
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            if let Some(front) = node.front.as_deref() {
                stack.push((front, depth + 1));
            }
            if let Some(back) = node.back.as_deref() {
                stack.push((back, depth + 1));
            }
        }
        max
    }
}

impl Clone for BspNode {
    /// Deep copy: planes, polygons and both subtrees.
    fn clone(&self) -> Self {
        Self {
            plane: self.plane,
            polygons: self.polygons.clone(),
            front: self.front.as_ref().map(|n| Box::new(grow(|| (**n).clone()))),
            back: self.back.as_ref().map(|n| Box::new(grow(|| (**n).clone()))),
        }
    }
}

impl Drop for BspNode {
    fn drop(&mut self) {
        // Unlink children iteratively so deep trees don't overflow the stack
        let mut stack: Vec<Box<BspNode>> = Vec::new();
        stack.extend(self.front.take());
        stack.extend(self.back.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.front.take());
            stack.extend(node.back.take());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use nalgebra::{Point3, Vector3};

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Polygon {
        Polygon::from_positions(
            &[
                Point3::new(a[0], a[1], a[2]),
                Point3::new(b[0], b[1], b[2]),
                Point3::new(c[0], c[1], c[2]),
            ],
            Vector3::zeros(),
        )
        .unwrap()
    }

    /// Axis-aligned cube from `min` to `max`, two outward-facing triangles per side.
    fn box_polygons(min: [f64; 3], max: [f64; 3]) -> Vec<Polygon> {
        let corner = |i: usize| {
            Point3::new(
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            )
        };
        // Quads wound counter-clockwise seen from outside
        let faces: [[usize; 4]; 6] = [
            [0, 4, 6, 2],
            [1, 3, 7, 5],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 2, 3, 1],
            [4, 5, 7, 6],
        ];
        faces
            .iter()
            .flat_map(|f| {
                [[f[0], f[1], f[2]], [f[0], f[2], f[3]]].map(|tri| {
                    Polygon::from_positions(&tri.map(corner), Vector3::zeros()).unwrap()
                })
            })
            .collect()
    }

    #[test]
    fn new_node_is_empty_leaf() {
        let node = BspNode::new();

        assert!(node.is_leaf());
        assert!(node.plane().is_none());
        assert_eq!(node.polygon_count(), 0);
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn build_empty_keeps_node_unplanned() {
        let mut node = BspNode::new();
        node.build(Vec::new());
        assert!(node.plane().is_none());
        assert!(node.is_empty());
    }

    #[test]
    fn build_single_polygon() {
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::from_polygons(vec![tri.clone()]);

        assert_eq!(node.plane(), Some(tri.plane()));
        assert_eq!(node.polygons(), &[tri]);
        assert!(node.is_leaf());
    }

    #[test]
    fn build_adopts_first_polygon_plane() {
        let first = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let second = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::from_polygons(vec![first.clone(), second]);

        assert_eq!(node.plane(), Some(first.plane()));
        // Second triangle sits at z = 0, behind the z = 1 plane
        assert!(node.front().is_none());
        assert_eq!(node.back().map(BspNode::polygon_count), Some(1));
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn build_keeps_both_facings_on_plane() {
        let up = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let down = up.flipped();
        let node = BspNode::from_polygons(vec![up, down]);

        assert_eq!(node.polygons().len(), 2);
        assert!(node.is_leaf());
    }

    #[test]
    fn build_splits_spanning_polygon() {
        let splitter = make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        let spanning = make_triangle([0.0, -1.0, 0.5], [1.0, 1.0, 0.5], [0.0, 1.0, 0.5]);
        let node = BspNode::from_polygons(vec![splitter, spanning]);

        assert_eq!(node.polygons().len(), 1);
        assert_eq!(node.front().map(BspNode::polygon_count), Some(1));
        assert_eq!(node.back().map(BspNode::polygon_count), Some(1));
    }

    #[test]
    fn build_drops_degenerate_polygons() {
        let line = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        let only_degenerate = BspNode::from_polygons(vec![line.clone()]);
        assert!(only_degenerate.plane().is_none());

        let node = BspNode::from_polygons(vec![line, tri.clone()]);
        assert_eq!(node.plane(), Some(tri.plane()));
        assert_eq!(node.polygon_count(), 1);
    }

    #[test]
    fn clip_by_empty_node_keeps_everything() {
        let node = BspNode::new();
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(node.clip_polygons(vec![tri.clone()]), vec![tri]);
    }

    #[test]
    fn clip_removes_inside_and_keeps_outside() {
        let cube = BspNode::from_polygons(box_polygons([-1.0; 3], [1.0; 3]));

        let inside = make_triangle([0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0]);
        let outside = make_triangle([3.0, 0.0, 0.0], [3.5, 0.0, 0.0], [3.0, 0.5, 0.0]);

        assert!(cube.clip_polygons(vec![inside]).is_empty());
        assert_eq!(cube.clip_polygons(vec![outside.clone()]), vec![outside]);
    }

    #[test]
    fn clip_cuts_polygon_crossing_the_surface() {
        let cube = BspNode::from_polygons(box_polygons([-1.0; 3], [1.0; 3]));
        let crossing = Polygon::from_positions(
            &[
                Point3::new(0.0, -0.5, 0.0),
                Point3::new(2.0, -0.5, 0.0),
                Point3::new(2.0, 0.5, 0.0),
                Point3::new(0.0, 0.5, 0.0),
            ],
            Vector3::z(),
        )
        .unwrap();

        let kept = cube.clip_polygons(vec![crossing]);
        let area: f64 = kept.iter().map(Polygon::area).sum();
        assert!((area - 1.0).abs() < 1e-9);
        for p in &kept {
            for v in p.vertices() {
                assert!(v.position.x >= 1.0 - 1e-9);
            }
        }
    }

    #[test]
    fn clip_to_keeps_structure() {
        let mut a = BspNode::from_polygons(box_polygons([0.0; 3], [1.0; 3]));
        let far = BspNode::from_polygons(box_polygons([5.0; 3], [6.0; 3]));
        let depth = a.depth();
        let count = a.polygon_count();

        a.clip_to(&far);
        assert_eq!(a.depth(), depth);
        assert_eq!(a.polygon_count(), count);

        let same = a.clone();
        a.clip_to(&same);
        // Same-facing coplanar faces survive clipping against themselves
        assert_eq!(a.polygon_count(), count);
    }

    #[test]
    fn invert_twice_is_identity() {
        let original = BspNode::from_polygons(box_polygons([-1.0; 3], [2.0; 3]));
        let mut tree = original.clone();

        tree.invert();
        assert_ne!(tree.all_polygons(), original.all_polygons());
        tree.invert();

        assert_eq!(tree.all_polygons(), original.all_polygons());
        assert_eq!(tree.plane(), original.plane());
        assert_eq!(tree.depth(), original.depth());
    }

    #[test]
    fn invert_swaps_children_and_flips_plane() {
        let first = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let below = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let mut node = BspNode::from_polygons(vec![first.clone(), below]);
        assert!(node.front().is_none());

        node.invert();
        assert!(node.back().is_none());
        assert_eq!(node.front().map(BspNode::polygon_count), Some(1));
        assert_eq!(node.plane(), Some(&first.plane().flipped()));
        assert!(node.polygons()[0].normal().z < 0.0);
    }

    #[test]
    fn all_polygons_order_is_node_front_back() {
        let middle = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let above = make_triangle([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]);
        let below = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::from_polygons(vec![middle.clone(), below.clone(), above.clone()]);

        let expected = vec![middle, above, below];
        assert_eq!(node.all_polygons(), expected);
        assert_eq!(node.into_polygons(), expected);
    }

    #[test]
    fn clone_is_deep() {
        let original = BspNode::from_polygons(box_polygons([0.0; 3], [1.0; 3]));
        let mut copy = original.clone();
        copy.invert();

        assert_ne!(copy.all_polygons(), original.all_polygons());
        assert_eq!(original.polygons()[0].normal(), original.plane().unwrap().normal());
    }

    #[test]
    fn deep_tree_does_not_overflow() {
        // Parallel planes stacked so each lands in the previous node's back subtree
        let polygons: Vec<Polygon> = (0..4_000)
            .map(|i| {
                let z = -(i as f64);
                make_triangle([0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z])
            })
            .collect();

        let mut tree = BspNode::from_polygons(polygons);
        assert_eq!(tree.depth(), 4_000);

        tree.invert();
        let copy = tree.clone();
        assert_eq!(copy.polygon_count(), 4_000);
        assert_eq!(copy.clip_polygons(Vec::new()), Vec::new());
        drop(copy);
        drop(tree);
    }

    #[test]
    fn vertex_normals_survive_build() {
        let tri = Polygon::new(vec![
            Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
        ])
        .unwrap();
        let node = BspNode::from_polygons(vec![tri]);
        assert!(node.polygons()[0].vertices().iter().all(|v| v.normal.z == 1.0));
    }
}
