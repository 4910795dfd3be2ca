//! BSP tree navigation utilities for interactive visualization.

use bsp_csg::BspNode;
use macroquad::prelude::*;
use nalgebra::Point3;

use crate::{draw_polygon_edges, RenderVisitor};

/// Direction taken at each node in the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Front,
    Back,
}

/// Interactive BSP tree navigator for exploring tree structure.
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Returns the current navigation path.
    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    /// Returns the current depth in the tree.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Attempts to navigate to the front child. Returns true if successful.
    pub fn go_front(&mut self, root: &BspNode) -> bool {
        self.descend(root, Direction::Front)
    }

    /// Attempts to navigate to the back child. Returns true if successful.
    pub fn go_back(&mut self, root: &BspNode) -> bool {
        self.descend(root, Direction::Back)
    }

    fn descend(&mut self, root: &BspNode, direction: Direction) -> bool {
        let Some(node) = self.current_node(root) else {
            return false;
        };
        let child = match direction {
            Direction::Front => node.front(),
            Direction::Back => node.back(),
        };
        if child.is_some() {
            self.path.push(direction);
        }
        child.is_some()
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Returns to the root node.
    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update(&mut self, root: &BspNode) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::F) {
            changed = self.go_front(root);
        }
        if is_key_pressed(KeyCode::B) {
            changed = self.go_back(root);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Returns the node at the current path, or `None` if the tree changed
    /// underneath the navigator.
    pub fn current_node<'a>(&self, root: &'a BspNode) -> Option<&'a BspNode> {
        get_node_at_path(root, &self.path)
    }

    /// Renders only the polygons in the current subtree with proper depth ordering.
    pub fn render(&self, root: &BspNode, eye: &Point3<f64>, wireframe: bool) {
        if let Some(node) = self.current_node(root) {
            node.traverse_back_to_front(eye, &mut RenderVisitor { wireframe });
        }
    }

    /// Outlines the polygons stored at the selected node.
    pub fn highlight(&self, root: &BspNode) {
        if let Some(node) = self.current_node(root) {
            for polygon in node.polygons() {
                draw_polygon_edges(polygon, YELLOW);
            }
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui(&self, root: &BspNode, y_offset: f32) {
        let (node_polygons, subtree_polygons, has_front, has_back, is_leaf) =
            match self.current_node(root) {
                Some(node) => (
                    node.polygons().len(),
                    node.polygon_count(),
                    node.front().is_some(),
                    node.back().is_some(),
                    node.is_leaf(),
                ),
                None => (0, 0, false, false, true),
            };

        // Build path string
        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Front => "F",
                    Direction::Back => "B",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(
            &format!(
                "Node: {} polygons, subtree: {}",
                node_polygons, subtree_polygons
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Path: {} (depth {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            &format!(
                "Children: {}{}{}",
                if has_front { "[F]ront " } else { "" },
                if has_back { "[B]ack " } else { "" },
                if is_leaf { "(leaf)" } else { "" }
            ),
            10.0,
            y_offset + 40.0,
            18.0,
            if is_leaf { ORANGE } else { GREEN },
        );
        draw_text(
            "[P]arent | [R]oot",
            10.0,
            y_offset + 60.0,
            16.0,
            DARKGRAY,
        );
    }
}

/// Navigates to a node following the path, returns None if path is invalid.
fn get_node_at_path<'a>(root: &'a BspNode, path: &[Direction]) -> Option<&'a BspNode> {
    let mut current = root;
    for dir in path {
        current = match dir {
            Direction::Front => current.front()?,
            Direction::Back => current.back()?,
        };
    }
    Some(current)
}
