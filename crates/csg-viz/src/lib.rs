//! Shared visualization utilities for the CSG viewer.

use std::hash::{Hash, Hasher};

use bsp_csg::analysis::Aabb;
use bsp_csg::bsp::BspVisitor;
use bsp_csg::{MeshBuffers, Polygon};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::Point3;

pub mod navigator;
pub mod scene;
pub use navigator::TreeNavigator;
pub use scene::{Operation, Scene, SceneConfig, Shape};

/// Direction of the light used for flat shading.
const LIGHT_DIRECTION: [f64; 3] = [0.4, 0.8, 0.45];

/// Generates a deterministic color from a polygon's vertices using hashing.
/// This ensures split polygons get consistent colors across frames.
pub fn polygon_color(polygon: &Polygon) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in polygon.vertices() {
        v.position.x.to_bits().hash(&mut hasher);
        v.position.y.to_bits().hash(&mut hasher);
        v.position.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    // Extract RGB from hash bytes
    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Ensure colors aren't too dark by adding a minimum brightness
    let r = r.max(40);
    let g = g.max(40);
    let b = b.max(40);

    Color::from_rgba(r, g, b, 255)
}

/// Flat-shades `base` by how much the polygon faces the light.
pub fn shaded_color(polygon: &Polygon, base: Color) -> Color {
    let light = nalgebra::Vector3::from(LIGHT_DIRECTION).normalize();
    let lambert = polygon.normal().dot(&light).max(0.0) as f32;
    let k = 0.35 + 0.65 * lambert;
    Color::new(base.r * k, base.g * k, base.b * k, base.a)
}

/// Draws a single polygon by triangulating it (fan triangulation) using a Mesh.
pub fn draw_polygon(polygon: &Polygon, color: Color) {
    let verts = polygon.vertices();

    // Convert nalgebra points to macroquad Vertices
    let mesh_vertices: Vec<Vertex> = verts
        .iter()
        .map(|v| Vertex::new2(to_vec3(&v.position), vec2(0.0, 0.0), color))
        .collect();

    // Fan triangulation: vertex 0 connects to all edges
    let mut indices: Vec<u16> = Vec::with_capacity((verts.len() - 2) * 3);
    for i in 1..verts.len() - 1 {
        indices.push(0);
        indices.push(i as u16);
        indices.push((i + 1) as u16);
    }

    let mesh = Mesh {
        vertices: mesh_vertices,
        indices,
        texture: None,
    };

    draw_mesh(&mesh);
}

/// Draws the outline of a polygon.
pub fn draw_polygon_edges(polygon: &Polygon, color: Color) {
    let verts = polygon.vertices();
    for (i, v) in verts.iter().enumerate() {
        let next = &verts[(i + 1) % verts.len()];
        draw_line_3d(to_vec3(&v.position), to_vec3(&next.position), color);
    }
}

/// Triangles per macroquad mesh batch, keeping indices within `u16`.
const TRIANGLES_PER_BATCH: usize = 20_000;

/// Draws an exported mesh with one flat shade per triangle.
pub fn draw_mesh_buffers(mesh: &MeshBuffers, base: Color, wireframe: bool) {
    let light = nalgebra::Vector3::from(LIGHT_DIRECTION).normalize();
    let triangles: Vec<[Point3<f64>; 3]> = mesh.triangles().collect();

    if wireframe {
        for [a, b, c] in &triangles {
            let (a, b, c) = (to_vec3(a), to_vec3(b), to_vec3(c));
            draw_line_3d(a, b, base);
            draw_line_3d(b, c, base);
            draw_line_3d(c, a, base);
        }
        return;
    }

    for batch in triangles.chunks(TRIANGLES_PER_BATCH) {
        let mut vertices = Vec::with_capacity(batch.len() * 3);
        for [a, b, c] in batch {
            let normal = (c - b).cross(&(a - b));
            let lambert = normal
                .try_normalize(f64::EPSILON)
                .map_or(0.0, |n| n.dot(&light).max(0.0)) as f32;
            let k = 0.35 + 0.65 * lambert;
            let color = Color::new(base.r * k, base.g * k, base.b * k, base.a);
            vertices.extend(
                [a, b, c]
                    .into_iter()
                    .map(|p| Vertex::new2(to_vec3(p), vec2(0.0, 0.0), color)),
            );
        }
        let indices = (0..vertices.len() as u16).collect();
        draw_mesh(&Mesh {
            vertices,
            indices,
            texture: None,
        });
    }
}

/// Converts a kernel point to a macroquad vector.
pub fn to_vec3(p: &Point3<f64>) -> Vec3 {
    vec3(p.x as f32, p.y as f32, p.z as f32)
}

/// Visitor that renders polygons using macroquad's 3D drawing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderVisitor {
    /// Draw outlines instead of filled faces.
    pub wireframe: bool,
}

impl BspVisitor for RenderVisitor {
    fn visit(&mut self, polygons: &[Polygon]) {
        for polygon in polygons {
            if self.wireframe {
                draw_polygon_edges(polygon, polygon_color(polygon));
            } else {
                draw_polygon(polygon, shaded_color(polygon, polygon_color(polygon)));
            }
        }
    }
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 0.5,
            min_distance: 1.0,
            max_distance: 30.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Sets the camera target point.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Aims at the centre of `bounds` from far enough away to see all of it.
    pub fn frame(&mut self, bounds: &Aabb) {
        self.target = to_vec3(&bounds.center());
        let radius = (bounds.extent().norm() / 2.0) as f32;
        self.distance = (radius * 2.5).clamp(self.min_distance, self.max_distance);
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        // Mouse drag for rotation
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Mouse wheel for zoom
        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        // Arrow keys for rotation
        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Converts to macroquad's Camera3D for rendering.
    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }

    /// Returns the eye point as a nalgebra Point3 for BSP traversal.
    pub fn eye_point(&self) -> Point3<f64> {
        let pos = self.position();
        Point3::new(pos.x as f64, pos.y as f64, pos.z as f64)
    }
}
