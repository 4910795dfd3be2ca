//! The viewer's scene: two operands and the result of combining them.

use bsp_csg::analysis::signed_volume;
use bsp_csg::primitives::{cube, uv_sphere};
use bsp_csg::{MeshBuffers, MeshDescriptor, Solid};
use nalgebra::{Translation3, Vector3};

/// Boolean operation applied to the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Union,
    Subtract,
    Intersect,
}

impl Operation {
    pub fn apply(self, a: &Solid, b: &Solid) -> Solid {
        match self {
            Operation::Union => a.union(b),
            Operation::Subtract => a.subtract(b),
            Operation::Intersect => a.intersect(b),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Union => "A ∪ B",
            Operation::Subtract => "A − B",
            Operation::Intersect => "A ∩ B",
        }
    }
}

/// Shape of the second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
}

impl Shape {
    /// The shape after this one when cycling.
    pub fn next(self) -> Self {
        match self {
            Shape::Cube => Shape::Sphere,
            Shape::Sphere => Shape::Cube,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Sphere => "sphere",
        }
    }
}

/// Initial scene setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Edge length of operand A.
    pub cube_size: f64,
    /// Edge length of operand B when it is a cube.
    pub second_cube_size: f64,
    pub sphere_radius: f64,
    pub sphere_segments: usize,
    pub sphere_rings: usize,
    /// Position of operand B relative to A.
    pub offset: Vector3<f64>,
    pub operation: Operation,
    pub shape: Shape,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cube_size: 2.0,
            second_cube_size: 1.5,
            sphere_radius: 1.3,
            sphere_segments: 24,
            sphere_rings: 12,
            offset: Vector3::new(0.8, 0.6, 0.5),
            operation: Operation::Subtract,
            shape: Shape::Sphere,
        }
    }
}

/// Operands, the combined solid and its exported mesh.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    left: Solid,
    right: Solid,
    result: Solid,
    mesh: MeshBuffers,
    volume: f64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> bsp_csg::Result<Self> {
        let left = Solid::from_mesh(&cube(config.cube_size), None)?;
        let right = second_operand(&config)?;
        let mut scene = Self {
            config,
            left,
            right,
            result: Solid::empty(),
            mesh: MeshBuffers::default(),
            volume: 0.0,
        };
        scene.recompute()?;
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn operation(&self) -> Operation {
        self.config.operation
    }

    pub fn shape(&self) -> Shape {
        self.config.shape
    }

    pub fn result(&self) -> &Solid {
        &self.result
    }

    /// Triangles of the result, in world space.
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Switches the operation. Does nothing if it is already selected.
    pub fn set_operation(&mut self, operation: Operation) -> bsp_csg::Result<()> {
        if operation == self.config.operation {
            return Ok(());
        }
        self.config.operation = operation;
        self.recompute()
    }

    /// Replaces operand B with the next shape.
    pub fn cycle_shape(&mut self) -> bsp_csg::Result<()> {
        self.config.shape = self.config.shape.next();
        self.right = second_operand(&self.config)?;
        self.recompute()
    }

    fn recompute(&mut self) -> bsp_csg::Result<()> {
        self.result = self.config.operation.apply(&self.left, &self.right);
        self.mesh = self.result.to_mesh()?;
        self.volume = signed_volume(&self.mesh);
        Ok(())
    }
}

fn second_operand(config: &SceneConfig) -> bsp_csg::Result<Solid> {
    let mesh: MeshDescriptor = match config.shape {
        Shape::Cube => cube(config.second_cube_size),
        Shape::Sphere => uv_sphere(
            config.sphere_radius,
            config.sphere_segments,
            config.sphere_rings,
        ),
    };
    let placement = Translation3::from(config.offset).to_homogeneous();
    Solid::from_mesh(&mesh, Some(placement))
}
