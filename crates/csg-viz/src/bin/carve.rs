use bsp_csg::analysis::{bounds, signed_volume};
use bsp_csg::primitives::{cube, cuboid, uv_sphere};
use bsp_csg::{MeshBuffers, Solid};
use csg_viz::{draw_mesh_buffers, OrbitCamera, TreeNavigator};
use macroquad::prelude::*;
use nalgebra::{Translation3, UnitQuaternion, Vector3};

/// Chains three operations, starting from a sphere trimmed by a rotated block.
///
/// The sphere goes first so the result keeps the identity transform and
/// its exported mesh lines up with the tree.
fn carve() -> bsp_csg::Result<Solid> {
    let rotation = UnitQuaternion::from_euler_angles(0.3, 0.4, 0.25);
    let block = Solid::from_mesh(&cube(2.0), Some(rotation.to_homogeneous()))?;
    let ball = Solid::from_mesh(&uv_sphere(1.25, 32, 16), None)?;
    let slot = Solid::from_mesh(&cuboid(Vector3::new(3.0, 0.4, 0.4)), None)?;
    let cap = Solid::from_mesh(
        &uv_sphere(0.6, 24, 12),
        Some(Translation3::new(0.0, 1.2, 0.0).to_homogeneous()),
    )?;

    Ok(ball.intersect(&block).subtract(&slot).union(&cap))
}

#[macroquad::main("CSG Carve")]
async fn main() {
    println!("Carving...");
    let (solid, mesh): (Solid, MeshBuffers) = match carve().and_then(|s| {
        let mesh = s.to_mesh()?;
        Ok((s, mesh))
    }) {
        Ok(parts) => parts,
        Err(err) => {
            eprintln!("Carving failed: {err}");
            return;
        }
    };
    println!(
        "Result: {} polygons, {} triangles, volume {:.4}, tree depth {}",
        solid.polygon_count(),
        mesh.triangle_count(),
        signed_volume(&mesh),
        solid.root().depth()
    );

    let mut camera = OrbitCamera::new(6.0, 0.4, 0.4).with_zoom(0.5, 2.0, 20.0);
    if let Some(b) = bounds(&mesh) {
        camera.frame(&b);
    }
    let mut navigator = TreeNavigator::new();
    let mut wireframe = false;

    loop {
        camera.update();
        navigator.update(solid.root());
        if is_key_pressed(KeyCode::W) {
            wireframe = !wireframe;
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        if navigator.depth() == 0 {
            draw_mesh_buffers(&mesh, Color::from_rgba(210, 170, 110, 255), wireframe);
        } else {
            navigator.render(solid.root(), &camera.eye_point(), wireframe);
        }
        navigator.highlight(solid.root());

        set_default_camera();

        draw_text(
            &format!("CSG Carve - {} triangles", mesh.triangle_count()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Tree depth: {} | Polygons: {}",
                solid.root().depth(),
                solid.polygon_count()
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(solid.root(), 70.0);

        draw_text(
            "Drag mouse to rotate, scroll to zoom, [W]ireframe",
            10.0,
            155.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
