use bsp_csg::analysis::bounds;
use csg_viz::{draw_mesh_buffers, OrbitCamera, Operation, Scene, SceneConfig, TreeNavigator};
use macroquad::prelude::*;

#[macroquad::main("CSG Visualization")]
async fn main() {
    let mut scene = match Scene::new(SceneConfig::default()) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("Failed to build scene: {err}");
            return;
        }
    };

    let mut camera = OrbitCamera::new(7.0, 0.6, 0.45).with_zoom(0.5, 2.0, 25.0);
    if let Some(b) = bounds(scene.mesh()) {
        camera.frame(&b);
    }
    let mut navigator = TreeNavigator::new();
    let mut wireframe = false;
    let mut error: Option<String> = None;

    loop {
        camera.update();

        let operation = if is_key_pressed(KeyCode::Key1) {
            Some(Operation::Union)
        } else if is_key_pressed(KeyCode::Key2) {
            Some(Operation::Subtract)
        } else if is_key_pressed(KeyCode::Key3) {
            Some(Operation::Intersect)
        } else {
            None
        };
        let rebuilt = if let Some(operation) = operation {
            Some(scene.set_operation(operation))
        } else if is_key_pressed(KeyCode::Tab) {
            Some(scene.cycle_shape())
        } else {
            None
        };
        if let Some(result) = rebuilt {
            // The old path may not exist in the new tree
            navigator.go_root();
            error = result.err().map(|err| err.to_string());
        }

        if is_key_pressed(KeyCode::W) {
            wireframe = !wireframe;
        }
        navigator.update(scene.result().root());

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        let root = scene.result().root();
        if navigator.depth() == 0 {
            draw_mesh_buffers(scene.mesh(), Color::from_rgba(120, 170, 230, 255), wireframe);
        } else {
            navigator.render(root, &camera.eye_point(), wireframe);
        }
        navigator.highlight(root);

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0), BLUE);

        set_default_camera();

        draw_text(
            &format!(
                "{} (B: {}) - {} triangles",
                scene.operation().label(),
                scene.shape().label(),
                scene.mesh().triangle_count()
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Volume: {:.4} | Tree depth: {}",
                scene.volume(),
                scene.result().root().depth()
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(scene.result().root(), 70.0);

        draw_text(
            "[1] union  [2] subtract  [3] intersect  [Tab] operand  [W]ireframe",
            10.0,
            155.0,
            16.0,
            DARKGRAY,
        );
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 175.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);
        if let Some(err) = &error {
            draw_text(err, 10.0, 215.0, 18.0, RED);
        }

        next_frame().await
    }
}
