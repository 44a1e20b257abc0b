//! Robot demo application
//!
//! Builds a small robot out of cubes, a spinning textured box and a spinning
//! sphere, then animates it headlessly for a fixed number of frames. The
//! robot body and arms sit in their own sub-graphs so a single rotation on
//! each graph turns the whole group.

use std::path::Path;

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

/// Degrees added to the animation angle every frame
const ROTATION_STEP_DEGREES: f32 = 0.32;

/// Frames to run when the configuration does not set a limit
const DEFAULT_FRAME_LIMIT: u64 = 240;

const CONFIG_FILE: &str = "robot.toml";

/// Compose transforms so the first one listed is applied first
fn chain<const N: usize>(transforms: [Mat4; N]) -> Mat4 {
    transforms.into_iter().fold(Mat4::identity(), |acc, transform| transform * acc)
}

fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::scaling(Vec3::new(x, y, z))
}

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::translation(Vec3::new(x, y, z))
}

fn cube(name: &str, colour: Vec4, transform: Mat4) -> Node {
    Node::new(name, CubeNode::new(colour)).with_local_transform(transform)
}

struct RobotApp {
    rotation_angle: f32,
}

impl RobotApp {
    fn new() -> Self {
        Self { rotation_angle: 0.0 }
    }

    fn find(engine: &Engine<HeadlessRenderer>, name: &str) -> Result<NodeId, AppError> {
        engine
            .scene_graph()
            .find(name)
            .ok_or_else(|| AppError::NodeNotFound(name.to_string()))
    }

    fn find_in(engine: &Engine<HeadlessRenderer>, graph: NodeId, name: &str) -> Result<NodeId, AppError> {
        engine
            .scene_graph()
            .find_from(graph, name)
            .ok_or_else(|| AppError::NodeNotFound(name.to_string()))
    }
}

impl Application<HeadlessRenderer> for RobotApp {
    fn create_scene_graph(&mut self, engine: &mut Engine<HeadlessRenderer>) -> Result<(), AppError> {
        let dark_blue = Vec4::new(0.0, 0.0, 0.25, 1.0);
        let dark_red = Vec4::new(0.25, 0.0, 0.0, 1.0);
        let dark_green = Vec4::new(0.0, 0.25, 0.0, 1.0);

        let graph = engine.scene_graph_mut();

        let teapot_graph = graph.add_to_root(Node::graph("TeapotMain"))?;
        graph.add(
            teapot_graph,
            Node::new(
                "Teapot01",
                GeometricNode::new(ParametricShape::Sphere { diameter: 5.0, tessellation: 16 }, dark_blue),
            )
            .with_local_transform(chain([scale(2.0, 2.0, 2.0), translate(0.0, 0.0, 35.0)])),
        )?;

        let body_graph = graph.add_to_root(Node::graph("Main"))?;
        graph.add(body_graph, cube("Body", dark_blue, chain([scale(5.0, 8.0, 2.5), translate(0.0, 23.0, 0.0)])))?;
        graph.add(body_graph, cube("Left_Leg", dark_red, chain([scale(1.0, 7.5, 1.0), translate(-4.0, 7.5, 0.0)])))?;
        graph.add(body_graph, cube("Right_Leg", dark_red, chain([scale(1.0, 7.5, 1.0), translate(4.0, 7.5, 0.0)])))?;
        graph.add(body_graph, cube("Head", dark_green, chain([scale(3.0, 3.0, 3.0), translate(0.0, 34.0, 0.0)])))?;
        graph.add(body_graph, cube("Nose", dark_red, chain([scale(0.6, 0.8, 0.6), translate(0.0, 33.0, -3.0)])))?;

        let arms_graph = graph.add_to_root(Node::graph("Arms"))?;
        graph.add(arms_graph, cube("Left_Arm", dark_green, chain([scale(1.0, 8.5, 1.0), translate(-6.0, 22.0, 0.0)])))?;
        graph.add(arms_graph, cube("Right_Arm", dark_green, chain([scale(1.0, 8.5, 1.0), translate(6.0, 22.0, 0.0)])))?;

        graph.add_to_root(
            Node::new("Box", TexturedCubeNode::new("Woodbox.bmp"))
                .with_local_transform(chain([scale(5.0, 5.0, 5.0), translate(0.0, 0.0, 35.0)])),
        )?;

        log::info!("Robot scene created with {} nodes", graph.node_count());
        Ok(())
    }

    fn update_scene_graph(&mut self, engine: &mut Engine<HeadlessRenderer>, _delta_time: f32) -> Result<(), AppError> {
        self.rotation_angle += ROTATION_STEP_DEGREES;
        let angle = deg_to_rad(self.rotation_angle);

        let main = Self::find(engine, "Main")?;
        let arms = Self::find(engine, "Arms")?;
        let textured_box = Self::find(engine, "Box")?;
        let teapot_graph = Self::find(engine, "TeapotMain")?;
        let left_arm = Self::find_in(engine, arms, "Left_Arm")?;
        let right_arm = Self::find_in(engine, arms, "Right_Arm")?;
        let teapot = Self::find_in(engine, teapot_graph, "Teapot01")?;

        let graph = engine.scene_graph_mut();

        graph.set_local_transform(main, Mat4::rotation_y(angle))?;
        graph.set_local_transform(arms, Mat4::rotation_y(angle))?;

        // Arms swing in opposite directions about the shoulder
        graph.set_local_transform(
            left_arm,
            chain([scale(1.0, 8.5, 1.0), translate(0.0, -8.0, 0.0), Mat4::rotation_x(angle), translate(-6.0, 30.0, 0.0)]),
        )?;
        graph.set_local_transform(
            right_arm,
            chain([scale(1.0, 8.5, 1.0), translate(0.0, -8.0, 0.0), Mat4::rotation_x(-angle), translate(6.0, 30.0, 0.0)]),
        )?;

        graph.set_local_transform(
            textured_box,
            chain([scale(5.0, 5.0, 5.0), Mat4::rotation_y(angle), translate(-40.0, 25.0, 0.0)]),
        )?;
        graph.set_local_transform(
            teapot,
            chain([scale(2.0, 2.0, 2.0), Mat4::rotation_y(angle), translate(40.0, 25.0, 0.0)]),
        )?;

        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine<HeadlessRenderer>) {
        if let Some(head) = engine.scene_graph().find("Head") {
            if let Some(world) = engine.scene_graph().world_transform(head) {
                log::info!(
                    "Head finished at ({:.2}, {:.2}, {:.2}) after {:.1}°",
                    world[(0, 3)],
                    world[(1, 3)],
                    world[(2, 3)],
                    self.rotation_angle
                );
            }
        }
    }
}

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());

    let mut config = if Path::new(&path).exists() {
        log::info!("Loading configuration from {}", path);
        EngineConfig::load_from_file(&path)?
    } else {
        log::info!("No configuration at {}, using defaults", path);
        EngineConfig::default()
    };

    if config.frame_limit == 0 {
        config.frame_limit = DEFAULT_FRAME_LIMIT;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting robot demo");

    let config = load_config()?;
    let mut app = RobotApp::new();

    let renderer = Engine::run(&config, HeadlessRenderer::new(), &mut app)?;

    log::info!(
        "Robot demo finished: {} frames, {} draws, {} live resources",
        renderer.frames_presented(),
        renderer.total_draws(),
        renderer.live_resource_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_applies_first_transform_first() {
        let m = chain([scale(2.0, 2.0, 2.0), translate(0.0, 0.0, 35.0)]);
        let p = m.transform_point(&scene_engine::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!((p.z - 35.0).abs() < 1e-5);
    }

    #[test]
    fn test_robot_scene_runs_and_releases_everything() {
        let config = EngineConfig { frame_limit: 3, ..EngineConfig::default() };
        let mut app = RobotApp::new();

        let renderer = Engine::run(&config, HeadlessRenderer::new(), &mut app).unwrap();

        // Teapot, five body cubes, two arms and the box
        assert_eq!(renderer.draws().len(), 9);
        assert_eq!(renderer.frames_presented(), 3);
        assert_eq!(renderer.live_resource_count(), 0);
        assert!((app.rotation_angle - 3.0 * ROTATION_STEP_DEGREES).abs() < 1e-4);
    }
}
