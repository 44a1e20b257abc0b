//! Frame driver
//!
//! The engine owns the root scene graph, the render device and the global
//! frame state. Each frame it recomputes world transforms from the root down,
//! then draws the tree between `begin_frame` and `end_frame`.

use log::{debug, info};
use thiserror::Error;

use crate::{
    application::Application,
    config::{ConfigError, EngineConfig},
    foundation::{
        math::{utils, Mat4, Mat4Ext, Vec4},
        time::Timer,
    },
    render::{FrameState, RenderError, Renderer},
    scene::{SceneError, SceneGraph},
};

/// Name given to the root scene graph
pub const ROOT_NODE_NAME: &str = "Root";

/// Main engine struct
pub struct Engine<R: Renderer> {
    scene_graph: SceneGraph,
    renderer: R,
    frame_state: FrameState,
    timer: Timer,
    running: bool,
}

impl<R: Renderer> Engine<R> {
    /// Create an engine with an empty root graph
    ///
    /// View and projection are derived from the camera and viewport settings.
    pub fn new(config: &EngineConfig, renderer: R) -> Result<Self, EngineError> {
        let camera = &config.camera;
        if config.viewport.width == 0 || config.viewport.height == 0 {
            return Err(EngineError::InitializationFailed(format!(
                "viewport {}x{} has no area",
                config.viewport.width, config.viewport.height
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(EngineError::InitializationFailed(format!(
                "clip planes near={} far={} are not ordered",
                camera.near, camera.far
            )));
        }
        if (camera.focal_point - camera.eye).norm() <= f32::EPSILON {
            return Err(EngineError::InitializationFailed("camera eye and focal point coincide".to_string()));
        }

        let view = Mat4::look_at(camera.eye, camera.focal_point, camera.up);
        let projection = Mat4::perspective(
            utils::deg_to_rad(camera.fov_degrees),
            config.viewport.aspect_ratio(),
            camera.near,
            camera.far,
        );

        info!(
            "Engine created: {}x{} viewport, {}° field of view",
            config.viewport.width, config.viewport.height, camera.fov_degrees
        );

        Ok(Self {
            scene_graph: SceneGraph::new(ROOT_NODE_NAME),
            renderer,
            frame_state: FrameState {
                view,
                projection,
                background_colour: config.background_colour,
                lighting: config.lighting,
            },
            timer: Timer::new(),
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    ///
    /// Creates the scene, initialises it, then runs frames until the
    /// configured frame limit is reached or [`Engine::stop`] is called. The
    /// scene is always shut down before returning. On success the device is
    /// handed back for inspection.
    pub fn run<A: Application<R>>(config: &EngineConfig, renderer: R, app: &mut A) -> Result<R, EngineError> {
        let mut engine = Self::new(config, renderer)?;

        let result = engine.run_frames(app, config.frame_limit);
        app.cleanup(&mut engine);
        engine.shutdown();

        result?;
        info!("Engine shutdown complete");
        Ok(engine.renderer)
    }

    fn run_frames<A: Application<R>>(&mut self, app: &mut A, frame_limit: u64) -> Result<(), EngineError> {
        app.create_scene_graph(self)
            .map_err(|e| EngineError::ApplicationError(format!("Scene creation: {}", e)))?;
        self.initialise()?;

        info!("Starting main loop...");
        while self.running && (frame_limit == 0 || self.frame_count() < frame_limit) {
            let delta_time = self.timer.delta_time();
            app.update_scene_graph(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("Scene update: {}", e)))?;
            self.frame()?;
        }
        info!(
            "Main loop finished after {} frames ({:.1} fps)",
            self.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Initialise every node in the scene
    pub fn initialise(&mut self) -> Result<(), EngineError> {
        self.scene_graph.initialise(&mut self.renderer)?;
        Ok(())
    }

    /// Update and draw one frame
    ///
    /// The frame is presented even if a node fails to draw; the failure is
    /// returned afterwards.
    pub fn frame(&mut self) -> Result<(), EngineError> {
        self.timer.tick();
        self.scene_graph.update(&Mat4::identity());

        self.renderer.begin_frame(self.frame_state.background_colour)?;
        let rendered = self.scene_graph.render(&self.frame_state, &mut self.renderer);
        self.renderer.end_frame()?;
        rendered?;

        debug!("Frame {} complete", self.timer.frame_count());
        Ok(())
    }

    /// Release every node's device resources
    pub fn shutdown(&mut self) {
        self.scene_graph.shutdown(&mut self.renderer);
    }

    /// Request the main loop to stop after the current frame
    pub fn stop(&mut self) {
        info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The root scene graph
    pub fn scene_graph(&self) -> &SceneGraph {
        &self.scene_graph
    }

    /// Mutable access to the root scene graph
    pub fn scene_graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene_graph
    }

    /// The render device
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the render device
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Consume the engine and return its device
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Frame state published to nodes during render
    pub fn frame_state(&self) -> &FrameState {
        &self.frame_state
    }

    /// Current view transformation
    pub fn view_transformation(&self) -> Mat4 {
        self.frame_state.view
    }

    /// Replace the view transformation
    pub fn set_view_transformation(&mut self, view: Mat4) {
        self.frame_state.view = view;
    }

    /// Current projection transformation
    pub fn projection_transformation(&self) -> Mat4 {
        self.frame_state.projection
    }

    /// Replace the projection transformation
    pub fn set_projection_transformation(&mut self, projection: Mat4) {
        self.frame_state.projection = projection;
    }

    /// Clear colour used at the start of each frame
    pub fn background_colour(&self) -> Vec4 {
        self.frame_state.background_colour
    }

    /// Replace the clear colour
    pub fn set_background_colour(&mut self, colour: Vec4) {
        self.frame_state.background_colour = colour;
    }

    /// Number of frames completed
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Seconds between the last two frames
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine could not be created from its configuration
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Device failed outside of a node
    #[error("Rendering error: {0}")]
    Rendering(#[from] RenderError),

    /// Application callback failed
    #[error("Application error: {0}")]
    ApplicationError(String),
}
