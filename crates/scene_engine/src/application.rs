//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::render::Renderer;
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to build a scene and animate it with
/// [`Engine::run`].
pub trait Application<R: Renderer> {
    /// Build the scene
    ///
    /// Called once before the scene is initialised. Add nodes beneath
    /// `engine.scene_graph_mut().root()` here.
    fn create_scene_graph(&mut self, engine: &mut Engine<R>) -> Result<(), AppError>;

    /// Animate the scene
    ///
    /// Called every frame before world transforms are recomputed. Look nodes
    /// up by name and set their local transforms here.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update_scene_graph(&mut self, engine: &mut Engine<R>, delta_time: f32) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once after the main loop ends, before the scene is shut down.
    fn cleanup(&mut self, _engine: &mut Engine<R>) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// A node looked up by name does not exist
    #[error("No node named '{0}'")]
    NodeNotFound(String),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
