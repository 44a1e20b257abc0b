//! # Scene Engine
//!
//! A hierarchical scene graph: named nodes with local transforms composed
//! into world transforms, drawn depth-first through a pluggable render device.
//!
//! ## Features
//!
//! - **Scene graph**: arena-backed tree with find-by-name and subtree removal
//! - **Shapes**: coloured cubes, textured cubes and generated solids
//! - **Device abstraction**: any [`render::Renderer`], with an in-memory
//!   headless device included
//! - **Configuration**: camera, viewport and lighting from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application<HeadlessRenderer> for MyApp {
//!     fn create_scene_graph(&mut self, engine: &mut Engine<HeadlessRenderer>) -> Result<(), AppError> {
//!         engine.scene_graph_mut().add_to_root(Node::new("Cube", CubeNode::default()))?;
//!         Ok(())
//!     }
//!
//!     fn update_scene_graph(&mut self, engine: &mut Engine<HeadlessRenderer>, _delta_time: f32) -> Result<(), AppError> {
//!         let cube = engine.scene_graph().find("Cube").ok_or_else(|| AppError::NodeNotFound("Cube".into()))?;
//!         engine.scene_graph_mut().set_local_transform(cube, Mat4::rotation_y(0.1))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig { frame_limit: 60, ..EngineConfig::default() };
//!     Engine::run(&config, HeadlessRenderer::new(), &mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError, ROOT_NODE_NAME};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineError,
        config::{Config, EngineConfig},
        foundation::{
            math::{Mat4, Mat4Ext, Vec3, Vec4, utils::deg_to_rad},
            time::Timer,
        },
        render::{HeadlessRenderer, ParametricShape, Renderer},
        scene::{CubeNode, GeometricNode, Node, NodeId, SceneGraph, SceneError, TexturedCubeNode},
    };
}
