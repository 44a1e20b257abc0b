//! Rendering system
//!
//! The scene graph never talks to a graphics API directly. Each shape node
//! consumes the [`Renderer`] device capability during initialise, render and
//! shutdown, and reads the per-frame [`FrameState`] published by the engine.
//!
//! ## Modules
//!
//! - [`api`]: the device trait, resource handles and per-frame data
//! - [`primitives`]: vertex/mesh data and parametric solids
//! - [`headless`]: an in-memory device that records draws instead of submitting them

pub mod api;
pub mod primitives;
pub mod headless;

pub use api::{
    Renderer, RenderResult, BufferDesc, BufferHandle, BufferUsage, ShaderDesc, ShaderHandle, ShaderStage,
    InputElement, InputFormat, InputLayoutHandle, TextureHandle, ResourceHandle, DrawIndexed,
    FrameState, LightingParams, ObjectConstants,
};
pub use primitives::{Mesh, Vertex, MeshError, ParametricShape};
pub use headless::{HeadlessRenderer, DrawRecord};

use thiserror::Error;

/// Rendering system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The device or its immediate context is not available
    ///
    /// Nodes check for this before creating any resources.
    #[error("Render device unavailable")]
    DeviceUnavailable,

    /// Resource creation or management failed
    ///
    /// Occurs when GPU resources (buffers, textures, shaders) cannot be created,
    /// typically due to memory constraints or invalid data.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Shader compilation failed
    #[error("Shader compilation failed for {entry_point} in {source_file}: {message}")]
    ShaderCompilationFailed {
        /// Shader source file
        source_file: String,
        /// Entry point that failed
        entry_point: String,
        /// Compiler output
        message: String,
    },

    /// A handle did not refer to a live resource of the expected kind
    #[error("Invalid resource handle: {0:?}")]
    InvalidHandle(ResourceHandle),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),
}
