//! Public rendering API
//!
//! This module contains the device trait shape nodes render through, the
//! opaque resource handles it hands out, and the per-frame data the engine
//! publishes to every node.

pub mod render_backend;
pub mod frame_data;

// Re-export commonly used types
pub use render_backend::{
    Renderer, RenderResult, BufferDesc, BufferHandle, BufferUsage, ShaderDesc, ShaderHandle, ShaderStage,
    InputElement, InputFormat, InputLayoutHandle, TextureHandle, ResourceHandle, DrawIndexed,
};
pub use frame_data::{FrameState, LightingParams, ObjectConstants};
