//! Device abstraction for the rendering system
//!
//! Shape nodes create their buffers, shaders, input layouts and textures
//! through [`Renderer`] and keep the returned handles for as long as they are
//! initialised. A handle is owned by exactly one node and is never shared.

use std::path::Path;

use bitflags::bitflags;

use crate::foundation::math::Vec4;
use crate::render::RenderError;

/// Result type for device operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Handle to a buffer resource stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a compiled shader stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a vertex input layout stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputLayoutHandle(pub u64);

/// Handle to a texture view stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Any device resource, used when releasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceHandle {
    /// A buffer
    Buffer(BufferHandle),
    /// A shader
    Shader(ShaderHandle),
    /// An input layout
    InputLayout(InputLayoutHandle),
    /// A texture
    Texture(TextureHandle),
}

impl ResourceHandle {
    /// Raw id shared by every handle kind
    pub fn id(self) -> u64 {
        match self {
            Self::Buffer(BufferHandle(id))
            | Self::Shader(ShaderHandle(id))
            | Self::InputLayout(InputLayoutHandle(id))
            | Self::Texture(TextureHandle(id)) => id,
        }
    }
}

bitflags! {
    /// How a buffer is bound and whether its contents may change
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Bound as a vertex buffer
        const VERTEX = 1 << 0;
        /// Bound as an index buffer
        const INDEX = 1 << 1;
        /// Bound as a shader constant buffer
        const CONSTANT = 1 << 2;
        /// Contents fixed at creation
        const IMMUTABLE = 1 << 3;
    }
}

/// Buffer creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Binding and mutability flags
    pub usage: BufferUsage,
    /// Total size in bytes
    pub byte_width: usize,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Pixel (fragment) shader
    Pixel,
}

/// Shader compilation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDesc {
    /// Source file the device compiles from
    pub source_file: String,
    /// Entry point function name
    pub entry_point: String,
    /// Target stage
    pub stage: ShaderStage,
}

impl ShaderDesc {
    /// Vertex stage shader
    pub fn vertex(source_file: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self { source_file: source_file.into(), entry_point: entry_point.into(), stage: ShaderStage::Vertex }
    }

    /// Pixel stage shader
    pub fn pixel(source_file: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self { source_file: source_file.into(), entry_point: entry_point.into(), stage: ShaderStage::Pixel }
    }
}

/// Format of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Two 32-bit floats
    Float32x2,
    /// Three 32-bit floats
    Float32x3,
}

/// One element of a vertex input layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputElement {
    /// Shader semantic name
    pub semantic: &'static str,
    /// Attribute format
    pub format: InputFormat,
    /// Byte offset within the vertex
    pub offset: u32,
}

/// Everything bound for one indexed triangle-list draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexed {
    /// Vertex buffer
    pub vertex_buffer: BufferHandle,
    /// Size of one vertex in bytes
    pub vertex_stride: u32,
    /// 32-bit index buffer
    pub index_buffer: BufferHandle,
    /// Number of indices to draw
    pub index_count: u32,
    /// Vertex input layout
    pub input_layout: InputLayoutHandle,
    /// Vertex shader
    pub vertex_shader: ShaderHandle,
    /// Pixel shader
    pub pixel_shader: ShaderHandle,
    /// Constant buffer bound to both stages at slot 0
    pub constant_buffer: BufferHandle,
    /// Texture bound to the pixel stage at slot 0
    pub texture: Option<TextureHandle>,
}

/// Graphics device capability consumed by shape nodes
///
/// All calls are synchronous. A stalled device call stalls the frame.
pub trait Renderer {
    /// Whether the device and its context can be used
    fn is_available(&self) -> bool;

    /// Create a buffer, optionally filled with `initial_data`
    ///
    /// Immutable buffers must be given their contents here.
    fn create_buffer(&mut self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> RenderResult<BufferHandle>;

    /// Compile a shader
    fn create_shader(&mut self, desc: &ShaderDesc) -> RenderResult<ShaderHandle>;

    /// Create a vertex input layout validated against a vertex shader
    fn create_input_layout(&mut self, elements: &[InputElement], vertex_shader: ShaderHandle) -> RenderResult<InputLayoutHandle>;

    /// Create a texture from an image file
    fn create_texture(&mut self, path: &Path) -> RenderResult<TextureHandle>;

    /// Replace the contents of a mutable buffer
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> RenderResult<()>;

    /// Issue an indexed triangle-list draw
    fn draw_indexed(&mut self, draw: &DrawIndexed) -> RenderResult<()>;

    /// Release a resource; unknown or already released handles are ignored
    fn release(&mut self, resource: ResourceHandle);

    /// Start a frame, clearing to `clear_colour`
    fn begin_frame(&mut self, clear_colour: Vec4) -> RenderResult<()>;

    /// Finish and present the frame
    fn end_frame(&mut self) -> RenderResult<()>;
}
