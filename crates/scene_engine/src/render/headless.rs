//! Headless render device
//!
//! Implements [`Renderer`] entirely in memory. Resources are tracked by id,
//! buffer contents are kept, and every draw is validated and recorded with its
//! decoded constant payload instead of being submitted to a GPU. Used by the
//! demo binary and by tests to observe what the scene graph draws.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::trace;

use crate::foundation::math::Vec4;
use crate::render::api::{
    BufferDesc, BufferHandle, BufferUsage, DrawIndexed, InputElement, InputLayoutHandle, ObjectConstants,
    Renderer, RenderResult, ResourceHandle, ShaderDesc, ShaderHandle, ShaderStage, TextureHandle,
};
use crate::render::RenderError;

#[derive(Debug)]
enum Resource {
    Buffer { desc: BufferDesc, data: Vec<u8> },
    Shader(ShaderDesc),
    InputLayout { element_count: usize },
    Texture { path: PathBuf },
}

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Bindings the draw was issued with
    pub draw: DrawIndexed,
    /// Constant buffer contents at the time of the draw
    pub constants: ObjectConstants,
    /// Texture file bound to the draw, if any
    pub texture_path: Option<PathBuf>,
}

/// In-memory [`Renderer`]
#[derive(Debug)]
pub struct HeadlessRenderer {
    available: bool,
    fail_textures: bool,
    failing_shader_entry: Option<String>,
    resources: HashMap<u64, Resource>,
    next_id: u64,
    in_frame: bool,
    clear_colour: Option<Vec4>,
    frame_draws: Vec<DrawRecord>,
    frames_presented: u64,
    total_draws: u64,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRenderer {
    /// Create an available device with no resources
    pub fn new() -> Self {
        Self {
            available: true,
            fail_textures: false,
            failing_shader_entry: None,
            resources: HashMap::new(),
            next_id: 1,
            in_frame: false,
            clear_colour: None,
            frame_draws: Vec::new(),
            frames_presented: 0,
            total_draws: 0,
        }
    }

    /// Create a device that reports itself unavailable
    pub fn unavailable() -> Self {
        Self { available: false, ..Self::new() }
    }

    /// Make every texture creation fail
    pub fn with_texture_failure(mut self) -> Self {
        self.fail_textures = true;
        self
    }

    /// Make compiling the given entry point fail
    pub fn with_shader_failure(mut self, entry_point: impl Into<String>) -> Self {
        self.failing_shader_entry = Some(entry_point.into());
        self
    }

    /// Mark the device available or lost
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of resources created and not yet released
    pub fn live_resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Whether a resource is still alive
    pub fn is_live(&self, resource: ResourceHandle) -> bool {
        self.resources.contains_key(&resource.id())
    }

    /// Draws recorded since the last `begin_frame`
    pub fn draws(&self) -> &[DrawRecord] {
        &self.frame_draws
    }

    /// Clear colour of the current or last frame
    pub fn clear_colour(&self) -> Option<Vec4> {
        self.clear_colour
    }

    /// Number of completed frames
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Draws recorded over the device's lifetime
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }

    fn check_available(&self) -> RenderResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(RenderError::DeviceUnavailable)
        }
    }

    fn insert(&mut self, resource: Resource) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.resources.insert(id, resource);
        id
    }

    fn buffer(&self, handle: BufferHandle, usage: BufferUsage) -> RenderResult<(&BufferDesc, &[u8])> {
        match self.resources.get(&handle.0) {
            Some(Resource::Buffer { desc, data }) if desc.usage.contains(usage) => Ok((desc, data.as_slice())),
            _ => Err(RenderError::InvalidHandle(ResourceHandle::Buffer(handle))),
        }
    }

    fn shader(&self, handle: ShaderHandle, stage: ShaderStage) -> RenderResult<&ShaderDesc> {
        match self.resources.get(&handle.0) {
            Some(Resource::Shader(desc)) if desc.stage == stage => Ok(desc),
            _ => Err(RenderError::InvalidHandle(ResourceHandle::Shader(handle))),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn create_buffer(&mut self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> RenderResult<BufferHandle> {
        self.check_available()?;

        let data = match initial_data {
            Some(bytes) if bytes.len() != desc.byte_width => {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "buffer expects {} bytes, got {}",
                    desc.byte_width,
                    bytes.len()
                )));
            }
            Some(bytes) => bytes.to_vec(),
            None if desc.usage.contains(BufferUsage::IMMUTABLE) => {
                return Err(RenderError::ResourceCreationFailed(
                    "immutable buffer created without initial data".to_string(),
                ));
            }
            None => vec![0; desc.byte_width],
        };

        let id = self.insert(Resource::Buffer { desc: *desc, data });
        trace!("Created buffer {} ({:?}, {} bytes)", id, desc.usage, desc.byte_width);
        Ok(BufferHandle(id))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> RenderResult<ShaderHandle> {
        self.check_available()?;

        if self.failing_shader_entry.as_deref() == Some(desc.entry_point.as_str()) {
            return Err(RenderError::ShaderCompilationFailed {
                source_file: desc.source_file.clone(),
                entry_point: desc.entry_point.clone(),
                message: "compilation rejected by device".to_string(),
            });
        }

        let id = self.insert(Resource::Shader(desc.clone()));
        trace!("Compiled {:?} shader {} from {}", desc.stage, desc.entry_point, desc.source_file);
        Ok(ShaderHandle(id))
    }

    fn create_input_layout(&mut self, elements: &[InputElement], vertex_shader: ShaderHandle) -> RenderResult<InputLayoutHandle> {
        self.check_available()?;
        self.shader(vertex_shader, ShaderStage::Vertex)?;

        if elements.is_empty() {
            return Err(RenderError::ResourceCreationFailed("empty input layout".to_string()));
        }

        let id = self.insert(Resource::InputLayout { element_count: elements.len() });
        Ok(InputLayoutHandle(id))
    }

    fn create_texture(&mut self, path: &Path) -> RenderResult<TextureHandle> {
        self.check_available()?;

        if self.fail_textures {
            return Err(RenderError::ResourceCreationFailed(format!(
                "could not create texture from {}",
                path.display()
            )));
        }

        let id = self.insert(Resource::Texture { path: path.to_path_buf() });
        trace!("Created texture {} from {}", id, path.display());
        Ok(TextureHandle(id))
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> RenderResult<()> {
        self.check_available()?;

        match self.resources.get_mut(&buffer.0) {
            Some(Resource::Buffer { desc, data: contents })
                if !desc.usage.contains(BufferUsage::IMMUTABLE) && data.len() == desc.byte_width =>
            {
                contents.copy_from_slice(data);
                Ok(())
            }
            _ => Err(RenderError::InvalidHandle(ResourceHandle::Buffer(buffer))),
        }
    }

    fn draw_indexed(&mut self, draw: &DrawIndexed) -> RenderResult<()> {
        self.check_available()?;

        self.buffer(draw.vertex_buffer, BufferUsage::VERTEX)?;
        let (_, indices) = self.buffer(draw.index_buffer, BufferUsage::INDEX)?;
        if draw.index_count as usize * std::mem::size_of::<u32>() > indices.len() {
            return Err(RenderError::RenderingFailed(format!(
                "draw of {} indices exceeds index buffer",
                draw.index_count
            )));
        }
        match self.resources.get(&draw.input_layout.0) {
            Some(Resource::InputLayout { element_count }) if *element_count > 0 => {}
            _ => return Err(RenderError::InvalidHandle(ResourceHandle::InputLayout(draw.input_layout))),
        }
        self.shader(draw.vertex_shader, ShaderStage::Vertex)?;
        self.shader(draw.pixel_shader, ShaderStage::Pixel)?;

        let (_, constant_bytes) = self.buffer(draw.constant_buffer, BufferUsage::CONSTANT)?;
        if constant_bytes.len() != std::mem::size_of::<ObjectConstants>() {
            return Err(RenderError::RenderingFailed("constant buffer layout mismatch".to_string()));
        }
        let constants: ObjectConstants = bytemuck::pod_read_unaligned(constant_bytes);

        let texture_path = match draw.texture {
            Some(texture) => match self.resources.get(&texture.0) {
                Some(Resource::Texture { path }) => Some(path.clone()),
                _ => return Err(RenderError::InvalidHandle(ResourceHandle::Texture(texture))),
            },
            None => None,
        };

        self.frame_draws.push(DrawRecord { draw: *draw, constants, texture_path });
        self.total_draws += 1;
        Ok(())
    }

    fn release(&mut self, resource: ResourceHandle) {
        if self.resources.remove(&resource.id()).is_some() {
            trace!("Released {:?}", resource);
        }
    }

    fn begin_frame(&mut self, clear_colour: Vec4) -> RenderResult<()> {
        self.check_available()?;
        if self.in_frame {
            return Err(RenderError::RenderingFailed("frame already in progress".to_string()));
        }

        self.in_frame = true;
        self.clear_colour = Some(clear_colour);
        self.frame_draws.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        if !self.in_frame {
            return Err(RenderError::RenderingFailed("no frame in progress".to_string()));
        }

        self.in_frame = false;
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn immutable(usage: BufferUsage, bytes: usize) -> BufferDesc {
        BufferDesc { usage: usage | BufferUsage::IMMUTABLE, byte_width: bytes }
    }

    #[test]
    fn test_unavailable_device_rejects_creation() {
        let mut renderer = HeadlessRenderer::unavailable();
        assert!(!renderer.is_available());
        let result = renderer.create_shader(&ShaderDesc::vertex("shader.hlsl", "VS"));
        assert_eq!(result, Err(RenderError::DeviceUnavailable));
    }

    #[test]
    fn test_immutable_buffer_needs_data_and_rejects_updates() {
        let mut renderer = HeadlessRenderer::new();
        let desc = immutable(BufferUsage::VERTEX, 4);

        assert!(renderer.create_buffer(&desc, None).is_err());

        let buffer = renderer.create_buffer(&desc, Some(&[1, 2, 3, 4])).unwrap();
        assert!(renderer.update_buffer(buffer, &[0; 4]).is_err());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut renderer = HeadlessRenderer::new();
        let texture = renderer.create_texture(Path::new("Woodbox.bmp")).unwrap();
        assert_eq!(renderer.live_resource_count(), 1);

        renderer.release(ResourceHandle::Texture(texture));
        renderer.release(ResourceHandle::Texture(texture));

        assert_eq!(renderer.live_resource_count(), 0);
        assert!(!renderer.is_live(ResourceHandle::Texture(texture)));
    }

    #[test]
    fn test_injected_failures() {
        let mut renderer = HeadlessRenderer::new().with_texture_failure().with_shader_failure("PS");

        assert!(matches!(
            renderer.create_texture(Path::new("missing.bmp")),
            Err(RenderError::ResourceCreationFailed(_))
        ));
        assert!(matches!(
            renderer.create_shader(&ShaderDesc::pixel("shader.hlsl", "PS")),
            Err(RenderError::ShaderCompilationFailed { .. })
        ));
        assert!(renderer.create_shader(&ShaderDesc::vertex("shader.hlsl", "VS")).is_ok());
    }

    #[test]
    fn test_draw_rejects_wrong_stage_and_stale_handles() {
        let mut renderer = HeadlessRenderer::new();
        let vertices = renderer.create_buffer(&immutable(BufferUsage::VERTEX, 32), Some(&[0; 32])).unwrap();
        let indices = renderer.create_buffer(&immutable(BufferUsage::INDEX, 12), Some(&[0; 12])).unwrap();
        let vs = renderer.create_shader(&ShaderDesc::vertex("shader.hlsl", "VS")).unwrap();
        let ps = renderer.create_shader(&ShaderDesc::pixel("shader.hlsl", "PS")).unwrap();
        let layout = renderer.create_input_layout(&crate::render::Vertex::LAYOUT, vs).unwrap();
        let constants = renderer
            .create_buffer(
                &BufferDesc { usage: BufferUsage::CONSTANT, byte_width: std::mem::size_of::<ObjectConstants>() },
                None,
            )
            .unwrap();

        let draw = DrawIndexed {
            vertex_buffer: vertices,
            vertex_stride: 32,
            index_buffer: indices,
            index_count: 3,
            input_layout: layout,
            vertex_shader: vs,
            pixel_shader: ps,
            constant_buffer: constants,
            texture: None,
        };

        renderer.begin_frame(Vec4::new(0.0, 0.0, 0.0, 1.0)).unwrap();
        renderer.draw_indexed(&draw).unwrap();
        assert!(renderer.draw_indexed(&DrawIndexed { pixel_shader: vs, ..draw }).is_err());
        assert!(renderer.draw_indexed(&DrawIndexed { index_count: 4, ..draw }).is_err());

        renderer.release(ResourceHandle::Buffer(vertices));
        assert_eq!(
            renderer.draw_indexed(&draw),
            Err(RenderError::InvalidHandle(ResourceHandle::Buffer(vertices)))
        );
        renderer.end_frame().unwrap();

        assert_eq!(renderer.draws().len(), 1);
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn test_frames_must_be_balanced() {
        let mut renderer = HeadlessRenderer::new();
        assert!(renderer.end_frame().is_err());
        renderer.begin_frame(Vec4::zeros()).unwrap();
        assert!(renderer.begin_frame(Vec4::zeros()).is_err());
        renderer.end_frame().unwrap();
        assert_eq!(renderer.clear_colour(), Some(Vec4::zeros()));
    }
}
