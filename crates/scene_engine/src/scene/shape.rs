//! Shared lifecycle for drawable leaf nodes
//!
//! Every shape runs the same device sequence: build the mesh, derive vertex
//! normals, upload immutable vertex and index buffers, compile a vertex and a
//! pixel shader, create the input layout and a per-object constant buffer, and
//! optionally load a texture. Shapes differ only in the mesh they build, the
//! shader file they use, their material colour and their texture.

use std::path::Path;

use log::{debug, warn};

use crate::foundation::math::{Mat4, Vec4};
use crate::render::{
    BufferDesc, BufferHandle, BufferUsage, DrawIndexed, FrameState, InputLayoutHandle, Mesh, MeshError,
    ObjectConstants, RenderError, RenderResult, Renderer, ResourceHandle, ShaderDesc, ShaderHandle,
    TextureHandle, Vertex,
};
use super::SceneError;

/// Shader source used by untextured shapes
pub const SHADER_FILE: &str = "shader.hlsl";

/// Shader source used by textured shapes
pub const TEXTURED_SHADER_FILE: &str = "TexturedShader.hlsl";

/// Vertex shader entry point
pub const VERTEX_SHADER_ENTRY: &str = "VS";

/// Pixel shader entry point
pub const PIXEL_SHADER_ENTRY: &str = "PS";

/// Device resources held by an initialised shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeviceResources {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    vertex_shader: ShaderHandle,
    pixel_shader: ShaderHandle,
    input_layout: InputLayoutHandle,
    constant_buffer: BufferHandle,
    texture: Option<TextureHandle>,
}

impl DeviceResources {
    fn handles(&self) -> impl Iterator<Item = ResourceHandle> {
        [
            ResourceHandle::Buffer(self.vertex_buffer),
            ResourceHandle::Buffer(self.index_buffer),
            ResourceHandle::Shader(self.vertex_shader),
            ResourceHandle::Shader(self.pixel_shader),
            ResourceHandle::InputLayout(self.input_layout),
            ResourceHandle::Buffer(self.constant_buffer),
        ]
        .into_iter()
        .chain(self.texture.map(ResourceHandle::Texture))
    }
}

/// Mesh and device state owned by a shape
///
/// Empty until the shape is initialised, and emptied again on shutdown.
#[derive(Debug, Default)]
pub struct ShapeState {
    mesh: Option<Mesh>,
    resources: Option<DeviceResources>,
}

/// Capability shared by every drawable leaf
pub trait ShapeLeaf: std::fmt::Debug {
    /// Mesh and device state
    fn state(&self) -> &ShapeState;

    /// Mutable mesh and device state
    fn state_mut(&mut self) -> &mut ShapeState;

    /// Short shape name for logging
    fn kind(&self) -> &str;

    /// Build the object-space geometry, normals not yet computed
    fn build_mesh(&self) -> Result<Mesh, MeshError>;

    /// Shader source file compiled for this shape
    fn shader_file(&self) -> &str {
        SHADER_FILE
    }

    /// Colour written to the constant buffer
    fn material_colour(&self) -> Vec4;

    /// Texture bound at pixel slot 0, if any
    fn texture_path(&self) -> Option<&Path> {
        None
    }

    /// Whether device resources are live
    fn is_initialised(&self) -> bool {
        self.state().resources.is_some()
    }

    /// Geometry uploaded at initialise, with computed normals
    fn mesh(&self) -> Option<&Mesh> {
        self.state().mesh.as_ref()
    }

    /// Create all device resources for this shape
    ///
    /// Already initialised shapes are left untouched. If any device call
    /// fails, resources created so far are released and the shape stays
    /// uninitialised.
    fn initialise(&mut self, name: &str, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        if self.is_initialised() {
            debug!("'{}' already initialised", name);
            return Ok(());
        }

        if !renderer.is_available() {
            return Err(SceneError::DeviceUnavailable { node: name.to_string() });
        }

        let mut mesh = self.build_mesh().map_err(|source| SceneError::Mesh { node: name.to_string(), source })?;
        mesh.compute_vertex_normals()
            .map_err(|source| SceneError::Mesh { node: name.to_string(), source })?;

        let mut created = Vec::new();
        let result = create_resources(&mesh, self.shader_file(), self.texture_path(), renderer, &mut created);

        match result {
            Ok(resources) => {
                debug!(
                    "Initialised {} '{}': {} vertices, {} triangles",
                    self.kind(),
                    name,
                    mesh.vertices.len(),
                    mesh.triangle_count()
                );
                let state = self.state_mut();
                state.mesh = Some(mesh);
                state.resources = Some(resources);
                Ok(())
            }
            Err(source) => {
                for handle in created {
                    renderer.release(handle);
                }
                Err(match source {
                    RenderError::DeviceUnavailable => SceneError::DeviceUnavailable { node: name.to_string() },
                    source => SceneError::Render { node: name.to_string(), source },
                })
            }
        }
    }

    /// Upload this frame's constants and draw
    ///
    /// An uninitialised shape logs a warning and draws nothing.
    fn render(&self, name: &str, world: &Mat4, frame: &FrameState, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        let Some(resources) = self.state().resources else {
            warn!("Skipping render of uninitialised node '{}'", name);
            return Ok(());
        };

        let constants = ObjectConstants::new(world, self.material_colour(), frame);
        let draw = DrawIndexed {
            vertex_buffer: resources.vertex_buffer,
            vertex_stride: Vertex::STRIDE,
            index_buffer: resources.index_buffer,
            index_count: resources.index_count,
            input_layout: resources.input_layout,
            vertex_shader: resources.vertex_shader,
            pixel_shader: resources.pixel_shader,
            constant_buffer: resources.constant_buffer,
            texture: resources.texture,
        };

        renderer
            .update_buffer(resources.constant_buffer, bytemuck::bytes_of(&constants))
            .and_then(|()| renderer.draw_indexed(&draw))
            .map_err(|source| SceneError::Render { node: name.to_string(), source })
    }

    /// Release every device resource; safe to call repeatedly
    fn shutdown(&mut self, name: &str, renderer: &mut dyn Renderer) {
        let state = self.state_mut();
        state.mesh = None;
        if let Some(resources) = state.resources.take() {
            for handle in resources.handles() {
                renderer.release(handle);
            }
            debug!("Shut down '{}'", name);
        }
    }
}

fn create_resources(
    mesh: &Mesh,
    shader_file: &str,
    texture_path: Option<&Path>,
    renderer: &mut dyn Renderer,
    created: &mut Vec<ResourceHandle>,
) -> RenderResult<DeviceResources> {
    let index_count = u32::try_from(mesh.indices.len())
        .map_err(|_| RenderError::ResourceCreationFailed(format!("{} indices exceed u32", mesh.indices.len())))?;

    let vertex_bytes = mesh.vertex_bytes();
    let vertex_buffer = renderer.create_buffer(
        &BufferDesc { usage: BufferUsage::VERTEX | BufferUsage::IMMUTABLE, byte_width: vertex_bytes.len() },
        Some(vertex_bytes),
    )?;
    created.push(ResourceHandle::Buffer(vertex_buffer));

    let index_bytes = mesh.index_bytes();
    let index_buffer = renderer.create_buffer(
        &BufferDesc { usage: BufferUsage::INDEX | BufferUsage::IMMUTABLE, byte_width: index_bytes.len() },
        Some(index_bytes),
    )?;
    created.push(ResourceHandle::Buffer(index_buffer));

    let vertex_shader = renderer.create_shader(&ShaderDesc::vertex(shader_file, VERTEX_SHADER_ENTRY))?;
    created.push(ResourceHandle::Shader(vertex_shader));

    let pixel_shader = renderer.create_shader(&ShaderDesc::pixel(shader_file, PIXEL_SHADER_ENTRY))?;
    created.push(ResourceHandle::Shader(pixel_shader));

    let input_layout = renderer.create_input_layout(&Vertex::LAYOUT, vertex_shader)?;
    created.push(ResourceHandle::InputLayout(input_layout));

    let constant_buffer = renderer.create_buffer(
        &BufferDesc { usage: BufferUsage::CONSTANT, byte_width: std::mem::size_of::<ObjectConstants>() },
        None,
    )?;
    created.push(ResourceHandle::Buffer(constant_buffer));

    let texture = match texture_path {
        Some(path) => {
            let texture = renderer.create_texture(path)?;
            created.push(ResourceHandle::Texture(texture));
            Some(texture)
        }
        None => None,
    };

    Ok(DeviceResources {
        vertex_buffer,
        index_buffer,
        index_count,
        vertex_shader,
        pixel_shader,
        input_layout,
        constant_buffer,
        texture,
    })
}
