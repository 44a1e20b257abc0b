//! Cube shapes
//!
//! Both cubes share the same 24-vertex ±1 geometry: four vertices per face so
//! each face gets its own normal and texture coordinates.

use std::path::{Path, PathBuf};

use crate::foundation::math::Vec4;
use crate::render::{Mesh, MeshError};
use super::shape::{ShapeLeaf, ShapeState, TEXTURED_SHADER_FILE};

/// Solid coloured cube
#[derive(Debug)]
pub struct CubeNode {
    colour: Vec4,
    state: ShapeState,
}

impl CubeNode {
    /// Default material colour: dark grey
    pub const DEFAULT_COLOUR: Vec4 = Vec4::new(0.25, 0.25, 0.25, 1.0);

    /// Create a cube with the given material colour
    pub fn new(colour: Vec4) -> Self {
        Self { colour, state: ShapeState::default() }
    }

    /// Material colour
    pub fn colour(&self) -> Vec4 {
        self.colour
    }
}

impl Default for CubeNode {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COLOUR)
    }
}

impl ShapeLeaf for CubeNode {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn kind(&self) -> &str {
        "cube"
    }

    fn build_mesh(&self) -> Result<Mesh, MeshError> {
        Ok(Mesh::cube())
    }

    fn material_colour(&self) -> Vec4 {
        self.colour
    }
}

/// Cube drawn with a texture, lit with a white material
#[derive(Debug)]
pub struct TexturedCubeNode {
    texture_path: PathBuf,
    state: ShapeState,
}

impl TexturedCubeNode {
    /// Material colour for textured shapes
    pub const MATERIAL_COLOUR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

    /// Create a cube textured from an image file
    pub fn new(texture_path: impl Into<PathBuf>) -> Self {
        Self { texture_path: texture_path.into(), state: ShapeState::default() }
    }
}

impl ShapeLeaf for TexturedCubeNode {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn kind(&self) -> &str {
        "textured cube"
    }

    fn build_mesh(&self) -> Result<Mesh, MeshError> {
        Ok(Mesh::cube())
    }

    fn shader_file(&self) -> &str {
        TEXTURED_SHADER_FILE
    }

    fn material_colour(&self) -> Vec4 {
        Self::MATERIAL_COLOUR
    }

    fn texture_path(&self) -> Option<&Path> {
        Some(&self.texture_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessRenderer, Renderer, ResourceHandle};

    #[test]
    fn test_cube_colour_reaches_material() {
        let colour = Vec4::new(0.0, 0.25, 0.0, 1.0);
        let cube = CubeNode::new(colour);
        assert_eq!(cube.colour(), colour);
        assert_eq!(cube.material_colour(), colour);
        assert_eq!(CubeNode::default().colour(), CubeNode::DEFAULT_COLOUR);
        assert_eq!(cube.kind(), "cube");
    }

    #[test]
    fn test_cube_initialise_computes_normals() {
        let mut renderer = HeadlessRenderer::new();
        let mut cube = CubeNode::default();

        cube.initialise("Body", &mut renderer).unwrap();

        let mesh = cube.mesh().unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.vertices.iter().all(|v| v.normal != [0.0; 3]));
        // vertex + index + 2 shaders + layout + constants
        assert_eq!(renderer.live_resource_count(), 6);
    }

    #[test]
    fn test_textured_cube_creates_texture() {
        let mut renderer = HeadlessRenderer::new();
        let mut cube = TexturedCubeNode::new("Woodbox.bmp");

        cube.initialise("Box", &mut renderer).unwrap();
        assert_eq!(renderer.live_resource_count(), 7);
        assert_eq!(cube.shader_file(), TEXTURED_SHADER_FILE);

        cube.shutdown("Box", &mut renderer);
        assert_eq!(renderer.live_resource_count(), 0);
        assert!(cube.mesh().is_none());
    }

    #[test]
    fn test_failed_initialise_releases_partial_resources() {
        let mut renderer = HeadlessRenderer::new().with_shader_failure("PS");
        let mut cube = CubeNode::default();

        assert!(cube.initialise("Body", &mut renderer).is_err());
        assert!(!cube.is_initialised());
        assert_eq!(renderer.live_resource_count(), 0);
    }

    #[test]
    fn test_initialise_twice_keeps_first_resources() {
        let mut renderer = HeadlessRenderer::new();
        let mut cube = CubeNode::default();

        cube.initialise("Body", &mut renderer).unwrap();
        cube.initialise("Body", &mut renderer).unwrap();
        assert_eq!(renderer.live_resource_count(), 6);

        cube.shutdown("Body", &mut renderer);
        assert!(!renderer.is_live(ResourceHandle::Buffer(crate::render::BufferHandle(1))));
        assert!(renderer.is_available());
    }
}
