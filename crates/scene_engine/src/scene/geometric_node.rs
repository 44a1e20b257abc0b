use crate::foundation::math::Vec4;
use crate::render::{Mesh, MeshError, ParametricShape};
use super::shape::{ShapeLeaf, ShapeState};

/// Solid generated from a [`ParametricShape`]
#[derive(Debug)]
pub struct GeometricNode {
    shape: ParametricShape,
    colour: Vec4,
    state: ShapeState,
}

impl GeometricNode {
    /// Create a generated solid with the given material colour
    pub fn new(shape: ParametricShape, colour: Vec4) -> Self {
        Self { shape, colour, state: ShapeState::default() }
    }

    /// Shape parameters
    pub fn shape(&self) -> &ParametricShape {
        &self.shape
    }
}

impl ShapeLeaf for GeometricNode {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn kind(&self) -> &str {
        self.shape.kind()
    }

    fn build_mesh(&self) -> Result<Mesh, MeshError> {
        self.shape.generate()
    }

    fn material_colour(&self) -> Vec4 {
        self.colour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;
    use crate::scene::SceneError;

    #[test]
    fn test_sphere_initialises() {
        let mut renderer = HeadlessRenderer::new();
        let sphere = ParametricShape::Sphere { diameter: 2.0, tessellation: 8 };
        let mut node = GeometricNode::new(sphere, Vec4::new(0.5, 0.5, 0.0, 1.0));
        assert_eq!(node.shape(), &sphere);
        assert_eq!(node.kind(), "sphere");

        node.initialise("Teapot01", &mut renderer).unwrap();
        assert!(node.is_initialised());
        assert!(node.mesh().unwrap().triangle_count() > 0);
    }

    #[test]
    fn test_invalid_shape_fails_before_touching_device() {
        let mut renderer = HeadlessRenderer::new();
        let mut node = GeometricNode::new(
            ParametricShape::Cone { diameter: 1.0, height: 2.0, tessellation: 2 },
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        );

        let err = node.initialise("Cone", &mut renderer).unwrap_err();
        assert!(matches!(err, SceneError::Mesh { .. }));
        assert_eq!(renderer.live_resource_count(), 0);
    }
}
