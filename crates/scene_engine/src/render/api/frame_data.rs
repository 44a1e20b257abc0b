//! Frame Rendering Data Structures
//!
//! The engine publishes one [`FrameState`] per frame; shape nodes read it
//! while rendering and pack an [`ObjectConstants`] payload for their draw.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Vec4};

/// Fixed lighting shared by every shape node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    /// Ambient light colour
    pub ambient_colour: Vec4,
    /// Directional light colour
    pub directional_colour: Vec4,
    /// Direction the directional light travels (w = 0)
    pub directional_vector: Vec4,
    /// Specular highlight colour
    pub specular_colour: Vec4,
    /// Specular exponent
    pub specular_power: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient_colour: Vec4::new(0.2, 0.2, 0.2, 1.0),
            // Gold
            directional_colour: Vec4::new(1.0, 0.843_137_3, 0.0, 1.0),
            directional_vector: Vec4::new(-1.0, -1.0, 1.0, 0.0),
            specular_colour: Vec4::new(1.0, 1.0, 1.0, 1.0),
            specular_power: 8.0,
        }
    }
}

/// Global rendering state read by nodes during render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// World to view transform
    pub view: Mat4,
    /// View to clip transform
    pub projection: Mat4,
    /// Clear colour for the frame
    pub background_colour: Vec4,
    /// Lighting parameters
    pub lighting: LightingParams,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            background_colour: Vec4::new(0.0, 0.0, 0.0, 1.0),
            lighting: LightingParams::default(),
        }
    }
}

/// Per-draw constant buffer payload
///
/// Layout must match the shader constant buffer: matrices are stored
/// column-major, and the trailing padding rounds the size to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// World × view × projection
    pub world_view_projection: [[f32; 4]; 4],
    /// World transform, for normals
    pub world: [[f32; 4]; 4],
    /// Material colour
    pub material_colour: [f32; 4],
    /// Ambient light colour
    pub ambient_light_colour: [f32; 4],
    /// Directional light colour
    pub directional_light_colour: [f32; 4],
    /// Directional light vector
    pub directional_light_vector: [f32; 4],
    /// Specular colour
    pub specular_colour: [f32; 4],
    /// Specular exponent
    pub specular_power: f32,
    /// Padding to a 16-byte boundary
    pub _padding: [f32; 3],
}

impl ObjectConstants {
    /// Pack the constants for an object drawn with `world` this frame
    pub fn new(world: &Mat4, material_colour: Vec4, frame: &FrameState) -> Self {
        let world_view_projection = frame.projection * frame.view * world;
        let lighting = &frame.lighting;

        Self {
            world_view_projection: world_view_projection.into(),
            world: (*world).into(),
            material_colour: material_colour.into(),
            ambient_light_colour: lighting.ambient_colour.into(),
            directional_light_colour: lighting.directional_colour.into(),
            directional_light_vector: lighting.directional_vector.into(),
            specular_colour: lighting.specular_colour.into(),
            specular_power: lighting.specular_power,
            _padding: [0.0; 3],
        }
    }

    /// The world transform as a matrix
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from(self.world)
    }

    /// The world-view-projection transform as a matrix
    pub fn world_view_projection_matrix(&self) -> Mat4 {
        Mat4::from(self.world_view_projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_constants_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<ObjectConstants>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 224);
    }

    #[test]
    fn test_constants_compose_world_view_projection() {
        let frame = FrameState {
            view: Mat4::translation(Vec3::new(0.0, 0.0, 10.0)),
            projection: Mat4::scaling(Vec3::new(2.0, 2.0, 1.0)),
            ..FrameState::default()
        };
        let world = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        let constants = ObjectConstants::new(&world, Vec4::new(0.0, 0.0, 0.25, 1.0), &frame);

        assert_relative_eq!(constants.world_matrix(), world);
        assert_relative_eq!(constants.world_view_projection_matrix(), frame.projection * frame.view * world);
        assert_eq!(constants.material_colour, [0.0, 0.0, 0.25, 1.0]);
        assert_eq!(constants.directional_light_vector, [-1.0, -1.0, 1.0, 0.0]);
        assert!((constants.specular_power - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_constants_round_trip_through_bytes() {
        let constants = ObjectConstants::new(&Mat4::identity(), Vec4::new(1.0, 1.0, 1.0, 1.0), &FrameState::default());
        let bytes = bytemuck::bytes_of(&constants);
        let decoded: ObjectConstants = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(decoded, constants);
    }
}
