//! Math utilities and types
//!
//! Provides the vector and matrix types used by the scene graph. Matrices use
//! nalgebra's column-vector convention: a point is transformed as `M * p`, and
//! `A * B` applies `B` first.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colours)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with the affine builders scene code composes
pub trait Mat4Ext {
    /// Non-uniform scale
    fn scaling(scale: Vec3) -> Mat4;

    /// Translation by `offset`
    fn translation(offset: Vec3) -> Mat4;

    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a perspective projection matrix with depth mapped to [0, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a left-handed look-at view matrix
    ///
    /// Points in front of the camera get positive view-space z, matching
    /// [`Mat4Ext::perspective`].
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn scaling(scale: Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(&scale)
    }

    fn translation(offset: Vec3) -> Mat4 {
        Mat4::new_translation(&offset)
    }

    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();

        // P = [a⁻¹/tan(φ/2)    0              0                    0           ]
        //     [0               1/tan(φ/2)     0                    0           ]
        //     [0               0              f/(f-n)              -nf/(f-n)   ]
        //     [0               0              1                    0           ]
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = up.cross(&forward).normalize();
        let camera_up = forward.cross(&right);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            forward.x, forward.y, forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_translation_then_rotation_order() {
        // Rotating after translating swings the offset around the Y axis
        let m = Mat4::rotation_y(constants::PI / 2.0) * Mat4::translation(Vec3::new(5.0, 0.0, 0.0));
        let p = m.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scaling_scales_points() {
        let m = Mat4::scaling(Vec3::new(2.0, 3.0, 4.0));
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.0, 3.0, 4.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 20.0, -90.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());
        let p = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(p, Point3::origin(), epsilon = 1e-3);
    }

    #[test]
    fn test_look_at_puts_target_in_front() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::zeros(), Vec3::y());
        let target = view.transform_point(&Point3::origin());
        assert_relative_eq!(target, Point3::new(0.0, 0.0, 10.0), epsilon = EPSILON);

        // Camera right is world +X when looking down +Z
        let right = view.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(right.x, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_view_projection_keeps_target_in_clip_volume() {
        let view = Mat4::look_at(Vec3::new(0.0, 20.0, -90.0), Vec3::zeros(), Vec3::y());
        let proj = Mat4::perspective(utils::deg_to_rad(45.0), 4.0 / 3.0, 1.0, 10000.0);
        let clip = proj * view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = EPSILON);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Mat4::perspective(utils::deg_to_rad(45.0), 4.0 / 3.0, 1.0, 100.0);
        let near = proj * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = EPSILON);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = EPSILON);
    }
}
