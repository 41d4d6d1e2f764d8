use crate::{Mat3, Mat4, Vec3};

/// Uniform scale applied to the mesh before it is spun.
pub const MODEL_SCALE: f32 = 0.2;

/// Model transform: uniform scale, then rotation about +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Rotation about the Y axis in radians.
    pub angle_y: f32,
    pub scale: f32,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            angle_y: 0.0,
            scale: 1.0,
        }
    }

    /// Transform of the displayed mesh at the given rotation angle.
    #[inline]
    pub const fn spin(angle_y: f32) -> Self {
        Self {
            angle_y,
            scale: MODEL_SCALE,
        }
    }

    /// Build matrix = R_y * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle_y) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation angle of the mesh after `time` seconds.
#[inline]
pub fn spin_angle(time: f32) -> f32 {
    -time
}

/// Upper-left 3x3 of the inverse-transpose of `model_view`.
#[inline]
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view.inverse().transpose())
}
