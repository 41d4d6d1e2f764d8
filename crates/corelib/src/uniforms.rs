use crate::camera::{Camera, Viewport};
use crate::transform::{Transform, normal_matrix, spin_angle};
use crate::{Mat3, Mat4};

/// Per-frame shader constants. Rebuilt for every frame, never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub model_view: Mat4,
    pub projection: Mat4,
    /// Present only for the lit variant.
    pub normal: Option<Mat3>,
}

impl Uniforms {
    /// Constants for a frame at `time` seconds drawn into `viewport`.
    pub fn for_frame(time: f32, viewport: Viewport, lighting: bool) -> Self {
        let camera = Camera::fixed(viewport.aspect());
        let model = Transform::spin(spin_angle(time)).matrix();
        let model_view = camera.view() * model;
        Self {
            model_view,
            projection: camera.proj(),
            normal: lighting.then(|| normal_matrix(model_view)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn model_view_is_view_times_model() {
        let u = Uniforms::for_frame(0.75, Viewport::new(800, 600), false);
        let expected = Mat4::from_translation(Vec3::new(0.0, -0.2, -2.0))
            * Mat4::from_rotation_y(-0.75)
            * Mat4::from_scale(Vec3::splat(0.2));
        assert!(u.model_view.abs_diff_eq(expected, 1e-6));
        assert!(u.normal.is_none());
    }

    #[test]
    fn lit_variant_carries_normal_matrix() {
        let u = Uniforms::for_frame(0.0, Viewport::new(800, 600), true);
        let n = u.normal.expect("normal matrix");
        // Uniform scale 0.2 inverts to 5 along the diagonal at angle 0.
        assert!((n.x_axis.x - 5.0).abs() < 1e-4);
        assert!((n.y_axis.y - 5.0).abs() < 1e-4);
        assert!((n.z_axis.z - 5.0).abs() < 1e-4);
    }
}
