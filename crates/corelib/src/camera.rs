use crate::{Mat4, Vec3};

/// Vertical field of view of the fixed camera.
pub const FOV_Y_RAD: f32 = std::f32::consts::FRAC_PI_3;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Camera offset applied as the view transform. The camera never moves.
pub const VIEW_TRANSLATION: Vec3 = Vec3::new(0.0, -0.2, -2.0);

/// Drawable size in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized viewport (minimized window) cannot be drawn into.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Static perspective camera (right-handed, depth in [0, 1]).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub translation: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    /// The camera used for every frame; only the aspect ratio varies.
    pub fn fixed(aspect: f32) -> Self {
        Self {
            translation: VIEW_TRANSLATION,
            fov_y_rad: FOV_Y_RAD,
            z_near: Z_NEAR,
            z_far: Z_FAR,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
    }

    /// glam's `perspective_rh` already maps depth to [0, 1], which is what
    /// wgpu expects, so no clip-space fix-up is applied.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}
