//! Cameras produce the view-projection matrix uploaded as `u_ViewProjection`.

use glam::{Mat4, Quat, Vec3};

/// Anything that can provide a combined view-projection matrix.
pub trait Camera {
    fn view_projection(&self) -> Mat4;
}

/// A 2D camera looking down the negative Z axis.
///
/// The view matrix is the inverse of `translate(position) * rotate_z(rotation)`.
/// World z in `[-1, 1]` maps to depth `[1, 0]`, so larger z draws in front.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    position: Vec3,
    /// Degrees, counter-clockwise.
    rotation: f32,
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let projection = Self::orthographic(left, right, bottom, top);
        Self {
            projection,
            view: Mat4::IDENTITY,
            view_projection: projection,
            position: Vec3::ZERO,
            rotation: 0.0,
        }
    }

    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Self::orthographic(left, right, bottom, top);
        self.view_projection = self.projection * self.view;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recalculate_view();
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the rotation around Z, in degrees.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.recalculate_view();
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32) -> Mat4 {
        Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0)
    }

    fn recalculate_view(&mut self) {
        let transform = Mat4::from_translation(self.position)
            * Mat4::from_quat(Quat::from_rotation_z(self.rotation.to_radians()));
        self.view = transform.inverse();
        self.view_projection = self.projection * self.view;
    }
}

impl Camera for OrthographicCamera {
    fn view_projection(&self) -> Mat4 {
        self.view_projection
    }
}

/// A camera defined directly by its projection matrix, with an exposure value
/// for tone-mapped shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionCamera {
    projection: Mat4,
    exposure: f32,
}

impl Default for ProjectionCamera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl ProjectionCamera {
    pub const DEFAULT_EXPOSURE: f32 = 0.8;

    pub fn new(projection: Mat4) -> Self {
        Self {
            projection,
            exposure: Self::DEFAULT_EXPOSURE,
        }
    }

    /// Perspective camera with a vertical field of view in degrees.
    pub fn perspective_fov(fov_degrees: f32, width: f32, height: f32, near: f32, far: f32) -> Self {
        let mut camera = Self::default();
        camera.set_perspective(fov_degrees, width, height, near, far);
        camera
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn set_perspective(&mut self, fov_degrees: f32, width: f32, height: f32, near: f32, far: f32) {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        self.projection = Mat4::perspective_rh(fov_degrees.to_radians(), aspect, near, far);
    }

    /// Orthographic projection centred on the origin.
    pub fn set_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) {
        let (half_width, half_height) = (width * 0.5, height * 0.5);
        self.projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            near,
            far,
        );
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
}

impl Camera for ProjectionCamera {
    fn view_projection(&self) -> Mat4 {
        self.projection
    }
}
