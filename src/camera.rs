use glam::{Mat4, Vec3};

use crate::params::CameraParams;

/// Perspective camera looking at a fixed target.
///
/// The aspect ratio is the only field the resize handler touches; everything
/// else changes through orbit controls or the debug panel.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(params: &CameraParams, width: u32, height: u32) -> Self {
        Self {
            position: Vec3::from_array(params.position),
            target: Vec3::ZERO,
            fov_y: params.fov_degrees.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: params.near,
            far: params.far,
        }
    }

    /// Recompute the aspect ratio after a resize. A zero-height size
    /// (minimized window) is ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::new(&CameraParams::default(), 800, 600)
    }

    #[test]
    fn aspect_follows_resize() {
        let mut camera = test_camera();
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

        camera.set_aspect(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn resize_changes_nothing_else() {
        let mut camera = test_camera();
        let position = camera.position;
        let fov = camera.fov_y;

        camera.set_aspect(640, 480);

        assert_eq!(camera.position, position);
        assert_eq!(camera.fov_y, fov);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
    }

    #[test]
    fn zero_height_resize_is_ignored() {
        let mut camera = test_camera();
        let aspect = camera.aspect;

        camera.set_aspect(800, 0);

        assert_eq!(camera.aspect, aspect);
    }

    #[test]
    fn matrices_are_finite() {
        let camera = test_camera();
        let vp = camera.view_projection();

        for col in 0..4 {
            assert!(!vp.col(col).x.is_nan(), "View-projection must not contain NaN");
        }
    }

    #[test]
    fn view_looks_down_negative_z_from_default() {
        // Default position (0, 0, 4) looking at the origin: a point in front
        // of the camera lands at negative view-space z.
        let camera = test_camera();
        let view = camera.view_matrix();
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.z < 0.0, "Target should be in front of the camera, got {}", p.z);
    }
}
