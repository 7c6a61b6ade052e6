use glam::Vec3;
use spincube::params::CameraParams;
use spincube::{Camera, OrbitControls};

#[cfg(test)]
mod orbit_controls_tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    fn camera() -> Camera {
        Camera::new(&CameraParams::default(), 800, 600)
    }

    #[test]
    fn test_orbit_keeps_target_centered() {
        let mut cam = camera();
        let mut orbit = OrbitControls::from_camera(&cam, Vec3::ZERO);

        for i in 0..16 {
            orbit.rotate(TAU / 16.0, 0.02 * i as f32);
            orbit.apply_to(&mut cam);

            let view = cam.view_matrix();
            let target_in_view = view.transform_point3(Vec3::ZERO);
            assert!(
                target_in_view.x.abs() < 1e-4 && target_in_view.y.abs() < 1e-4,
                "Target must stay on the view axis, got {:?}",
                target_in_view
            );
        }
    }

    #[test]
    fn test_zoom_moves_along_view_axis() {
        let mut cam = camera();
        let mut orbit = OrbitControls::from_camera(&cam, Vec3::ZERO);
        let before = orbit.position();

        orbit.zoom(1.0);
        let after = orbit.position();

        assert!(after.length() < before.length(), "Positive steps zoom in");
        let dir_before = before.normalize();
        let dir_after = after.normalize();
        assert!(
            dir_before.dot(dir_after) > 0.9999,
            "Zoom must not change the viewing direction"
        );
    }

    #[test]
    fn test_distance_clamp_bounds() {
        let mut orbit = OrbitControls::from_camera(&camera(), Vec3::ZERO);

        for _ in 0..1000 {
            orbit.zoom(5.0);
        }
        assert!(orbit.distance >= orbit.min_distance);

        for _ in 0..1000 {
            orbit.zoom(-5.0);
        }
        assert!(orbit.distance <= orbit.max_distance);
    }

    #[test]
    fn test_polar_never_reaches_poles() {
        let mut orbit = OrbitControls::from_camera(&camera(), Vec3::ZERO);

        orbit.rotate(0.0, PI);
        assert!(orbit.polar < PI);

        orbit.rotate(0.0, -TAU);
        assert!(orbit.polar > 0.0);

        // The up vector stays usable: position never sits exactly on the
        // vertical axis.
        let p = orbit.position();
        assert!(p.x.abs() + p.z.abs() > 0.0);
    }

    #[test]
    fn test_orbit_around_offset_target() {
        let mut cam = camera();
        cam.position = Vec3::new(3.0, 2.0, 5.0);
        let target = Vec3::new(1.0, 1.0, 1.0);
        let orbit = OrbitControls::from_camera(&cam, target);

        let expected_distance = (cam.position - target).length();
        assert!((orbit.distance - expected_distance).abs() < 1e-4);
        assert!((orbit.position() - cam.position).length() < 1e-3);
    }
}
