use std::f32::consts::TAU;

use spincube::params::DemoParams;
use spincube::Scene;

#[cfg(test)]
mod frame_rotation_tests {
    use super::*;

    #[test]
    fn test_n_frames_accumulate_n_increments() {
        let mut scene = Scene::new(&DemoParams::default());
        let spin = scene.spin;

        for _ in 0..500 {
            scene.advance();
        }

        let expected = (500.0 * spin).rem_euclid(TAU);
        assert!(
            (scene.cube.rotation.y - expected).abs() < 1e-3,
            "After 500 frames expected rotation {}, got {}",
            expected,
            scene.cube.rotation.y
        );
    }

    #[test]
    fn test_rotation_stays_in_range_over_long_runs() {
        let mut scene = Scene::new(&DemoParams::default());
        scene.spin = 0.1;

        for frame in 0..10_000 {
            scene.advance();
            assert!(
                scene.cube.rotation.y >= 0.0 && scene.cube.rotation.y < TAU,
                "Rotation left [0, 2π) at frame {}: {}",
                frame,
                scene.cube.rotation.y
            );
        }
    }

    #[test]
    fn test_spin_increment_is_deterministic() {
        let mut a = Scene::new(&DemoParams::default());
        let mut b = Scene::new(&DemoParams::default());

        for _ in 0..1000 {
            a.advance();
        }
        for _ in 0..1000 {
            b.advance();
        }

        assert_eq!(
            a.cube.rotation.y, b.cube.rotation.y,
            "Two identical runs must land on identical rotations"
        );
    }

    #[test]
    fn test_custom_spin_from_params() {
        let params: DemoParams = serde_json::from_str(r#"{"spin": 0.25}"#).unwrap();
        let mut scene = Scene::new(&params);

        scene.advance();
        scene.advance();

        assert!((scene.cube.rotation.y - 0.5).abs() < 1e-6);
    }
}
