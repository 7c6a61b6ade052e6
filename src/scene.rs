use glam::{EulerRot, Mat4, Vec3};

use crate::params::DemoParams;

/// Hemisphere ambient light: sky color above, ground color below,
/// blended by the surface normal's vertical component.
#[derive(Debug, Clone, Copy)]
pub struct HemisphereLight {
    pub sky: Vec3,
    pub ground: Vec3,
    pub intensity: f32,
}

/// Directional light shining from `direction` towards the origin.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Surface appearance for the cube.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub base_color: Vec3,
    pub emissive_color: Vec3,
    pub emissive_strength: f32,
}

impl Material {
    pub fn emissive(&self) -> Vec3 {
        self.emissive_color * self.emissive_strength
    }
}

/// The one drawable object: fixed unit-cube geometry plus a material and a
/// rotation that advances every frame.
#[derive(Debug, Clone, Copy)]
pub struct CubeMesh {
    pub material: Material,
    pub rotation: Vec3,
}

impl CubeMesh {
    /// Model matrix for the current rotation (Euler XYZ, unit scale).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

/// Everything composed together for drawing: background, two lights, and the
/// cube. Owned by the application for the lifetime of the window.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub background: Vec3,
    pub hemisphere: HemisphereLight,
    pub sun: DirectionalLight,
    pub cube: CubeMesh,
    pub spin: f32,
}

impl Scene {
    pub fn new(params: &DemoParams) -> Self {
        Self {
            background: Vec3::from_array(params.background),
            hemisphere: HemisphereLight {
                sky: Vec3::from_array(params.sky_color),
                ground: Vec3::from_array(params.ground_color),
                intensity: params.ambient_intensity,
            },
            sun: DirectionalLight {
                direction: Vec3::from_array(params.light_direction).normalize(),
                color: Vec3::ONE,
                intensity: 1.0,
            },
            cube: CubeMesh {
                material: Material {
                    base_color: Vec3::from_array(params.cube_color),
                    emissive_color: Vec3::from_array(params.emissive_color),
                    emissive_strength: params.emissive_strength,
                },
                rotation: Vec3::ZERO,
            },
            spin: params.spin,
        }
    }

    /// Advance one frame: add the fixed spin increment to the Y rotation,
    /// wrapping into [0, 2π). Deterministic per frame, independent of wall
    /// clock time.
    pub fn advance(&mut self) {
        self.cube.rotation.y = (self.cube.rotation.y + self.spin).rem_euclid(std::f32::consts::TAU);
    }

    pub fn clear_color(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.background.x as f64,
            g: self.background.y as f64,
            b: self.background.z as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn test_scene() -> Scene {
        Scene::new(&DemoParams::default())
    }

    #[test]
    fn advance_accumulates_fixed_increment() {
        let mut scene = test_scene();
        let spin = scene.spin;

        for _ in 0..100 {
            scene.advance();
        }

        let expected = (100.0 * spin).rem_euclid(TAU);
        assert!(
            (scene.cube.rotation.y - expected).abs() < 1e-4,
            "After 100 frames rotation should be 100 * spin, got {}",
            scene.cube.rotation.y
        );
    }

    #[test]
    fn advance_wraps_at_tau() {
        let mut scene = test_scene();
        scene.spin = 1.0;

        for _ in 0..7 {
            scene.advance();
        }

        assert!(
            scene.cube.rotation.y < TAU,
            "Rotation must stay in [0, 2π), got {}",
            scene.cube.rotation.y
        );
        assert!((scene.cube.rotation.y - (7.0f32).rem_euclid(TAU)).abs() < 1e-4);
    }

    #[test]
    fn advance_only_touches_y() {
        let mut scene = test_scene();
        scene.advance();

        assert_eq!(scene.cube.rotation.x, 0.0);
        assert_eq!(scene.cube.rotation.z, 0.0);
    }

    #[test]
    fn rotation_is_unclamped_state() {
        // Slider bounds live in the overlay; the scene accepts any angle.
        let mut scene = test_scene();
        scene.cube.rotation.y = 100.0;
        assert_eq!(scene.cube.rotation.y, 100.0);
    }

    #[test]
    fn model_matrix_identity_at_zero() {
        let scene = test_scene();
        let m = scene.cube.model_matrix();
        assert!((m.col(0).x - 1.0).abs() < 1e-6);
        assert!(m.col(3).truncate().length() < 1e-6, "Cube sits at the origin");
    }

    #[test]
    fn emissive_scales_with_strength() {
        let mut mat = test_scene().cube.material;
        mat.emissive_color = Vec3::new(1.0, 0.5, 0.0);
        mat.emissive_strength = 2.0;
        assert_eq!(mat.emissive(), Vec3::new(2.0, 1.0, 0.0));
    }
}
