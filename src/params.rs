use std::path::Path;

use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Bloom post-processing tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomParams {
    /// Luminance above which a pixel feeds the bloom.
    pub threshold: f32,
    /// Weight of the blurred brightness added back in the composite.
    pub intensity: f32,
    /// Number of horizontal+vertical blur iterations.
    pub blur_passes: u32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            intensity: 0.8,
            blur_passes: 4,
        }
    }
}

/// Camera tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 4.0],
        }
    }
}

/// Everything tunable about a demo run. Defaults reproduce the classic
/// grey-background red-cube scene; any subset can be overridden from a JSON
/// file passed with `--params`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoParams {
    pub background: [f32; 3],
    pub cube_color: [f32; 3],
    pub emissive_color: [f32; 3],
    pub emissive_strength: f32,
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub ambient_intensity: f32,
    pub light_direction: [f32; 3],
    /// Rotation added around Y every frame, in radians.
    pub spin: f32,
    pub camera: CameraParams,
    pub bloom: BloomParams,
}

impl Default for DemoParams {
    fn default() -> Self {
        Self {
            background: [0.667, 0.667, 0.667],
            cube_color: [1.0, 0.0, 0.0],
            emissive_color: [1.0, 0.1, 0.1],
            emissive_strength: 0.0,
            sky_color: [1.0, 1.0, 1.0],
            ground_color: [0.733, 0.733, 1.0],
            ambient_intensity: 0.3,
            light_direction: [0.2, 1.0, 1.0],
            spin: 0.01,
            camera: CameraParams::default(),
            bloom: BloomParams::default(),
        }
    }
}

impl DemoParams {
    /// Defaults for the bloom demo: darker background, glowing cube.
    pub fn glowing() -> Self {
        Self {
            background: [0.02, 0.02, 0.04],
            emissive_strength: 2.0,
            ambient_intensity: 0.1,
            ..Self::default()
        }
    }

    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let params = DemoParams::default();

        assert_eq!(params.cube_color, [1.0, 0.0, 0.0]);
        assert_eq!(params.spin, 0.01);
        assert_eq!(params.camera.fov_degrees, 60.0);
        assert_eq!(params.camera.position, [0.0, 0.0, 4.0]);
        assert_eq!(params.emissive_strength, 0.0, "Plain demos do not glow");
    }

    #[test]
    fn glowing_defaults_enable_emissive() {
        let params = DemoParams::glowing();
        assert!(params.emissive_strength > 0.0);
        assert_eq!(params.spin, 0.01, "Spin is shared across variants");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: DemoParams = serde_json::from_str(r#"{"spin": 0.05}"#).unwrap();
        assert_eq!(params.spin, 0.05);
        assert_eq!(params.cube_color, [1.0, 0.0, 0.0]);
        assert_eq!(params.bloom.blur_passes, 4);
    }

    #[test]
    fn round_trips_through_json() {
        let mut params = DemoParams::glowing();
        params.bloom.threshold = 0.5;

        let text = serde_json::to_string(&params).unwrap();
        let back: DemoParams = serde_json::from_str(&text).unwrap();

        assert_eq!(back.bloom.threshold, 0.5);
        assert_eq!(back.emissive_strength, params.emissive_strength);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = DemoParams::load(Path::new("/nonexistent/params.json"));
        assert!(result.is_err());
    }
}
