use glam::Vec3;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::camera::Camera;

pub const ROTATE_SPEED: f32 = 0.005;
pub const ZOOM_SPEED: f32 = 0.1;
const MIN_POLAR: f32 = 0.01;

/// Orbit camera controls: pointer drag rotates the camera around a fixed
/// target, the scroll wheel zooms. The camera position is derived from
/// spherical coordinates every frame; whatever else wrote to it loses.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    /// Build controls whose initial orientation reproduces `camera`'s
    /// current position relative to `target`.
    pub fn from_camera(camera: &Camera, target: Vec3) -> Self {
        let offset = camera.position - target;
        let distance = offset.length().max(MIN_POLAR);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.z.atan2(offset.x);

        Self {
            target,
            azimuth,
            polar: polar.clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR),
            distance,
            min_distance: 0.5,
            max_distance: 50.0,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state.is_pressed();
            if !self.dragging {
                self.last_cursor = None;
            }
        }
    }

    pub fn process_cursor(&mut self, position: PhysicalPosition<f64>) {
        let current = (position.x, position.y);
        if self.dragging {
            if let Some((lx, ly)) = self.last_cursor {
                let dx = (current.0 - lx) as f32;
                let dy = (current.1 - ly) as f32;
                self.rotate(dx * ROTATE_SPEED, dy * ROTATE_SPEED);
            }
        }
        self.last_cursor = Some(current);
    }

    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
        };
        self.zoom(steps);
    }

    /// Rotate by the given azimuth/polar deltas in radians. The polar angle
    /// is kept away from the poles so the view never flips.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth += d_azimuth;
        self.polar = (self.polar + d_polar).clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);
    }

    /// Zoom in (positive steps) or out (negative steps), scaling the
    /// distance so each step feels the same at any range.
    pub fn zoom(&mut self, steps: f32) {
        self.distance =
            (self.distance * (1.0 - steps * ZOOM_SPEED)).clamp(self.min_distance, self.max_distance);
    }

    /// Camera position for the current spherical state.
    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.cos(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.sin(),
                )
    }

    /// Write the derived position and target into the camera.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.position = self.position();
        camera.target = self.target;
    }
}
