use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::orbit::OrbitControls;
use crate::overlay::PanelBindings;
use crate::params::DemoParams;
use crate::renderer::CubeRenderer;
use crate::scene::Scene;
use crate::time::{Clock, FrameStats};

/// Shown when no graphics adapter or device can be acquired at startup.
pub const CAPABILITY_WARNING: &str = "\
Your graphics device does not appear to support WebGPU.\n\
The demo cannot start a render loop and will exit.";

/// Which optional layers a variant wires up. Each binary builds one of
/// these; everything else is shared.
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    pub title: &'static str,
    pub orbit: bool,
    pub stats: bool,
    pub panel: bool,
    pub bloom: bool,
    pub screenshots: bool,
}

impl DemoConfig {
    /// Rotating cube, nothing else.
    pub fn basic() -> Self {
        Self {
            title: "spincube",
            orbit: false,
            stats: false,
            panel: false,
            bloom: false,
            screenshots: false,
        }
    }

    /// Cube plus orbit camera controls.
    pub fn orbit() -> Self {
        Self {
            title: "spincube - orbit",
            orbit: true,
            ..Self::basic()
        }
    }

    /// Orbit plus FPS overlay, parameter panel, and screenshot key.
    pub fn debug() -> Self {
        Self {
            title: "spincube - debug",
            stats: true,
            panel: true,
            screenshots: true,
            ..Self::orbit()
        }
    }

    /// Orbit plus the bloom post-processing chain.
    pub fn bloom() -> Self {
        Self {
            title: "spincube - bloom",
            bloom: true,
            ..Self::orbit()
        }
    }

    /// Strip UI layers (the `--no-ui` flag).
    pub fn without_ui(self) -> Self {
        Self {
            stats: false,
            panel: false,
            ..self
        }
    }
}

/// Top-level application object: owns the scene, the camera, the optional
/// orbit controls, and (once the window exists) the renderer. One instance
/// lives for the whole run; there is no teardown beyond process exit.
pub struct App {
    config: DemoConfig,
    params: DemoParams,
    initial_size: (u32, u32),
    screenshot_dir: PathBuf,
    window: Option<Arc<Window>>,
    renderer: Option<CubeRenderer>,
    scene: Scene,
    camera: Camera,
    orbit: Option<OrbitControls>,
    clock: Clock,
    stats: FrameStats,
}

impl App {
    pub fn new(config: DemoConfig, params: DemoParams, width: u32, height: u32) -> Self {
        let scene = Scene::new(&params);
        let camera = Camera::new(&params.camera, width, height);
        let orbit = config
            .orbit
            .then(|| OrbitControls::from_camera(&camera, Vec3::ZERO));

        Self {
            config,
            params,
            initial_size: (width, height),
            screenshot_dir: PathBuf::from("."),
            window: None,
            renderer: None,
            scene,
            camera,
            orbit,
            clock: Clock::new(),
            stats: FrameStats::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn redraw(&mut self) {
        let delta = self.clock.tick();
        if let Some(fps) = self.stats.update(delta) {
            log::debug!("{:.1} FPS", fps);
        }

        self.scene.advance();
        if let Some(orbit) = &self.orbit {
            orbit.apply_to(&mut self.camera);
        }

        // Scene is Copy: render this frame from a snapshot while the panel
        // mutates the live state for the next one.
        let snapshot = self.scene;
        let camera = self.camera;
        let fps = self.stats.fps();

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        let panel = self.config.panel.then(|| PanelBindings {
            rotation: &mut self.scene.cube.rotation,
            spin: &mut self.scene.spin,
            camera_distance: self.orbit.as_mut().map(|o| &mut o.distance),
        });

        match renderer.render(&snapshot, &camera, window, fps, panel) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(window.inner_size());
            }
            Err(e) => eprintln!("Render error: {}", e),
        }
    }

    fn capture_screenshot(&self) {
        let Some(renderer) = &self.renderer else {
            return;
        };
        match renderer.capture(&self.scene, &self.camera, &self.screenshot_dir) {
            Ok(path) => println!("Saved screenshot to {}", path.display()),
            Err(e) => log::warn!("Screenshot failed: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.initial_size;
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(self.config.title)
                .with_inner_size(winit::dpi::LogicalSize::new(width, height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(CubeRenderer::new(
            window.clone(),
            &self.params,
            &self.config,
        )) {
            Ok(r) => r,
            Err(e) => {
                // Capability degradation path: warn and never start the
                // frame loop. No retries.
                log::error!("Renderer unavailable: {}", e);
                eprintln!("{}", CAPABILITY_WARNING);
                event_loop.exit();
                return;
            }
        };

        self.camera
            .set_aspect(window.inner_size().width, window.inner_size().height);
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock = Clock::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The overlay sees events first; consumed events stop here so panel
        // drags never rotate the camera.
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyP),
                        repeat: false,
                        ..
                    },
                ..
            } if self.config.screenshots => self.capture_screenshot(),
            WindowEvent::Resized(size) => {
                self.camera.set_aspect(size.width, size.height);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(orbit) = &mut self.orbit {
                    orbit.process_mouse_button(button, state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(orbit) = &mut self.orbit {
                    orbit.process_cursor(position);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(orbit) = &mut self.orbit {
                    orbit.process_scroll(delta);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Continuous loop at the display's cadence; nothing is requested when
        // initialization failed, so the warning path never renders.
        if self.renderer.is_some() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_wire_expected_layers() {
        let basic = DemoConfig::basic();
        assert!(!basic.orbit && !basic.stats && !basic.panel && !basic.bloom);

        let orbit = DemoConfig::orbit();
        assert!(orbit.orbit && !orbit.bloom);

        let debug = DemoConfig::debug();
        assert!(debug.orbit && debug.stats && debug.panel && debug.screenshots);

        let bloom = DemoConfig::bloom();
        assert!(bloom.orbit && bloom.bloom && !bloom.panel);
    }

    #[test]
    fn without_ui_strips_overlays_only() {
        let config = DemoConfig::debug().without_ui();
        assert!(!config.stats && !config.panel);
        assert!(config.orbit, "Orbit controls are not a UI overlay");
    }

    #[test]
    fn app_starts_with_one_mesh_and_zero_rotation() {
        let app = App::new(DemoConfig::basic(), DemoParams::default(), 800, 600);
        assert_eq!(app.scene().cube.rotation, Vec3::ZERO);
        assert!(app.renderer.is_none(), "Renderer appears only with a window");
    }

    #[test]
    fn orbit_variant_gets_controls() {
        let app = App::new(DemoConfig::orbit(), DemoParams::default(), 800, 600);
        assert!(app.orbit.is_some());

        let app = App::new(DemoConfig::basic(), DemoParams::default(), 800, 600);
        assert!(app.orbit.is_none());
    }
}
