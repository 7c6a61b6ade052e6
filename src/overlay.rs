use std::f32::consts::TAU;

use glam::Vec3;
use winit::window::Window;

use crate::gpu::GpuContext;

/// Live references from the parameter panel into the scene and camera state.
/// Sliders mutate the bound fields directly; the render loop picks the new
/// values up next frame. Slider ranges are enforced here by the controls,
/// never by the bound state itself.
pub struct PanelBindings<'a> {
    pub rotation: &'a mut Vec3,
    pub spin: &'a mut f32,
    pub camera_distance: Option<&'a mut f32>,
}

/// egui-based UI layer: a frame-rate readout and the debug-parameter panel,
/// drawn on top of the finished frame.
pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    show_stats: bool,
    show_panel: bool,
}

impl Overlay {
    pub fn new(
        window: &Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        show_stats: bool,
        show_panel: bool,
    ) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            ctx,
            state,
            renderer,
            show_stats,
            show_panel,
        }
    }

    /// Feed a window event to egui first; returns true when consumed, so
    /// drags over panel windows never reach the orbit controls.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        window: &Window,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size: (u32, u32),
        fps: f32,
        mut panel: Option<PanelBindings<'_>>,
    ) {
        let show_stats = self.show_stats;
        let show_panel = self.show_panel;

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            if show_stats {
                Self::stats_window(ctx, fps);
            }
            if show_panel {
                if let Some(bindings) = panel.as_mut() {
                    Self::panel_window(ctx, bindings);
                }
            }
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, self.ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.0, size.1],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the encoder,
            // but egui-wgpu requires 'static. This is safe because we drop the
            // render pass before using the encoder again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn stats_window(ctx: &egui::Context, fps: f32) {
        egui::Window::new("FPS")
            .title_bar(false)
            .resizable(false)
            .fixed_pos(egui::pos2(10.0, 10.0))
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.0}", fps))
                        .size(48.0)
                        .color(egui::Color32::from_rgb(74, 158, 255)),
                );
                ui.label(
                    egui::RichText::new("FPS")
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                );
            });
    }

    fn panel_window(ctx: &egui::Context, bindings: &mut PanelBindings<'_>) {
        egui::Window::new("Parameters")
            .resizable(false)
            .default_pos(egui::pos2(10.0, 90.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Cube")
                        .size(16.0)
                        .color(egui::Color32::from_rgb(200, 150, 100)),
                );
                ui.add(egui::Slider::new(&mut bindings.rotation.x, 0.0..=TAU).text("rotation x"));
                ui.add(egui::Slider::new(&mut bindings.rotation.y, 0.0..=TAU).text("rotation y"));
                ui.add(egui::Slider::new(&mut bindings.rotation.z, 0.0..=TAU).text("rotation z"));
                ui.add(egui::Slider::new(&mut *bindings.spin, 0.0..=0.1).text("spin / frame"));

                if let Some(distance) = bindings.camera_distance.as_mut() {
                    ui.add_space(5.0);
                    ui.separator();
                    ui.add_space(5.0);
                    ui.label(
                        egui::RichText::new("Camera")
                            .size(16.0)
                            .color(egui::Color32::from_rgb(100, 200, 255)),
                    );
                    ui.add(egui::Slider::new(&mut **distance, 0.0..=10.0).text("distance"));
                }
            });
    }
}
