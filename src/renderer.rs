use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::app::DemoConfig;
use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::overlay::{Overlay, PanelBindings};
use crate::params::DemoParams;
use crate::post::BloomChain;
use crate::scene::Scene;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Per-frame uniform data for the mesh pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    sun_dir: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
}

impl SceneUniform {
    pub fn new(scene: &Scene, camera: &Camera) -> Self {
        let emissive = scene.cube.material.emissive();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            model: scene.cube.model_matrix().to_cols_array_2d(),
            sun_dir: scene
                .sun
                .direction
                .extend(scene.sun.intensity)
                .to_array(),
            sky_color: scene
                .hemisphere
                .sky
                .extend(scene.hemisphere.intensity)
                .to_array(),
            ground_color: scene.hemisphere.ground.extend(0.0).to_array(),
            base_color: scene.cube.material.base_color.extend(1.0).to_array(),
            emissive: emissive.extend(0.0).to_array(),
        }
    }
}

/// Cube vertex: position + normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Unit cube centered at the origin, one quad per face so normals stay flat.
pub fn cube_geometry() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,
        4,5,6, 6,7,4,
        8,9,10, 10,11,8,
        12,13,14, 14,15,12,
        16,17,18, 18,19,16,
        20,21,22, 22,23,20,
    ];
    (vertices, indices)
}

/// Forward renderer for the cube scene: owns the surface, the depth buffer,
/// the mesh pipeline, and optionally the bloom chain and the egui overlay.
pub struct CubeRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    depth_view: wgpu::TextureView,
    bloom: Option<BloomChain>,
    overlay: Option<Overlay>,
}

impl CubeRenderer {
    pub async fn new(
        window: Arc<Window>,
        params: &DemoParams,
        demo: &DemoConfig,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let config = Self::create_surface_config(&surface, gpu.adapter(), size);
        surface.configure(gpu.device(), &config);

        // The mesh pass targets the surface directly, or the bloom chain's
        // HDR texture when post-processing is on.
        let scene_format = if demo.bloom { HDR_FORMAT } else { config.format };
        let (pipeline, uniform_buffer, uniform_bind_group) =
            Self::create_mesh_pipeline(gpu.device(), scene_format);

        let (vertices, indices) = cube_geometry();
        let vertex_buffer = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube indices"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let depth_view = Self::create_depth_texture(gpu.device(), size);

        let bloom = if demo.bloom {
            Some(BloomChain::new(
                gpu.device(),
                config.format,
                size.width,
                size.height,
                &params.bloom,
            ))
        } else {
            None
        };

        let overlay = if demo.stats || demo.panel {
            Some(Overlay::new(
                &window,
                gpu.device(),
                config.format,
                demo.stats,
                demo.panel,
            ))
        } else {
            None
        };

        log::info!(
            "Renderer ready: {}x{}, format {:?}, bloom {}",
            size.width,
            size.height,
            config.format,
            demo.bloom
        );

        Ok(Self {
            gpu,
            surface,
            config,
            size,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            depth_view,
            bloom,
            overlay,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_texture(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_mesh_pipeline(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::Buffer, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene uniform"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("scene_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        (pipeline, uniform_buffer, bind_group)
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigure the surface and recreate size-dependent targets. Scene
    /// state is untouched.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.gpu.device(), &self.config);
        self.depth_view = Self::create_depth_texture(self.gpu.device(), new_size);
        if let Some(bloom) = &mut self.bloom {
            bloom.resize(
                self.gpu.device(),
                self.gpu.queue(),
                new_size.width,
                new_size.height,
            );
        }
    }

    /// Let the overlay see a window event first; returns true if consumed.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.handle_event(window, event),
            None => false,
        }
    }

    /// Draw one frame: uniform upload, geometry pass (direct or through the
    /// bloom chain), then the UI overlay on top.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        window: &Window,
        fps: f32,
        panel: Option<PanelBindings<'_>>,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let uniform = SceneUniform::new(scene, camera);
        self.gpu
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        let scene_target = match &self.bloom {
            Some(bloom) => bloom.scene_target(),
            None => &surface_view,
        };
        self.encode_mesh_pass(&mut encoder, scene_target, scene.clear_color());

        if let Some(bloom) = &self.bloom {
            bloom.run(&mut encoder, &surface_view);
        }

        if let Some(overlay) = &mut self.overlay {
            overlay.draw(
                &self.gpu,
                window,
                &mut encoder,
                &surface_view,
                (self.size.width, self.size.height),
                fps,
                panel,
            );
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn encode_mesh_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Render the scene once more into a readable target and save it as a
    /// PNG. Only supported on the direct path; the bloom variants keep their
    /// HDR target on the GPU.
    pub fn capture(
        &self,
        scene: &Scene,
        camera: &Camera,
        dir: &std::path::Path,
    ) -> Result<std::path::PathBuf> {
        if self.bloom.is_some() {
            return Err("Screenshot capture is not supported with bloom enabled".into());
        }

        let uniform = SceneUniform::new(scene, camera);
        self.gpu
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let pixels = crate::screenshot::capture_pass(
            &self.gpu,
            self.config.format,
            self.size.width,
            self.size.height,
            |encoder, view| self.encode_mesh_pass(encoder, view, scene.clear_color()),
        )?;

        let path = crate::screenshot::timestamped_path(dir);
        crate::screenshot::save_png(&path, self.size.width, self.size.height, pixels)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DemoParams;

    #[test]
    fn cube_has_one_quad_per_face() {
        let (vertices, indices) = cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_normals_are_axis_aligned() {
        let (vertices, _) = cube_geometry();
        for v in &vertices {
            let len: f32 = v.normal.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-6, "Normals must be unit length");
            assert_eq!(
                v.normal.iter().filter(|&&c| c != 0.0).count(),
                1,
                "Flat-shaded cube normals point along one axis"
            );
        }
    }

    #[test]
    fn uniform_carries_emissive_scaled_by_strength() {
        let mut params = DemoParams::glowing();
        params.emissive_color = [1.0, 0.0, 0.0];
        params.emissive_strength = 2.0;
        let scene = Scene::new(&params);
        let camera = Camera::new(&params.camera, 800, 600);

        let uniform = SceneUniform::new(&scene, &camera);
        assert_eq!(uniform.emissive[0], 2.0);
        assert_eq!(uniform.base_color[3], 1.0);
    }

    #[test]
    fn uniform_is_pod_sized_for_wgsl() {
        // 2 mat4 + 5 vec4, 16-byte aligned.
        assert_eq!(std::mem::size_of::<SceneUniform>(), 2 * 64 + 5 * 16);
    }
}
