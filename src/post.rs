use wgpu::util::DeviceExt;

use crate::params::BloomParams;

const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// GPU-side uniform shared by every bloom pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniform {
    texel: [f32; 2],
    direction: [f32; 2],
    threshold: f32,
    intensity: f32,
    _pad: [f32; 2],
}

impl BloomUniform {
    fn new(width: u32, height: u32, direction: [f32; 2], params: &BloomParams) -> Self {
        Self {
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            direction,
            threshold: params.threshold,
            intensity: params.intensity,
            _pad: [0.0; 2],
        }
    }
}

/// Size-dependent bloom resources, rebuilt on every resize.
struct BloomTargets {
    scene_view: wgpu::TextureView,
    ping_view: wgpu::TextureView,
    pong_view: wgpu::TextureView,
    bright_group: wgpu::BindGroup,
    blur_h_group: wgpu::BindGroup,
    blur_v_group: wgpu::BindGroup,
    composite_group: wgpu::BindGroup,
}

/// Post-processing pipeline replacing the direct render call: the geometry
/// pass draws into an offscreen HDR target, then bright-pass extraction,
/// ping-pong separable blur, and an additive composite onto the surface.
pub struct BloomChain {
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bright_uniform: wgpu::Buffer,
    blur_h_uniform: wgpu::Buffer,
    blur_v_uniform: wgpu::Buffer,
    composite_uniform: wgpu::Buffer,
    targets: BloomTargets,
    blur_passes: u32,
    params: BloomParams,
}

impl BloomChain {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        params: &BloomParams,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bloom.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
            label: Some("bloom_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, entry: &str, format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let bright_pipeline = make_pipeline("bright pipeline", "fs_bright", HDR_FORMAT);
        let blur_pipeline = make_pipeline("blur pipeline", "fs_blur", HDR_FORMAT);
        let composite_pipeline = make_pipeline("composite pipeline", "fs_composite", surface_format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let make_uniform = |label: &str, direction: [f32; 2]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[BloomUniform::new(width, height, direction, params)]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let bright_uniform = make_uniform("bright uniform", [0.0, 0.0]);
        let blur_h_uniform = make_uniform("blur h uniform", [1.0, 0.0]);
        let blur_v_uniform = make_uniform("blur v uniform", [0.0, 1.0]);
        let composite_uniform = make_uniform("composite uniform", [0.0, 0.0]);

        let targets = Self::create_targets(
            device,
            &bind_group_layout,
            &sampler,
            &bright_uniform,
            &blur_h_uniform,
            &blur_v_uniform,
            &composite_uniform,
            width,
            height,
        );

        Self {
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            bind_group_layout,
            sampler,
            bright_uniform,
            blur_h_uniform,
            blur_v_uniform,
            composite_uniform,
            targets,
            blur_passes: params.blur_passes.max(1),
            params: *params,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_targets(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        bright_uniform: &wgpu::Buffer,
        blur_h_uniform: &wgpu::Buffer,
        blur_v_uniform: &wgpu::Buffer,
        composite_uniform: &wgpu::Buffer,
        width: u32,
        height: u32,
    ) -> BloomTargets {
        let make_texture = |label: &str| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: HDR_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        };

        let scene_view = make_texture("bloom scene target");
        let ping_view = make_texture("bloom ping");
        let pong_view = make_texture("bloom pong");

        let make_group = |label: &str,
                          source: &wgpu::TextureView,
                          uniform: &wgpu::Buffer,
                          extra: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniform.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(extra),
                    },
                ],
                label: Some(label),
            })
        };

        // The blur ends on an even pass count, so the final bloom lives in
        // the ping texture and the composite reads scene + ping.
        BloomTargets {
            bright_group: make_group("bright group", &scene_view, bright_uniform, &pong_view),
            blur_h_group: make_group("blur h group", &ping_view, blur_h_uniform, &scene_view),
            blur_v_group: make_group("blur v group", &pong_view, blur_v_uniform, &scene_view),
            composite_group: make_group("composite group", &scene_view, composite_uniform, &ping_view),
            scene_view,
            ping_view,
            pong_view,
        }
    }

    /// The HDR texture the geometry pass should render into.
    pub fn scene_target(&self) -> &wgpu::TextureView {
        &self.targets.scene_view
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        for (buffer, direction) in [
            (&self.bright_uniform, [0.0, 0.0]),
            (&self.blur_h_uniform, [1.0, 0.0]),
            (&self.blur_v_uniform, [0.0, 1.0]),
            (&self.composite_uniform, [0.0, 0.0]),
        ] {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::cast_slice(&[BloomUniform::new(width, height, direction, &self.params)]),
            );
        }

        self.targets = Self::create_targets(
            device,
            &self.bind_group_layout,
            &self.sampler,
            &self.bright_uniform,
            &self.blur_h_uniform,
            &self.blur_v_uniform,
            &self.composite_uniform,
            width,
            height,
        );
    }

    /// Encode the post-processing passes. The geometry pass into
    /// `scene_target()` must already be encoded.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        self.fullscreen_pass(
            encoder,
            "bright pass",
            &self.bright_pipeline,
            &self.targets.bright_group,
            &self.targets.ping_view,
        );

        for _ in 0..self.blur_passes {
            self.fullscreen_pass(
                encoder,
                "blur h pass",
                &self.blur_pipeline,
                &self.targets.blur_h_group,
                &self.targets.pong_view,
            );
            self.fullscreen_pass(
                encoder,
                "blur v pass",
                &self.blur_pipeline,
                &self.targets.blur_v_group,
                &self.targets.ping_view,
            );
        }

        self.fullscreen_pass(
            encoder,
            "composite pass",
            &self.composite_pipeline,
            &self.targets.composite_group,
            surface_view,
        );
    }

    fn fullscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        target: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_wgsl() {
        // vec2 + vec2 + f32 + f32 + vec2 padding = 32 bytes.
        assert_eq!(std::mem::size_of::<BloomUniform>(), 32);
    }

    #[test]
    fn uniform_texel_is_reciprocal_size() {
        let u = BloomUniform::new(800, 400, [1.0, 0.0], &BloomParams::default());
        assert!((u.texel[0] - 1.0 / 800.0).abs() < 1e-9);
        assert!((u.texel[1] - 1.0 / 400.0).abs() < 1e-9);
        assert_eq!(u.direction, [1.0, 0.0]);
    }

    #[test]
    fn uniform_survives_zero_size() {
        let u = BloomUniform::new(0, 0, [0.0, 1.0], &BloomParams::default());
        assert!(u.texel[0].is_finite());
        assert!(u.texel[1].is_finite());
    }
}
