//! Forward renderer over wgpu
//!
//! One pass, one shader, a unit cube scaled per draw. Per-object uniforms
//! ride a single buffer with dynamic offsets; textures are uploaded on
//! first use and cached by uid.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::{GfxError, RendererCreateInfo, RenderingData};
use crate::{scene::Side, Window};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const OBJECT_STRIDE: u64 = 256;
const MAX_DRAWS: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
    // x: power or flat intensity, y: decay, z: range (<= 0 unbounded),
    // w: 1 when physically-correct falloff applies.
    light_params: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    // x: textured, y: normals flipped (inward-facing cube).
    flags: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

const VERTEX_ATTRIBS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex {
        position,
        normal,
        uv,
    }
}

#[rustfmt::skip]
const CUBE_VERTICES: [Vertex; 24] = [
    // +Z
    v([-0.5, -0.5,  0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([-0.5,  0.5,  0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
    // -Z
    v([ 0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([-0.5,  0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
    // +X
    v([ 0.5, -0.5,  0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([ 0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
    // -X
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-0.5, -0.5,  0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    v([-0.5,  0.5,  0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    v([-0.5,  0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    // +Y
    v([-0.5,  0.5,  0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
    v([ 0.5,  0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([-0.5,  0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
    // -Y
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
    v([ 0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([-0.5, -0.5,  0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3,
    4, 5, 6, 4, 6, 7,
    8, 9, 10, 8, 10, 11,
    12, 13, 14, 12, 14, 15,
    16, 17, 18, 16, 18, 19,
    20, 21, 22, 20, 22, 23,
];

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    globals_buf: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    objects_buf: wgpu::Buffer,
    objects_bg: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_bg: wgpu::BindGroup,
    texture_cache: HashMap<usize, wgpu::BindGroup>,
    // Front, back and double-sided cull variants.
    pipeline_front: wgpu::RenderPipeline,
    pipeline_back: wgpu::RenderPipeline,
    pipeline_double: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
}

impl Renderer {
    pub fn new(create_info: &RendererCreateInfo) -> Result<Renderer, GfxError> {
        let window = Window::get_ref();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        #[allow(unused_unsafe)]
        let surface = unsafe { instance.create_surface(&window.raw) }?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GfxError::NoAdapter)?;
        log::info!("graphics adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("roomkit device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: create_info.width.max(1),
            height: create_info.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = Self::create_depth(&device, &config);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals layout"),
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
        });
        let objects_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("objects layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture layout"),
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
            ],
        });

        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let objects_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("objects"),
            size: OBJECT_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let objects_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("objects"),
            layout: &objects_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &objects_buf,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white_bg = Self::upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            1,
            1,
            &[255, 255, 255, 255],
            Some("white"),
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("forward shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("forward layout"),
            bind_group_layouts: &[&globals_layout, &objects_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let pipeline_front =
            Self::build_pipeline(&device, &pipeline_layout, &shader, format, Some(wgpu::Face::Back));
        let pipeline_back =
            Self::build_pipeline(&device, &pipeline_layout, &shader, format, Some(wgpu::Face::Front));
        let pipeline_double = Self::build_pipeline(&device, &pipeline_layout, &shader, format, None);

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube vertices"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube indices"),
            contents: bytemuck::cast_slice(&CUBE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Renderer {
            surface,
            device,
            queue,
            config,
            depth_view,
            globals_buf,
            globals_bg,
            objects_buf,
            objects_bg,
            texture_layout,
            sampler,
            white_bg,
            texture_cache: HashMap::new(),
            pipeline_front,
            pipeline_back,
            pipeline_double,
            vertex_buf,
            index_buf,
        })
    }

    /// Resizes the output surface; called synchronously from the resize
    /// event so the next frame renders at the new extent.
    pub fn recreate(&mut self, create_info: &RendererCreateInfo) {
        self.config.width = create_info.width.max(1);
        self.config.height = create_info.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn render(&mut self, data: &RenderingData) -> Result<(), GfxError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.globals_buf,
            0,
            bytemuck::cast_slice(&[Self::pack_globals(data)]),
        );

        let mut draws = &data.draws[..];
        if draws.len() > MAX_DRAWS {
            log::warn!("draw list truncated to {} of {}", MAX_DRAWS, draws.len());
            draws = &draws[..MAX_DRAWS];
        }
        let mut object_bytes = vec![0u8; OBJECT_STRIDE as usize * draws.len().max(1)];
        for (i, draw) in draws.iter().enumerate() {
            let uniforms = ObjectUniforms {
                model: draw.model.to_cols_array_2d(),
                color: draw.color,
                flags: [
                    if draw.texture.is_some() { 1.0 } else { 0.0 },
                    if draw.side == Side::Back { 1.0 } else { 0.0 },
                    0.0,
                    0.0,
                ],
            };
            let offset = i * OBJECT_STRIDE as usize;
            object_bytes[offset..offset + std::mem::size_of::<ObjectUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        self.queue.write_buffer(&self.objects_buf, 0, &object_bytes);

        for draw in draws {
            if let Some(texture) = &draw.texture {
                if !self.texture_cache.contains_key(&texture.uid()) {
                    let (width, height) = texture.dimensions();
                    let bg = Self::upload_texture(
                        &self.device,
                        &self.queue,
                        &self.texture_layout,
                        &self.sampler,
                        width,
                        height,
                        texture.rgba(),
                        None,
                    );
                    self.texture_cache.insert(texture.uid(), bg);
                }
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("forward pass"),
            });
        {
            let bg = data.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("forward pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.globals_bg, &[]);
            pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
            pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint16);
            for (i, draw) in draws.iter().enumerate() {
                pass.set_pipeline(match draw.side {
                    Side::Front => &self.pipeline_front,
                    Side::Back => &self.pipeline_back,
                    Side::Double => &self.pipeline_double,
                });
                let offset = (i as u64 * OBJECT_STRIDE) as u32;
                pass.set_bind_group(1, &self.objects_bg, &[offset]);
                let texture_bg = draw
                    .texture
                    .as_ref()
                    .and_then(|t| self.texture_cache.get(&t.uid()))
                    .unwrap_or(&self.white_bg);
                pass.set_bind_group(2, texture_bg, &[]);
                pass.draw_indexed(0..CUBE_INDICES.len() as u32, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn pack_globals(data: &RenderingData) -> Globals {
        let mut globals = Globals {
            view_proj: (data.proj * data.view).to_cols_array_2d(),
            eye: [data.eye.x, data.eye.y, data.eye.z, 1.0],
            light_pos: [0.0; 4],
            light_color: [0.0; 4],
            light_params: [0.0; 4],
            ambient: [data.ambient, 0.0, 0.0, 0.0],
        };
        if let Some(light) = &data.light {
            globals.light_pos = [light.position.x, light.position.y, light.position.z, 1.0];
            globals.light_color = light.color;
            globals.light_params = [
                light.power.unwrap_or(light.intensity),
                light.decay,
                light.range.unwrap_or(0.0),
                if light.power.is_some() { 1.0 } else { 0.0 },
            ];
        }
        globals
    }

    fn create_depth(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("depth"),
                size: wgpu::Extent3d {
                    width: config.width,
                    height: config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn build_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        cull_mode: Option<wgpu::Face>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("forward pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBS,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn upload_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
        rgba: &[u8],
        label: Option<&str>,
    ) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}
