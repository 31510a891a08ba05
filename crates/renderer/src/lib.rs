//! Renderer: wgpu init + depth + instanced matcap meshes.
//! wgpu = 23.x, winit = 0.30.x

use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use asset::mesh::MeshData;
use asset::texture::{ColorSpace, TextureData};
use bytemuck::{Pod, Zeroable};
use corelib::camera::Camera;
use corelib::ecs::{MeshKind, World};
use corelib::viewport::RenderTarget;
use glam::Mat4;
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoder, CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device,
    DeviceDescriptor, Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits,
    LoadOp, Operations, PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor, VertexBufferLayout, VertexState, VertexStepMode, util::DeviceExt,
};
use winit::window::Window;

pub mod instances;
mod upscale;

use instances::{InstanceRaw, group_instances};
use upscale::{Offscreen, Upscaler};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}
impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

/// Camera UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
}

impl CameraUniform {
    fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.proj().to_cols_array_2d(),
        }
    }
}

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Something drawn on top of the scene in the same frame (UI).
pub trait Overlay {
    fn draw(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size_in_pixels: [u32; 2],
    );
}

/// One geometry on the GPU, drawn once per instance.
struct GpuMesh {
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
    instance_buf: Buffer,
    instance_count: u32,
}

/// Uploaded scene: shared geometries plus the matcap material.
struct GpuScene {
    meshes: BTreeMap<MeshKind, GpuMesh>,
    material_bg: BindGroup,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline
    pipeline: RenderPipeline,
    material_bgl: BindGroupLayout,

    // Camera
    camera_bg: BindGroup,
    camera_buf: Buffer,

    scene: Option<GpuScene>,

    // Scene target: depth always at render size, colour offscreen only
    // when the render size is below the surface size.
    target: RenderTarget,
    depth_view: TextureView,
    upscaler: Upscaler,
    offscreen: Option<Offscreen>,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>, sized to `target`.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        target: RenderTarget,
    ) -> Result<Self> {
        let width = target.surface_width.max(1);
        let height = target.surface_height.max(1);

        // Instance & surface
        let instance = Instance::new(InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapter for backends {:?}", backends))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Orbitext Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no formats"))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, target.width, target.height);
        let upscaler = Upscaler::new(&device, surface_format);
        let offscreen = target
            .is_downscaled()
            .then(|| upscaler.create_target(&device, surface_format, target.width, target.height));

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Matcap WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/matcap.wgsl").into()),
        });

        // ==== Camera BGL/BG ====
        let camera_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Camera BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let camera_init = CameraUniform {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera UBO"),
            contents: bytemuck::bytes_of(&camera_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BG"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        // ==== Material BGL (matcap texture + sampler) ====
        let material_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Matcap BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Matcap PipelineLayout"),
            bind_group_layouts: &[&camera_bgl, &material_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Matcap Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT, InstanceRaw::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            material_bgl,
            camera_bg,
            camera_buf,
            scene: None,
            target,
            depth_view,
            upscaler,
            offscreen,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> [u32; 2] {
        [self.surface_config.width, self.surface_config.height]
    }

    /// Resize: reconfigure the surface at window size and rebuild the
    /// render-size targets.
    pub fn resize(&mut self, target: RenderTarget) {
        self.surface_config.width = target.surface_width.max(1);
        self.surface_config.height = target.surface_height.max(1);
        self.surface.configure(&self.device, &self.surface_config);

        self.depth_view = create_depth_view(&self.device, target.width, target.height);
        self.offscreen = target.is_downscaled().then(|| {
            self.upscaler
                .create_target(&self.device, self.surface_config.format, target.width, target.height)
        });
        if self.offscreen.is_some() {
            log::debug!(
                "Scene drawn at {}x{}, upscaled to {}x{}",
                target.width,
                target.height,
                target.surface_width,
                target.surface_height
            );
        }
        self.target = target;
    }

    /// Upload shared geometries, per-kind instance transforms and the matcap
    /// texture. Entities never move afterwards, so this happens once.
    pub fn set_scene(&mut self, meshes: &[(MeshKind, &MeshData)], world: &World, matcap: &TextureData) {
        let material_bg = self.create_matcap_bind_group(matcap);
        let mut groups = group_instances(world);

        let mut gpu_meshes = BTreeMap::new();
        for &(kind, data) in meshes {
            let Some(instances) = groups.remove(&kind) else {
                continue;
            };
            if !data.is_valid() {
                log::warn!("Skipping empty geometry for {:?}", kind);
                continue;
            }
            let vertices: Vec<Vertex> = data
                .vertices
                .iter()
                .map(|v| Vertex {
                    pos: v.position,
                    normal: v.normal,
                    uv: v.uv,
                })
                .collect();

            let vertex_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{kind:?} VB")),
                contents: bytemuck::cast_slice(&vertices),
                usage: BufferUsages::VERTEX,
            });
            let index_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{kind:?} IB")),
                contents: bytemuck::cast_slice(&data.indices),
                usage: BufferUsages::INDEX,
            });
            let instance_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{kind:?} Instances")),
                contents: bytemuck::cast_slice(&instances),
                usage: BufferUsages::VERTEX,
            });

            log::debug!(
                "Uploaded {:?}: {} vertices, {} instances",
                kind,
                vertices.len(),
                instances.len()
            );
            gpu_meshes.insert(
                kind,
                GpuMesh {
                    vertex_buf,
                    index_buf,
                    index_count: data.indices.len() as u32,
                    instance_buf,
                    instance_count: instances.len() as u32,
                },
            );
        }

        for kind in groups.keys() {
            log::warn!("No geometry registered for {:?}; its instances are not drawn", kind);
        }

        self.scene = Some(GpuScene {
            meshes: gpu_meshes,
            material_bg,
        });
    }

    fn create_matcap_bind_group(&self, matcap: &TextureData) -> BindGroup {
        let format = match matcap.color_space {
            ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => TextureFormat::Rgba8Unorm,
        };
        let size = Extent3d {
            width: matcap.width.max(1),
            height: matcap.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("Matcap Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &matcap.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(matcap.bytes_per_pixel() * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Matcap Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Matcap BG"),
            layout: &self.material_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    /// Render one frame from `camera`, then let the overlay draw on top.
    pub fn render(&mut self, camera: &Camera, overlay: Option<&mut dyn Overlay>) -> Result<(), SurfaceError> {
        let cam = CameraUniform::from_camera(camera);
        self.queue
            .write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&cam));

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());
        let scene_view = self.offscreen.as_ref().map_or(&view, |o| &o.view);

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: scene_view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(scene) = &self.scene {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.camera_bg, &[]);
                rpass.set_bind_group(1, &scene.material_bg, &[]);
                for mesh in scene.meshes.values() {
                    rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                    rpass.set_vertex_buffer(1, mesh.instance_buf.slice(..));
                    rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..mesh.instance_count);
                }
            }
        }

        if let Some(offscreen) = &self.offscreen {
            self.upscaler.draw(&mut encoder, offscreen, &view);
        }

        if let Some(overlay) = overlay {
            overlay.draw(&self.device, &self.queue, &mut encoder, &view, self.size());
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, self.target.width, self.target.height);
    }
}

/// Create a depth texture view for the scene pass.
fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
