//! Rendering system with wgpu pipelines for the visualizer scene.
//!
//! Uploads whatever [`Scene::prepare_frame`] produced; no scene behaviour lives here.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use log::{info, warn};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::camera::{projection_matrix, view_matrix};
use crate::mesh::{ColorVertex, Vertex};
use crate::scene::Scene;
use crate::texture::Texture;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const AMBIENT: f32 = 0.3;
const SHININESS: f32 = 50.0;

/// Sphere material colour (51, 205, 225)
const SPHERE_COLOR: [f32; 4] = [0.2, 0.804, 0.882, 1.0];
/// Stage colour (0, 128, 128)
const STAGE_COLOR: [f32; 4] = [0.0, 0.502, 0.502, 1.0];

/// Fixed teal light, placed in eye-fixed world space
const TEAL_LIGHT: ([f32; 3], [f32; 3]) = ([2.0, 2.0, 2.0], [0.0, 0.5, 0.5]);
/// Rose light behind the sphere, rotates with the scene
const ROSE_LIGHT: ([f32; 3], [f32; 3]) = ([0.0, 0.3, -1.5], [0.73, 0.29, 0.31]);
/// White light colour; it orbits below the sphere at `(cos t, -1, sin t)`
const WHITE_LIGHT: [f32; 3] = [1.0, 1.0, 1.0];

/// Errors creating the rendering system
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Per-draw uniforms shared by both shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub eye: [f32; 4],
    /// xyz position, w = 1 when on
    pub light_pos: [[f32; 4]; 3],
    pub light_color: [[f32; 4]; 3],
    pub base_color: [f32; 4],
    /// start, end, enabled, unused
    pub fog: [f32; 4],
    /// lit, textured, ambient, shininess
    pub shading: [f32; 4],
}

/// Uniform buffer plus the bind group that exposes it with the globe texture
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        texture_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[Uniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self { buffer, bind_group }
    }
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    sphere_vertices: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,
    stage_vertices: wgpu::Buffer,
    stage_indices: wgpu::Buffer,
    stage_index_count: u32,
    axes_vertices: wgpu::Buffer,
    axes_vertex_count: u32,
    point_vertices: wgpu::Buffer,
    point_capacity: usize,
    sphere_uniforms: UniformSlot,
    stage_uniforms: UniformSlot,
    overlay_uniforms: UniformSlot,
}

impl RenderSystem {
    /// Create new rendering system sized for `scene`'s meshes
    pub async fn new(
        window: Arc<winit::window::Window>,
        scene: &Scene,
        texture: Option<&Texture>,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        info!("GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });
        let color_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Color Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("color.wgsl").into()),
        });

        // Globe texture (1x1 white when there is none, so untextured draws sample neutral)
        let max_dimension = device.limits().max_texture_dimension_2d;
        let texture = texture.filter(|t| {
            let fits = t.width <= max_dimension && t.height <= max_dimension;
            if !fits {
                warn!(
                    "Texture {}x{} exceeds the GPU limit of {}, drawing untextured",
                    t.width, t.height, max_dimension
                );
            }
            fits
        });
        let (width, height, rgba) = match texture {
            Some(t) => (t.width, t.height, t.to_rgba()),
            None => (1, 1, vec![255; 4]),
        };
        let globe = device.create_texture_with_data(
            &queue,
            &wgpu::TextureDescriptor {
                label: Some("Globe Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &rgba,
        );
        let globe_view = globe.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Globe Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
        };
        let color_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
        };

        let pipeline = |label: &str,
                        shader: &wgpu::ShaderModule,
                        layout: wgpu::VertexBufferLayout,
                        topology: wgpu::PrimitiveTopology,
                        depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[layout],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let mesh_pipeline = pipeline(
            "Mesh Pipeline",
            &mesh_shader,
            mesh_layout,
            wgpu::PrimitiveTopology::TriangleList,
            true,
        );
        let line_pipeline = pipeline(
            "Line Pipeline",
            &color_shader,
            color_layout.clone(),
            wgpu::PrimitiveTopology::LineList,
            true,
        );
        let point_pipeline = pipeline(
            "Point Pipeline",
            &color_shader,
            color_layout,
            wgpu::PrimitiveTopology::PointList,
            false,
        );

        let vertex_buffer = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        };
        let index_buffer = |label: &str, indices: &[u32]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        };

        let sphere = scene.sphere();
        let stage = scene.stage();
        let point_capacity = scene.engine().pool().capacity();

        let sphere_vertices = vertex_buffer("Sphere Vertices", bytemuck::cast_slice(&sphere.vertices));
        let stage_vertices = vertex_buffer("Stage Vertices", bytemuck::cast_slice(&stage.vertices));
        let axes_vertices = vertex_buffer("Axes Vertices", bytemuck::cast_slice(scene.axes()));
        let point_vertices = vertex_buffer(
            "Particle Vertices",
            bytemuck::cast_slice(&vec![ColorVertex::zeroed(); point_capacity]),
        );

        let slot = |label: &str| UniformSlot::new(&device, label, &bind_group_layout, &globe_view, &sampler);

        Ok(Self {
            sphere_indices: index_buffer("Sphere Indices", &sphere.indices),
            sphere_index_count: sphere.indices.len() as u32,
            stage_indices: index_buffer("Stage Indices", &stage.indices),
            stage_index_count: stage.indices.len() as u32,
            axes_vertex_count: scene.axes().len() as u32,
            sphere_uniforms: slot("Sphere Uniforms"),
            stage_uniforms: slot("Stage Uniforms"),
            overlay_uniforms: slot("Overlay Uniforms"),
            sphere_vertices,
            stage_vertices,
            axes_vertices,
            point_vertices,
            point_capacity,
            mesh_pipeline,
            line_pipeline,
            point_pipeline,
            depth_view,
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigure the surface and depth buffer after a window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Upload the prepared scene and draw it
    pub fn render(&self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        self.upload(scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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

            // Square viewport centred in the window
            let (x, y, side) = square_viewport(self.config.width, self.config.height);
            render_pass.set_viewport(x, y, side, side, 0.0, 1.0);

            let settings = &scene.settings;

            if settings.axes {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_bind_group(0, &self.overlay_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.axes_vertices.slice(..));
                render_pass.draw(0..self.axes_vertex_count, 0..1);
            }

            if settings.sphere {
                render_pass.set_pipeline(&self.mesh_pipeline);
                render_pass.set_bind_group(0, &self.sphere_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.sphere_vertices.slice(..));
                render_pass
                    .set_index_buffer(self.sphere_indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }

            if settings.stage {
                render_pass.set_pipeline(&self.mesh_pipeline);
                render_pass.set_bind_group(0, &self.stage_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.stage_vertices.slice(..));
                render_pass
                    .set_index_buffer(self.stage_indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.stage_index_count, 0, 0..1);
            }

            let point_count = scene.points().len().min(self.point_capacity) as u32;
            if point_count > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_bind_group(0, &self.overlay_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.point_vertices.slice(..));
                render_pass.draw(0..point_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Write this frame's vertices and uniforms
    fn upload(&self, scene: &Scene) {
        let settings = &scene.settings;
        let render = scene.render_config();

        if settings.sphere {
            self.queue.write_buffer(
                &self.sphere_vertices,
                0,
                bytemuck::cast_slice(&scene.sphere().vertices),
            );
        }
        if settings.stage {
            self.queue.write_buffer(
                &self.stage_vertices,
                0,
                bytemuck::cast_slice(&scene.stage().vertices),
            );
        }
        if settings.axes {
            self.queue
                .write_buffer(&self.axes_vertices, 0, bytemuck::cast_slice(scene.axes()));
        }
        let points = &scene.points()[..scene.points().len().min(self.point_capacity)];
        if !points.is_empty() {
            self.queue
                .write_buffer(&self.point_vertices, 0, bytemuck::cast_slice(points));
        }

        let view_proj = projection_matrix(settings.projection, render) * view_matrix(render);
        let scene_model = scene.view.model_matrix();
        let sphere_model =
            scene_model * Mat4::from_rotation_y(scene.sphere_rotation_deg().to_radians());

        // Lights placed after the scene rotation turn with it
        let t = scene.clock().time();
        let lights = [
            (Vec3::from_array(TEAL_LIGHT.0), TEAL_LIGHT.1),
            (
                scene_model.transform_point3(Vec3::from_array(ROSE_LIGHT.0)),
                ROSE_LIGHT.1,
            ),
            (
                scene_model.transform_point3(Vec3::new(t.cos(), -1.0, t.sin())),
                WHITE_LIGHT,
            ),
        ];

        let mut base = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            model: scene_model.to_cols_array_2d(),
            eye: [render.eye[0], render.eye[1], render.eye[2], 1.0],
            light_pos: [[0.0; 4]; 3],
            light_color: [[0.0; 4]; 3],
            base_color: [1.0; 4],
            fog: [
                render.fog_start,
                render.fog_end,
                if settings.depth_cue { 1.0 } else { 0.0 },
                0.0,
            ],
            shading: [0.0, 0.0, AMBIENT, SHININESS],
        };
        for (i, (pos, color)) in lights.iter().enumerate() {
            let on = if settings.lights[i] { 1.0 } else { 0.0 };
            base.light_pos[i] = [pos.x, pos.y, pos.z, on];
            base.light_color[i] = [color[0], color[1], color[2], 1.0];
        }

        let textured = if settings.texture == crate::scene::TextureMode::Off {
            0.0
        } else {
            1.0
        };
        let sphere = Uniforms {
            model: sphere_model.to_cols_array_2d(),
            base_color: SPHERE_COLOR,
            shading: [1.0, textured, AMBIENT, SHININESS],
            ..base
        };
        let stage = Uniforms {
            base_color: STAGE_COLOR,
            ..base
        };

        for (slot, uniforms) in [
            (&self.sphere_uniforms, sphere),
            (&self.stage_uniforms, stage),
            (&self.overlay_uniforms, base),
        ] {
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
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
    });
    depth.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Largest centred square `(x, y, side)` inside a `width x height` surface
pub fn square_viewport(width: u32, height: u32) -> (f32, f32, f32) {
    let side = width.min(height);
    (
        ((width - side) / 2) as f32,
        ((height - side) / 2) as f32,
        side as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_viewport_is_centred() {
        assert_eq!(square_viewport(600, 600), (0.0, 0.0, 600.0));
        assert_eq!(square_viewport(800, 600), (100.0, 0.0, 600.0));
        assert_eq!(square_viewport(600, 900), (0.0, 150.0, 600.0));
    }

    #[test]
    fn test_uniforms_match_shader_layout() {
        // Two matrices and ten vec4s: eye, three light positions, three light
        // colours, base colour, fog and shading
        assert_eq!(std::mem::size_of::<Uniforms>(), 2 * 64 + 10 * 16);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
