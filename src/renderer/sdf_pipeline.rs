//! SDF-based WebGPU render pipeline
//!
//! Draws the whole scene in the fragment shader from signed distance fields,
//! fed by a few buffers mirroring the latest simulation snapshot.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::*;
use crate::sim::{GameState, ObstacleKind, Status};

/// Maximum number of obstacles uploaded per frame
const MAX_OBSTACLES: usize = 32;
/// Maximum number of particles uploaded per frame
const MAX_PARTICLES: usize = 256;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2], // offset 0
    time: f32,            // offset 8 - seconds since page load
    ground_y: f32,        // offset 12
    runner_y: f32,        // offset 16 - 0 on ground, negative airborne
    score: f32,           // offset 20
    speed: f32,           // offset 24
    screen_shake: f32,    // offset 28
    status: u32,          // offset 32 - 0=start, 1=playing, 2=game over
    is_jumping: u32,      // offset 36
    obstacle_count: u32,  // offset 40
    particle_count: u32,  // offset 44 - struct is 48 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObstacleData {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    kind: u32,      // 0=cactus, 1=bird, 2=coin
    collected: u32, // coins only
    _pad: [u32; 2], // pad to 32 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ParticleData {
    pos: [f32; 2],
    size: f32,
    life: f32,
    color: u32,
    _pad: [u32; 3], // pad to 32 bytes
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    obstacles_buffer: wgpu::Buffer,
    particles_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);
        log::info!("Surface present modes: {:?}", surface_caps.present_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface config: {}x{}, alpha: {:?}",
            width,
            height,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        log::info!("Creating shader module...");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });
        log::info!("Shader module created");

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                time: 0.0,
                ground_y: GROUND_Y,
                runner_y: 0.0,
                score: 0.0,
                speed: INITIAL_SPEED,
                screen_shake: 0.0,
                status: 0,
                is_jumping: 0,
                obstacle_count: 0,
                particle_count: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let obstacles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("obstacles"),
            size: (std::mem::size_of::<ObstacleData>() * MAX_OBSTACLES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let particles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles"),
            size: (std::mem::size_of::<ParticleData>() * MAX_PARTICLES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
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
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: obstacles_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: particles_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            obstacles_buffer,
            particles_buffer,
            bind_group,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Update GPU buffers from game state and render
    pub fn render(&mut self, state: &GameState, time: f64) -> Result<(), wgpu::SurfaceError> {
        // time is ms since page load from requestAnimationFrame, convert to seconds
        let elapsed = (time / 1000.0) as f32;

        let obstacle_count = state.obstacles.len().min(MAX_OBSTACLES) as u32;
        let particle_count = state.particles.len().min(MAX_PARTICLES) as u32;

        let status = match state.status {
            Status::Start => 0,
            Status::Playing => 1,
            Status::GameOver => 2,
        };

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            time: elapsed,
            ground_y: GROUND_Y,
            runner_y: state.runner_y,
            score: state.score as f32,
            speed: state.speed,
            screen_shake: state.screen_shake,
            status,
            is_jumping: if state.is_jumping { 1 } else { 0 },
            obstacle_count,
            particle_count,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let mut obstacles_data = vec![
            ObstacleData {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                kind: 0,
                collected: 0,
                _pad: [0; 2],
            };
            MAX_OBSTACLES
        ];
        for (i, obstacle) in state.obstacles.iter().take(MAX_OBSTACLES).enumerate() {
            let kind = match obstacle.kind {
                ObstacleKind::Cactus => 0,
                ObstacleKind::Bird => 1,
                ObstacleKind::Coin => 2,
            };
            obstacles_data[i] = ObstacleData {
                x: obstacle.x,
                y: obstacle.y,
                width: obstacle.width,
                height: obstacle.height,
                kind,
                collected: if obstacle.collected { 1 } else { 0 },
                _pad: [0; 2],
            };
        }
        self.queue.write_buffer(
            &self.obstacles_buffer,
            0,
            bytemuck::cast_slice(&obstacles_data),
        );

        let mut particles_data = vec![
            ParticleData {
                pos: [0.0, 0.0],
                size: 0.0,
                life: 0.0,
                color: 0,
                _pad: [0; 3],
            };
            MAX_PARTICLES
        ];
        for (i, particle) in state.particles.iter().take(MAX_PARTICLES).enumerate() {
            particles_data[i] = ParticleData {
                pos: [particle.pos.x, particle.pos.y],
                size: particle.size,
                life: particle.life,
                color: particle.color,
                _pad: [0; 3],
            };
        }
        self.queue.write_buffer(
            &self.particles_buffer,
            0,
            bytemuck::cast_slice(&particles_data),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
