//! GPU particle system: compute stream-out between two storage slots and
//! indirect billboard drawing.
//!
//! Per frame: reset the target slot's counter, run `StreamOutTech` with an
//! indirect dispatch sized by the source slot, run `FinalizeTech` to clamp
//! the count and size the next dispatch, then draw the written slot with
//! `draw_indirect`. The live count stays on the GPU.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use seasons_particles::particle::buffer_size;
use seasons_particles::rand::{ParticleRng, RANDOM_TABLE_SIZE};
use seasons_particles::{
    FramePlan, ParticleArgs, ParticleBlendMode, ParticleState, ParticleVertex, SourceBuffer,
};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::bindings::{sampler_entry, storage_entry, uniform_entry};
use crate::context::{create_checked, Gpu, RenderError};
use crate::depth_map::DEPTH_FORMAT;
use crate::texture::{create_random_texture, load_texture_array, GpuTexture};

const RANDOM_SEED: u32 = 0x5EA5_0115;

/// Per-frame constants shared by the simulate and draw passes
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleFrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye_pos: [f32; 4],
    pub emit_pos: [f32; 4],
    pub emit_dir: [f32; 4],
    pub acceleration: [f32; 3],
    pub scene_time: f32,
    pub initial_velocity: [f32; 3],
    pub time_step: f32,
    pub spawn_offset: [f32; 3],
    pub lifetime: f32,
    pub spawn_extent: [f32; 3],
    pub spawn_interval: f32,
    pub size: [f32; 2],
    pub spawn_count: u32,
    pub max_particles: u32,
}

impl ParticleFrameUniform {
    pub fn new(state: &ParticleState, view_proj: Mat4) -> Self {
        let effect = state.effect();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye_pos: state.eye_pos().to_array(),
            emit_pos: state.emit_pos().to_array(),
            emit_dir: state.emit_dir().to_array(),
            acceleration: effect.acceleration,
            scene_time: state.scene_time(),
            initial_velocity: effect.initial_velocity,
            time_step: state.time_step(),
            spawn_offset: effect.spawn_offset,
            lifetime: effect.lifetime,
            spawn_extent: effect.spawn_extent,
            spawn_interval: effect.spawn_interval,
            size: effect.size,
            spawn_count: effect.spawn_count,
            max_particles: state.max_particles(),
        }
    }
}

/// One ping-pong slot: particle records plus their argument block
struct ParticleSlot {
    particles: wgpu::Buffer,
    args: wgpu::Buffer,
}

/// A running particle effect and all of its GPU resources
pub struct GpuParticleSystem {
    state: ParticleState,
    frame_buffer: wgpu::Buffer,
    _init_particles: wgpu::Buffer,
    init_args: wgpu::Buffer,
    slots: [ParticleSlot; 2],
    args_template: wgpu::Buffer,
    /// Simulate bind groups reading the init buffer, indexed by target slot
    seed_groups: [wgpu::BindGroup; 2],
    /// Simulate bind groups reading a slot, indexed by source slot
    step_groups: [wgpu::BindGroup; 2],
    /// Draw bind groups, indexed by slot
    draw_groups: [wgpu::BindGroup; 2],
    stream_out_pipeline: wgpu::ComputePipeline,
    finalize_pipeline: wgpu::ComputePipeline,
    draw_pipeline: wgpu::RenderPipeline,
    _sprites: GpuTexture,
    _random: (wgpu::Texture, wgpu::TextureView),
    last_plan: Option<FramePlan>,
}

impl GpuParticleSystem {
    /// Build every buffer, texture, bind group and pipeline for `state`.
    /// Sprites named by the effect are loaded from `sprite_dir`.
    pub fn new(gpu: Gpu<'_>, state: ParticleState, sprite_dir: &Path) -> Result<Self, RenderError> {
        let device = gpu.device;
        let blend_mode = state.effect().blend_mode;
        let capacity = state.max_particles();
        let sprite_paths: Vec<PathBuf> =
            state.effect().sprites.iter().map(|s| sprite_dir.join(s)).collect();
        let sprites = load_texture_array(device, gpu.queue, &sprite_paths)?;

        let random_values = ParticleRng::new(RANDOM_SEED).random_values(RANDOM_TABLE_SIZE);
        let random = create_random_texture(device, gpu.queue, &random_values)?;

        let system = create_checked(device, "particle system", || {
            let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Frame Uniforms"),
                size: std::mem::size_of::<ParticleFrameUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let init_particles = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Init Buffer"),
                contents: bytemuck::bytes_of(&ParticleVertex::emitter()),
                usage: wgpu::BufferUsages::STORAGE,
            });
            let init_args = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Init Args"),
                contents: bytemuck::bytes_of(&ParticleArgs::with_count(1)),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::INDIRECT,
            });
            let args_template = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Args Template"),
                contents: bytemuck::bytes_of(&ParticleArgs::target_reset()),
                usage: wgpu::BufferUsages::COPY_SRC,
            });

            let slots = [0, 1].map(|i| create_slot(device, capacity, i));

            let (sim_layout, draw_layout) = create_layouts(device);
            let make_sim_group = |source: (&wgpu::Buffer, &wgpu::Buffer), target: &ParticleSlot| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Particle Simulate Bind Group"),
                    layout: &sim_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: frame_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: source.0.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: source.1.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: target.particles.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: target.args.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 5,
                            resource: wgpu::BindingResource::TextureView(&random.1),
                        },
                    ],
                })
            };

            let seed_groups = [
                make_sim_group((&init_particles, &init_args), &slots[0]),
                make_sim_group((&init_particles, &init_args), &slots[1]),
            ];
            let step_groups = [
                make_sim_group((&slots[0].particles, &slots[0].args), &slots[1]),
                make_sim_group((&slots[1].particles, &slots[1].args), &slots[0]),
            ];
            let draw_groups = [0, 1].map(|i| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Particle Draw Bind Group"),
                    layout: &draw_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: frame_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: slots[i].particles.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&sprites.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&sprites.sampler),
                        },
                    ],
                })
            });

            let (stream_out_pipeline, finalize_pipeline) = create_compute_pipelines(device, &sim_layout);
            let draw_pipeline = create_draw_pipeline(device, gpu.format, &draw_layout, blend_mode);

            GpuParticleSystem {
                state,
                frame_buffer,
                _init_particles: init_particles,
                init_args,
                slots,
                args_template,
                seed_groups,
                step_groups,
                draw_groups,
                stream_out_pipeline,
                finalize_pipeline,
                draw_pipeline,
                _sprites: sprites,
                _random: random,
                last_plan: None,
            }
        })?;

        info!(
            kind = system.state.kind().name(),
            capacity = system.state.max_particles(),
            bytes = 2 * buffer_size(system.state.max_particles()),
            "Particle system created"
        );
        Ok(system)
    }

    /// Record this frame's simulate pass. Performs the seeding transition
    /// and the ping-pong swap; returns the buffers used.
    pub fn simulate(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view_proj: Mat4,
    ) -> FramePlan {
        let plan = self.state.plan_frame();

        let uniform = ParticleFrameUniform::new(&self.state, view_proj);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        let target = &self.slots[plan.target];
        encoder.copy_buffer_to_buffer(
            &self.args_template,
            0,
            &target.args,
            0,
            std::mem::size_of::<ParticleArgs>() as u64,
        );

        let (bind_group, source_args) = match plan.source {
            SourceBuffer::Init => (&self.seed_groups[plan.target], &self.init_args),
            SourceBuffer::Slot(s) => (&self.step_groups[s], &self.slots[s].args),
        };

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Stream-Out Pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, bind_group, &[]);

            pass.set_pipeline(&self.stream_out_pipeline);
            pass.dispatch_workgroups_indirect(source_args, ParticleArgs::DISPATCH_OFFSET);

            pass.set_pipeline(&self.finalize_pipeline);
            pass.dispatch_workgroups(1, 1, 1);
        }

        if plan.seeded {
            debug!(kind = self.state.kind().name(), target = plan.target, "Seeded from init buffer");
        }
        self.last_plan = Some(plan);
        plan
    }

    /// Draw the slot written by the last simulate pass
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(plan) = self.last_plan else {
            return;
        };
        pass.set_pipeline(&self.draw_pipeline);
        pass.set_bind_group(0, &self.draw_groups[plan.draw], &[]);
        pass.draw_indirect(&self.slots[plan.draw].args, 0);
    }

    /// Restart the effect from the emitter seed
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn update(&mut self, dt: f32, scene_time: f32) {
        self.state.update(dt, scene_time);
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ParticleState {
        &mut self.state
    }
}

fn create_slot(device: &wgpu::Device, capacity: u32, index: usize) -> ParticleSlot {
    let particles = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("Particle Slot {index}")),
        size: buffer_size(capacity),
        usage: wgpu::BufferUsages::STORAGE,
        mapped_at_creation: false,
    });
    let args = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("Particle Slot {index} Args")),
        contents: bytemuck::bytes_of(&ParticleArgs::empty()),
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::INDIRECT
            | wgpu::BufferUsages::COPY_DST,
    });
    ParticleSlot { particles, args }
}

fn create_layouts(device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::BindGroupLayout) {
    let compute = wgpu::ShaderStages::COMPUTE;
    let sim_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Particle Simulate Bind Group Layout"),
        entries: &[
            uniform_entry(0, compute),
            storage_entry(1, compute, true),  // source particles
            storage_entry(2, compute, true),  // source args
            storage_entry(3, compute, false), // target particles
            storage_entry(4, compute, false), // target args
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: compute,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D1,
                    multisampled: false,
                },
                count: None,
            },
        ],
    });

    let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Particle Draw Bind Group Layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            storage_entry(1, wgpu::ShaderStages::VERTEX, true),
            // Layer count is read in the vertex stage
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    multisampled: false,
                },
                count: None,
            },
            sampler_entry(3),
        ],
    });

    (sim_layout, draw_layout)
}

fn create_compute_pipelines(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> (wgpu::ComputePipeline, wgpu::ComputePipeline) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Particle Stream-Out Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particle_stream_out.wgsl").into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Simulate Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    let make = |entry_point: &str| {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry_point),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        })
    };

    (make("StreamOutTech"), make("FinalizeTech"))
}

fn blend_state(mode: ParticleBlendMode) -> wgpu::BlendState {
    match mode {
        ParticleBlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
        ParticleBlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

fn create_draw_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::BindGroupLayout,
    blend_mode: ParticleBlendMode,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Particle Draw Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particle_draw.wgsl").into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Draw Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("DrawTech"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_draw"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_draw"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(blend_mode)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        // Depth tested, not written
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use seasons_particles::{particle, ParticleKind};

    #[test]
    fn frame_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<ParticleFrameUniform>(), 192);
    }

    #[test]
    fn frame_uniform_carries_effect_and_timing() {
        let mut state = ParticleState::new(ParticleKind::Snow, 100_000).unwrap();
        state.update(0.016, 3.5);
        state.set_emit_pos(Vec3::new(1.0, 2.0, 3.0));

        let u = ParticleFrameUniform::new(&state, Mat4::IDENTITY);
        assert_eq!(u.max_particles, 100_000);
        assert_eq!(u.scene_time, 3.5);
        assert_eq!(u.time_step, 0.016);
        assert_eq!(u.emit_pos, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.emit_dir, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(u.spawn_count, ParticleKind::Snow.effect().spawn_count);
    }

    #[test]
    fn stream_out_reserves_the_emitter_slot() {
        let source = include_str!("particle_stream_out.wgsl");
        let declared = format!("const EMITTER_SLOT: u32 = {}u;", particle::EMITTER_SLOT);
        assert!(source.contains(&declared));
        assert!(source.contains("targetParticles[EMITTER_SLOT] = p;"));
        assert_eq!(
            ParticleArgs::target_reset().instance_count,
            particle::EMITTER_SLOT + 1
        );
    }

    #[test]
    fn blend_modes_differ() {
        assert_eq!(blend_state(ParticleBlendMode::Alpha), wgpu::BlendState::ALPHA_BLENDING);
        assert_eq!(
            blend_state(ParticleBlendMode::Additive).color.dst_factor,
            wgpu::BlendFactor::One
        );
    }
}
