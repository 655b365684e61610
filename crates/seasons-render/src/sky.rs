//! Sky sphere: a low-poly sphere around the camera sampling a cube map
//! (`SkyTech`). Drawn at the far plane after the opaque geometry.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::info;
use wgpu::util::DeviceExt;

use crate::bindings::{sampler_entry, texture_entry_with, uniform_entry};
use crate::context::{create_checked, Gpu, RenderError};
use crate::depth_map::DEPTH_FORMAT;
use crate::primitives::{create_sky_sphere, SkyVertex};
use crate::texture::{load_cubemap, GpuTexture};

pub const SKY_SPHERE_WIDTH: u32 = 8;
pub const SKY_SPHERE_HEIGHT: u32 = 4;

/// Uniform data for the sky (bind group 0, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyUniforms {
    pub wvp: [[f32; 4]; 4],
}

pub struct SkySphere {
    position: Vec3,
    scale: f32,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    _sky_map: GpuTexture,
}

impl SkySphere {
    /// Build the sphere and load cube map `name` from `dir`
    pub fn new(gpu: Gpu<'_>, dir: &Path, name: &str, scale: f32) -> Result<Self, RenderError> {
        let device = gpu.device;
        let sky_map = load_cubemap(device, gpu.queue, dir, name)?;
        let mesh = create_sky_sphere(SKY_SPHERE_WIDTH, SKY_SPHERE_HEIGHT);

        let sky = create_checked(device, "sky sphere", || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sky Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sky Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Sky Uniforms"),
                size: std::mem::size_of::<SkyUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sky Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX),
                    texture_entry_with(1, wgpu::TextureViewDimension::Cube),
                    sampler_entry(2),
                ],
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Sky Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&sky_map.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&sky_map.sampler),
                    },
                ],
            });

            let pipeline = create_pipeline(device, gpu.format, &layout);

            SkySphere {
                position: Vec3::ZERO,
                scale,
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                uniform_buffer,
                bind_group,
                pipeline,
                _sky_map: sky_map,
            }
        })?;

        info!(skymap = name, faces = mesh.face_count(), "Sky sphere created");
        Ok(sky)
    }

    /// Centre the sphere on `position`, normally the camera
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world(&self) -> Mat4 {
        sky_world(self.position, self.scale)
    }

    pub fn render(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, view_proj: Mat4) {
        let uniform = SkyUniforms {
            wvp: (view_proj * self.world()).to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Scale then translate
fn sky_world(position: Vec3, scale: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale))
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Sky Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("SkyTech"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[SkyVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        // Sky sits at depth 1.0, so LessEqual passes wherever nothing was drawn
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
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

    #[test]
    fn sky_world_keeps_camera_at_centre() {
        let world = sky_world(Vec3::new(5.0, 6.0, 7.0), 50.0);
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(world.transform_point3(Vec3::Y), Vec3::new(5.0, 56.0, 7.0));
    }
}
