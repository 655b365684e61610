//! Terrain rendering pipeline: three layers blended by a blend map, lit by
//! the sun and fogged (`TexTech`)

use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use seasons_core::Transform;
use seasons_terrain::TerrainMesh;
use tracing::info;
use wgpu::util::DeviceExt;

use crate::bindings::{sampler_entry, texture_entry, uniform_entry};
use crate::context::{create_checked, Gpu, RenderError};
use crate::depth_map::DEPTH_FORMAT;
use crate::primitives::TerrainVertex;
use crate::texture::{load_texture, ColorSpace, GpuTexture};

/// Layer repeats across the whole terrain
pub const LAYER_TILING: f32 = 16.0;

/// Terrain uniform data (bind group 0, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TerrainUniforms {
    pub wvp: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub tex_matrix: [[f32; 4]; 4],
    pub eye_pos: [f32; 3],
    pub _pad0: f32,
    pub sun_direction: [f32; 3],
    pub _pad1: f32,
    pub fog_color: [f32; 3],
    pub _pad2: f32,
}

/// Image files the terrain is textured with
#[derive(Debug, Clone)]
pub struct TerrainMaps {
    pub layers: [PathBuf; 3],
    /// RGB channels weight layers 0, 1 and 2
    pub blend_map: PathBuf,
    pub spec_map: PathBuf,
}

/// Per-frame inputs of the terrain pass
#[derive(Debug, Clone, Copy)]
pub struct TerrainFrame {
    pub view_proj: Mat4,
    pub eye_pos: Vec3,
    /// Points toward the sun
    pub sun_direction: Vec3,
    pub fog_color: Vec3,
}

/// GPU buffers, textures and pipeline for one terrain mesh
pub struct TerrainRenderer {
    world: Mat4,
    tex_matrix: Mat4,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    _textures: Vec<GpuTexture>,
}

impl TerrainRenderer {
    pub fn new(
        gpu: Gpu<'_>,
        mesh: &TerrainMesh,
        transform: Transform,
        maps: &TerrainMaps,
    ) -> Result<Self, RenderError> {
        let device = gpu.device;
        let load = |path: &PathBuf, space: ColorSpace| load_texture(device, gpu.queue, path, space);
        let textures = vec![
            load(&maps.layers[0], ColorSpace::Srgb)?,
            load(&maps.layers[1], ColorSpace::Srgb)?,
            load(&maps.layers[2], ColorSpace::Srgb)?,
            load(&maps.blend_map, ColorSpace::Linear)?,
            load(&maps.spec_map, ColorSpace::Linear)?,
        ];

        let vertices = TerrainVertex::from_mesh(mesh);
        let renderer = create_checked(device, "terrain", || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Terrain Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Terrain Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Terrain Uniforms"),
                size: std::mem::size_of::<TerrainUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Terrain Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    texture_entry(1), // layer0
                    texture_entry(2), // layer1
                    texture_entry(3), // layer2
                    texture_entry(4), // blendMap
                    texture_entry(5), // specularMap
                    sampler_entry(6),
                ],
            });

            let mut entries = vec![wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }];
            for (i, texture) in textures.iter().enumerate() {
                entries.push(wgpu::BindGroupEntry {
                    binding: i as u32 + 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                });
            }
            entries.push(wgpu::BindGroupEntry {
                binding: 6,
                resource: wgpu::BindingResource::Sampler(&textures[0].sampler),
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Terrain Bind Group"),
                layout: &layout,
                entries: &entries,
            });

            let pipeline = create_pipeline(device, gpu.format, &layout);

            TerrainRenderer {
                world: transform.to_matrix(),
                tex_matrix: Mat4::from_scale(Vec3::new(LAYER_TILING, LAYER_TILING, 1.0)),
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                uniform_buffer,
                bind_group,
                pipeline,
                _textures: textures,
            }
        })?;

        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Terrain uploaded"
        );
        Ok(renderer)
    }

    /// Per-frame constants for `frame`
    pub fn uniforms(&self, frame: &TerrainFrame) -> TerrainUniforms {
        TerrainUniforms {
            wvp: (frame.view_proj * self.world).to_cols_array_2d(),
            world: self.world.to_cols_array_2d(),
            tex_matrix: self.tex_matrix.to_cols_array_2d(),
            eye_pos: frame.eye_pos.to_array(),
            _pad0: 0.0,
            sun_direction: frame.sun_direction.to_array(),
            _pad1: 0.0,
            fog_color: frame.fog_color.to_array(),
            _pad2: 0.0,
        }
    }

    /// Draw the terrain into the current main pass
    pub fn render(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, frame: &TerrainFrame) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms(frame)));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Terrain Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Terrain Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("TexTech"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[TerrainVertex::desc()],
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
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
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
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<TerrainUniforms>(), 240);
    }

    #[test]
    fn season_terrain_transform_scales_then_translates() {
        let world = Transform::from_position(Vec3::new(-600.0, -150.0, -600.0))
            .with_uniform_scale(5.0)
            .to_matrix();
        let far_corner = world.transform_point3(Vec3::new(256.0, 0.0, 256.0));
        assert_eq!(far_corner, Vec3::new(680.0, -150.0, 680.0));
    }
}
