//! Shadow-casting textured model.
//!
//! Each frame a model records two passes in order: a depth-only pass from
//! the light into its own [`DepthMap`], then a lit pass that samples that
//! map. [`ModelPhase`] rejects a lit pass that has no shadow pass before it.

use std::ops::Range;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use seasons_core::{SeasonsError, Transform};
use tracing::info;
use wgpu::util::DeviceExt;

use crate::bindings::{
    comparison_sampler_entry, depth_texture_entry, sampler_entry, texture_entry, uniform_entry,
};
use crate::context::{create_checked, Gpu, RenderError};
use crate::depth_map::{DepthMap, DEPTH_FORMAT};
use crate::light::{Light, LightUniform};
use crate::m3d::parse_m3d;
use crate::primitives::MeshVertex;
use crate::texture::{load_texture, ColorSpace, GpuTexture};

/// Where a model is within its per-frame pass sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelPhase {
    /// Nothing recorded yet
    #[default]
    Idle,
    /// The depth map holds this frame's shadow
    ShadowRecorded,
    /// The lit pass consumed the shadow
    Lit,
}

impl ModelPhase {
    /// A shadow pass may start from any phase
    pub fn after_shadow(self) -> ModelPhase {
        ModelPhase::ShadowRecorded
    }

    /// A lit pass needs a fresh shadow
    pub fn after_lit(self) -> Result<ModelPhase, RenderError> {
        match self {
            ModelPhase::ShadowRecorded => Ok(ModelPhase::Lit),
            other => Err(RenderError::PassOrder(format!(
                "lit pass requested in phase {other:?} without a shadow pass first"
            ))),
        }
    }
}

/// Per-frame constants of the lit pass (`MeshTech`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshFrameUniform {
    pub world: [[f32; 4]; 4],
    pub wvp: [[f32; 4]; 4],
    pub light_wvp: [[f32; 4]; 4],
    pub light: LightUniform,
    pub camera_pos: [f32; 3],
    pub _pad0: f32,
    pub fog_color: [f32; 3],
    pub _pad1: f32,
}

/// Per-frame constants of the shadow pass (`BuildShadowMapTech`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShadowUniform {
    pub light_wvp: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct SubsetUniform {
    reflect_material: [f32; 4],
}

struct SubsetMaterial {
    diffuse: GpuTexture,
    spec: GpuTexture,
    normal: GpuTexture,
    reflectivity: [f32; 3],
}

struct GpuSubset {
    range: Range<u32>,
    lit_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    _uniform: wgpu::Buffer,
}

/// A loaded m3d model with its own shadow map
pub struct Model {
    world: Mat4,
    light_wvp: Mat4,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    subsets: Vec<GpuSubset>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_buffer: wgpu::Buffer,
    shadow_frame_bind_group: wgpu::BindGroup,
    lit_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    depth_map: DepthMap,
    phase: ModelPhase,
}

impl Model {
    /// Load `path`, its textures (relative to the file) and build both
    /// pipelines. `shadow_size` is the edge length of the shadow map.
    pub fn load(
        gpu: Gpu<'_>,
        path: &Path,
        transform: Transform,
        shadow_size: u32,
    ) -> Result<Self, RenderError> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SeasonsError::file_read(display.clone(), e))?;
        let data =
            parse_m3d(&source).map_err(|e| SeasonsError::model(display.clone(), e.to_string()))?;
        if data.subsets.is_empty() || data.triangles.is_empty() {
            return Err(SeasonsError::model(display, "model has no subsets or triangles").into());
        }

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let materials = data
            .subsets
            .iter()
            .map(|s| -> Result<SubsetMaterial, RenderError> {
                let load = |name: &str, space: ColorSpace| {
                    load_texture(gpu.device, gpu.queue, &dir.join(name), space)
                };
                Ok(SubsetMaterial {
                    diffuse: load(&s.diffuse_map, ColorSpace::Srgb)?,
                    spec: load(&s.spec_map, ColorSpace::Linear)?,
                    normal: load(&s.normal_map, ColorSpace::Linear)?,
                    reflectivity: s.reflectivity,
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let sorted = data.sorted_indices();
        let device = gpu.device;

        let model = create_checked(device, "model", || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Vertex Buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Index Buffer"),
                contents: bytemuck::cast_slice(&sorted.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            let depth_map = DepthMap::new(device, shadow_size, shadow_size);

            // Lit pass layouts
            let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Frame Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    depth_texture_entry(1),
                    comparison_sampler_entry(2),
                ],
            });
            let subset_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Subset Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                    texture_entry(1), // diffuseMap
                    texture_entry(2), // specMap
                    texture_entry(3), // normalMap
                    sampler_entry(4),
                ],
            });

            // Shadow pass layouts
            let shadow_frame_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Shadow Frame Bind Group Layout"),
                    entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
                });
            let shadow_subset_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Shadow Subset Bind Group Layout"),
                    entries: &[texture_entry(0), sampler_entry(1)],
                });

            let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Mesh Frame Uniforms"),
                size: std::mem::size_of::<MeshFrameUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Mesh Frame Bind Group"),
                layout: &frame_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: frame_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(depth_map.depth_map()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(depth_map.sampler()),
                    },
                ],
            });

            let shadow_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Shadow Uniforms"),
                size: std::mem::size_of::<ShadowUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let shadow_frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Frame Bind Group"),
                layout: &shadow_frame_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shadow_buffer.as_entire_binding(),
                }],
            });

            let subsets = materials
                .iter()
                .zip(&sorted.ranges)
                .map(|(material, range)| {
                    build_subset(device, &subset_layout, &shadow_subset_layout, material, range.clone())
                })
                .collect::<Vec<_>>();

            let lit_pipeline = mesh_pipeline(device, gpu.format, &frame_layout, &subset_layout);
            let shadow_pipeline =
                shadow_pipeline(device, &shadow_frame_layout, &shadow_subset_layout);

            Model {
                world: transform.to_matrix(),
                light_wvp: Mat4::IDENTITY,
                vertex_buffer,
                index_buffer,
                subsets,
                frame_buffer,
                frame_bind_group,
                shadow_buffer,
                shadow_frame_bind_group,
                lit_pipeline,
                shadow_pipeline,
                depth_map,
                phase: ModelPhase::Idle,
            }
        })?;

        info!(
            path = %path.display(),
            vertices = data.vertices.len(),
            triangles = data.triangles.len(),
            subsets = data.subsets.len(),
            "Loaded model"
        );
        Ok(model)
    }

    /// Recompute the light-space transform from the light's view-projection
    pub fn update(&mut self, queue: &wgpu::Queue, light_view_proj: Mat4) {
        self.light_wvp = light_view_proj * self.world;
        let uniform = ShadowUniform {
            light_wvp: self.light_wvp.to_cols_array_2d(),
        };
        queue.write_buffer(&self.shadow_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Record the depth-only pass from the light into the shadow map
    pub fn render_shadow(&mut self, encoder: &mut wgpu::CommandEncoder) -> Result<(), RenderError> {
        let mut pass = self.depth_map.begin(encoder)?;
        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.shadow_frame_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for subset in &self.subsets {
            // Diffuse only, for alpha-tested cut-outs
            pass.set_bind_group(1, &subset.shadow_bind_group, &[]);
            pass.draw_indexed(subset.range.clone(), 0, 0..1);
        }
        self.depth_map.end(pass);

        self.phase = self.phase.after_shadow();
        Ok(())
    }

    /// Draw the model lit and shadowed into the current main pass
    pub fn render_lit(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        view_proj: Mat4,
        camera_pos: Vec3,
        light: &Light,
        fog_color: Vec3,
    ) -> Result<(), RenderError> {
        self.phase = self.phase.after_lit()?;

        let uniform = MeshFrameUniform {
            world: self.world.to_cols_array_2d(),
            wvp: (view_proj * self.world).to_cols_array_2d(),
            light_wvp: self.light_wvp.to_cols_array_2d(),
            light: light.to_uniform(),
            camera_pos: camera_pos.to_array(),
            _pad0: 0.0,
            fog_color: fog_color.to_array(),
            _pad1: 0.0,
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        pass.set_pipeline(&self.lit_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for subset in &self.subsets {
            pass.set_bind_group(1, &subset.lit_bind_group, &[]);
            pass.draw_indexed(subset.range.clone(), 0, 0..1);
        }
        Ok(())
    }

    pub fn phase(&self) -> ModelPhase {
        self.phase
    }

    pub fn depth_map(&self) -> &DepthMap {
        &self.depth_map
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }
}

fn build_subset(
    device: &wgpu::Device,
    lit_layout: &wgpu::BindGroupLayout,
    shadow_layout: &wgpu::BindGroupLayout,
    material: &SubsetMaterial,
    range: Range<u32>,
) -> GpuSubset {
    let [r, g, b] = material.reflectivity;
    let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Subset Uniforms"),
        contents: bytemuck::bytes_of(&SubsetUniform {
            reflect_material: [r, g, b, 1.0],
        }),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let lit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Subset Bind Group"),
        layout: lit_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&material.diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&material.spec.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&material.normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&material.diffuse.sampler),
            },
        ],
    });

    let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Shadow Subset Bind Group"),
        layout: shadow_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&material.diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&material.diffuse.sampler),
            },
        ],
    });

    GpuSubset {
        range,
        lit_bind_group,
        shadow_bind_group,
        _uniform: uniform,
    }
}

/// `MeshTech`: normal-mapped, shadowed, fogged
fn mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    subset_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh Pipeline Layout"),
        bind_group_layouts: &[frame_layout, subset_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("MeshTech"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::desc()],
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
            front_face: wgpu::FrontFace::Cw,
            // Leaves are single-sided cards
            cull_mode: None,
            ..Default::default()
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

/// `BuildShadowMapTech`: depth only, with alpha test and depth bias
fn shadow_pipeline(
    device: &wgpu::Device,
    frame_layout: &wgpu::BindGroupLayout,
    subset_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Map Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow_map.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Map Pipeline Layout"),
        bind_group_layouts: &[frame_layout, subset_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("BuildShadowMapTech"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_shadow"),
            buffers: &[MeshVertex::desc()],
            compilation_options: Default::default(),
        },
        // No colour targets; the fragment stage only discards
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_shadow"),
            targets: &[],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
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
    fn shadow_then_lit_is_accepted() {
        let phase = ModelPhase::Idle.after_shadow();
        assert_eq!(phase, ModelPhase::ShadowRecorded);
        assert_eq!(phase.after_lit().unwrap(), ModelPhase::Lit);
    }

    #[test]
    fn lit_without_shadow_is_rejected() {
        assert!(matches!(
            ModelPhase::Idle.after_lit(),
            Err(RenderError::PassOrder(_))
        ));
    }

    #[test]
    fn each_frame_needs_a_fresh_shadow() {
        let lit = ModelPhase::Idle.after_shadow().after_lit().unwrap();
        assert!(lit.after_lit().is_err());
        assert_eq!(lit.after_shadow().after_lit().unwrap(), ModelPhase::Lit);
    }

    #[test]
    fn frame_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<MeshFrameUniform>(), 320);
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 64);
    }
}
