//! Vertex layouts and the sky sphere mesh

use bytemuck::{Pod, Zeroable};
use seasons_terrain::TerrainMesh;

/// Tree model vertex with a tangent frame for normal mapping
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub tangent: [f32; 3],
    pub normal: [f32; 3],
    pub tex_c: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,   // pos
        1 => Float32x3,   // tangent
        2 => Float32x3,   // normal
        3 => Float32x2,   // tex_c
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Terrain vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TerrainVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Interleave a generated terrain mesh
    pub fn from_mesh(mesh: &TerrainMesh) -> Vec<TerrainVertex> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.uvs)
            .map(|((&position, &normal), &uv)| TerrainVertex {
                position,
                normal,
                uv,
            })
            .collect()
    }
}

/// Position-only vertex for the sky sphere
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyVertex {
    pub position: [f32; 3],
}

impl SkyVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkyVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Indexed position-only mesh
pub struct SkyMesh {
    pub vertices: Vec<SkyVertex>,
    pub indices: Vec<u32>,
}

impl SkyMesh {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Low-poly unit sphere: `height - 2` rings of `width` vertices followed
/// by the north and south poles. Only the inside is ever seen.
pub fn create_sky_sphere(width: u32, height: u32) -> SkyMesh {
    use std::f32::consts::PI;

    let mut vertices = Vec::with_capacity(((height - 2) * width + 2) as usize);
    for j in 1..height - 1 {
        let theta = j as f32 / (height - 1) as f32 * PI;
        for i in 0..width {
            let phi = i as f32 / (width - 1) as f32 * 2.0 * PI;
            vertices.push(SkyVertex {
                position: [theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin()],
            });
        }
    }
    vertices.push(SkyVertex {
        position: [0.0, 1.0, 0.0],
    });
    vertices.push(SkyVertex {
        position: [0.0, -1.0, 0.0],
    });

    let north = (height - 2) * width;
    let south = north + 1;
    let mut indices = Vec::with_capacity(((height - 2) * (width - 1) * 6) as usize);

    // Bands between rings
    for j in 0..height - 3 {
        for i in 0..width - 1 {
            indices.extend_from_slice(&[
                j * width + i,
                (j + 1) * width + i + 1,
                j * width + i + 1,
                j * width + i,
                (j + 1) * width + i,
                (j + 1) * width + i + 1,
            ]);
        }
    }

    // Caps
    for i in 0..width - 1 {
        indices.extend_from_slice(&[
            north,
            i,
            i + 1,
            south,
            (height - 3) * width + i + 1,
            (height - 3) * width + i,
        ]);
    }

    SkyMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_sphere_counts() {
        let sphere = create_sky_sphere(8, 4);
        assert_eq!(sphere.vertices.len(), 18);
        assert_eq!(sphere.face_count(), 28);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn sky_sphere_is_unit_radius() {
        let sphere = create_sky_sphere(8, 4);
        for v in &sphere.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
        assert_eq!(sphere.vertices[16].position, [0.0, 1.0, 0.0]);
        assert_eq!(sphere.vertices[17].position, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn vertex_strides() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 44);
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 32);
        assert_eq!(MeshVertex::desc().attributes[3].offset, 36);
    }
}
