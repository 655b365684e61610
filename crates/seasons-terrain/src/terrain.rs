//! Terrain grid mesh generation

use std::path::Path;

use seasons_core::Result;
use tracing::info;

use crate::heightmap::{Heightmap, DIMENSIONS, SMOOTHING_FACTOR};

/// Vertex and index data for a heightmap grid.
///
/// Vertex `z * width + x` sits at `(x, height, z)`. Its texture coordinate
/// runs `u` along Z and `v` along X across the whole grid.
pub struct TerrainMesh {
    /// Columns (X)
    pub width: u32,
    /// Rows (Z)
    pub depth: u32,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, two triangles per grid quad
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Build the full grid mesh for a heightmap.
    pub fn generate(heightmap: &Heightmap) -> Self {
        let width = heightmap.width;
        let depth = heightmap.depth;
        let vertex_count = (width * depth) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        let du = 1.0 / (depth - 1) as f32;
        let dv = 1.0 / (width - 1) as f32;

        for z in 0..depth {
            for x in 0..width {
                let h = heightmap.height(x as i64, z as i64);
                positions.push([x as f32, h, z as f32]);
                normals.push(heightmap.compute_normal(x, z));
                uvs.push([z as f32 * du, x as f32 * dv]);
            }
        }

        let indices = grid_indices(width, depth);

        Self {
            width,
            depth,
            positions,
            normals,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Two triangles per quad:
/// `(a, a+w, a+1)` and `(a+1, a+w, a+w+1)` with `a = i*w + j`.
pub fn grid_indices(width: u32, depth: u32) -> Vec<u32> {
    let quads = ((width - 1) * (depth - 1)) as usize;
    let mut indices = Vec::with_capacity(quads * 6);

    for i in 0..depth - 1 {
        for j in 0..width - 1 {
            let a = i * width + j;
            let below = (i + 1) * width + j;

            indices.extend_from_slice(&[a, below, a + 1, a + 1, below, below + 1]);
        }
    }

    indices
}

/// A loaded terrain: the smoothed heightmap plus its grid mesh
pub struct Terrain {
    pub heightmap: Heightmap,
    pub mesh: TerrainMesh,
}

impl Terrain {
    /// Load a 257x257 raw heightmap, smooth it and build the mesh.
    pub fn load(path: &Path) -> Result<Self> {
        let heightmap = Heightmap::from_raw_file(path, DIMENSIONS, DIMENSIONS)?;
        let terrain = Self::from_heightmap(heightmap);
        info!(
            path = %path.display(),
            vertices = terrain.mesh.vertex_count(),
            faces = terrain.mesh.face_count(),
            "Loaded terrain"
        );
        Ok(terrain)
    }

    /// Smooth a heightmap and build the mesh.
    pub fn from_heightmap(mut heightmap: Heightmap) -> Self {
        heightmap.smooth(SMOOTHING_FACTOR);
        let mesh = TerrainMesh::generate(&heightmap);
        Self { heightmap, mesh }
    }
}
