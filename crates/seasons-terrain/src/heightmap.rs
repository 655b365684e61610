//! Raw heightmap loading and sampling

use std::path::Path;

use seasons_core::{Result, SeasonsError};

/// Edge length of the square raw heightmaps shipped with the demo
pub const DIMENSIONS: u32 = 257;

/// Scale applied to raw 8-bit heights so the terrain is not too spiky
pub const SMOOTHING_FACTOR: f32 = 0.1;

/// A grid of heights, one per terrain vertex
pub struct Heightmap {
    /// Row-major heights (`row * width + column`)
    heights: Vec<f32>,
    /// Columns (X)
    pub width: u32,
    /// Rows (Z)
    pub depth: u32,
}

impl Heightmap {
    /// Load a raw 8-bit heightmap of `width * depth` bytes.
    pub fn from_raw_file(path: &Path, width: u32, depth: u32) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| SeasonsError::file_read(path.display().to_string(), e))?;
        Self::from_raw_bytes(&bytes, width, depth).map_err(|e| match e {
            SeasonsError::HeightmapError(msg) => {
                SeasonsError::HeightmapError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Build a heightmap from raw 8-bit samples. Extra trailing bytes are ignored.
    pub fn from_raw_bytes(bytes: &[u8], width: u32, depth: u32) -> Result<Self> {
        let expected = (width as usize) * (depth as usize);
        if width < 2 || depth < 2 {
            return Err(SeasonsError::HeightmapError(format!(
                "heightmap must be at least 2x2, got {width}x{depth}"
            )));
        }
        if bytes.len() < expected {
            return Err(SeasonsError::HeightmapError(format!(
                "expected {expected} bytes for a {width}x{depth} grid, found {}",
                bytes.len()
            )));
        }

        let heights = bytes[..expected].iter().map(|&b| b as f32).collect();
        Ok(Self {
            heights,
            width,
            depth,
        })
    }

    /// Create a heightmap from float data (for testing and procedural input)
    pub fn from_heights(heights: Vec<f32>, width: u32, depth: u32) -> Result<Self> {
        if heights.len() != (width as usize) * (depth as usize) || width < 2 || depth < 2 {
            return Err(SeasonsError::HeightmapError(format!(
                "{} heights do not form a {width}x{depth} grid",
                heights.len()
            )));
        }
        Ok(Self {
            heights,
            width,
            depth,
        })
    }

    /// Multiply every height by `factor`.
    pub fn smooth(&mut self, factor: f32) {
        for h in &mut self.heights {
            *h *= factor;
        }
    }

    /// Height at column `x`, row `z`. Coordinates are clamped to the grid.
    pub fn height(&self, x: i64, z: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let z = z.clamp(0, self.depth as i64 - 1) as u32;
        self.heights[(z * self.width + x) as usize]
    }

    /// Surface normal at a grid vertex by central differences.
    ///
    /// Grid spacing is one unit in X and Z. Border vertices fall back to
    /// one-sided differences.
    pub fn compute_normal(&self, x: u32, z: u32) -> [f32; 3] {
        let (x, z) = (x as i64, z as i64);

        let x0 = (x - 1).max(0);
        let x1 = (x + 1).min(self.width as i64 - 1);
        let z0 = (z - 1).max(0);
        let z1 = (z + 1).min(self.depth as i64 - 1);

        let dx = (self.height(x1, z) - self.height(x0, z)) / (x1 - x0) as f32;
        let dz = (self.height(x, z1) - self.height(x, z0)) / (z1 - z0) as f32;

        // Normal = normalize(-dh/dx, 1, -dh/dz)
        let nx = -dx;
        let ny = 1.0;
        let nz = -dz;
        let len = (nx * nx + ny * ny + nz * nz).sqrt();

        [nx / len, ny / len, nz / len]
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}
