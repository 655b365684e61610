//! Seasons Terrain - Heightmap-based terrain generation
//!
//! Loads 8-bit raw heightmaps, smooths them and builds a single grid mesh
//! (positions, normals, UVs, indices). Does not depend on seasons-render;
//! the renderer uploads the raw vertex data itself.

pub mod heightmap;
pub mod terrain;

pub use heightmap::{Heightmap, DIMENSIONS, SMOOTHING_FACTOR};
pub use terrain::{grid_indices, Terrain, TerrainMesh};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_size_grid_counts() {
        let bytes = vec![0u8; (DIMENSIONS * DIMENSIONS) as usize];
        let hm = Heightmap::from_raw_bytes(&bytes, DIMENSIONS, DIMENSIONS).unwrap();
        let terrain = Terrain::from_heightmap(hm);

        assert_eq!(terrain.mesh.vertex_count(), 257 * 257);
        assert_eq!(terrain.mesh.face_count(), 2 * 256 * 256);
        assert_eq!(terrain.mesh.indices.len(), 3 * 2 * 256 * 256);
    }

    #[test]
    fn heights_are_smoothed_and_laid_out_row_major() {
        // 3x3 grid with distinct bytes so positions are traceable
        let bytes: Vec<u8> = (0..9).map(|i| i * 10).collect();
        let hm = Heightmap::from_raw_bytes(&bytes, 3, 3).unwrap();
        let terrain = Terrain::from_heightmap(hm);
        let mesh = &terrain.mesh;

        // Vertex 5 = row 1, column 2
        assert_eq!(mesh.positions[5][0], 2.0);
        assert_eq!(mesh.positions[5][2], 1.0);
        assert!((mesh.positions[5][1] - 50.0 * SMOOTHING_FACTOR).abs() < 1e-5);
    }

    #[test]
    fn texcoords_span_the_grid() {
        let hm = Heightmap::from_heights(vec![0.0; 16], 4, 4).unwrap();
        let mesh = TerrainMesh::generate(&hm);

        assert_eq!(mesh.uvs[0], [0.0, 0.0]);
        // Last vertex of the first row: column 3 → v = 1
        assert_eq!(mesh.uvs[3], [0.0, 1.0]);
        // First vertex of the last row: row 3 → u = 1
        assert_eq!(mesh.uvs[12], [1.0, 0.0]);
        assert_eq!(mesh.uvs[15], [1.0, 1.0]);
    }

    #[test]
    fn first_quad_indices() {
        let indices = grid_indices(4, 4);
        assert_eq!(&indices[..6], &[0, 4, 1, 1, 4, 5]);
        // Second quad shifts by one column
        assert_eq!(&indices[6..12], &[1, 5, 2, 2, 5, 6]);
        // All indices in range
        assert!(indices.iter().all(|&i| i < 16));
    }

    #[test]
    fn flat_terrain_normals_point_up() {
        let hm = Heightmap::from_heights(vec![5.0; 9], 3, 3).unwrap();
        let mesh = TerrainMesh::generate(&hm);
        for n in &mesh.normals {
            assert!((n[0]).abs() < 1e-6);
            assert!((n[1] - 1.0).abs() < 1e-6);
            assert!((n[2]).abs() < 1e-6);
        }
    }

    #[test]
    fn slope_normal_leans_downhill() {
        // Height rises with x: h = x
        let heights: Vec<f32> = (0..9).map(|i| (i % 3) as f32).collect();
        let hm = Heightmap::from_heights(heights, 3, 3).unwrap();
        let n = hm.compute_normal(1, 1);
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((n[0] + expected).abs() < 1e-5);
        assert!((n[1] - expected).abs() < 1e-5);
        assert!(n[2].abs() < 1e-5);

        // Border vertex uses a one-sided difference with the same slope
        let edge = hm.compute_normal(0, 0);
        assert!((edge[0] + expected).abs() < 1e-5);
    }

    #[test]
    fn short_raw_data_is_rejected() {
        let bytes = vec![0u8; 100];
        assert!(Heightmap::from_raw_bytes(&bytes, DIMENSIONS, DIMENSIONS).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Terrain::load(std::path::Path::new("does/not/exist.raw"));
        assert!(result.is_err());
    }
}
