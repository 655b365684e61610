//! Seasons Render - wgpu renderer for the seasonal terrain demo
//!
//! Provides the window and headless render contexts, the depth-only
//! [`DepthMap`] target, shadow-casting m3d models, the terrain and sky
//! pipelines and the compute stream-out particle system. All shaders are
//! WGSL modules compiled into the crate.

mod bindings;
mod camera;
mod context;
pub mod depth_map;
mod headless;
mod light;
pub mod m3d;
pub mod model;
pub mod particle_system;
mod primitives;
pub mod sky;
pub mod terrain_pipeline;
pub mod texture;

pub use camera::{Camera, FAR, FOV_Y, NEAR};
pub use context::{create_checked, FrameTarget, Gpu, RenderContext, RenderError};
pub use depth_map::{DepthMap, DepthPass, DEPTH_FORMAT};
pub use headless::HeadlessContext;
pub use light::{light_view_projection, Light, LightUniform};
pub use m3d::{parse_m3d, M3dData};
pub use model::{Model, ModelPhase};
pub use particle_system::GpuParticleSystem;
pub use primitives::{create_sky_sphere, MeshVertex, SkyMesh, SkyVertex, TerrainVertex};
pub use sky::SkySphere;
pub use terrain_pipeline::{TerrainFrame, TerrainMaps, TerrainRenderer};

#[cfg(test)]
mod tests {
    fn parse(name: &str, source: &str) -> naga::Module {
        naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name} failed to parse: {}", e.emit_to_string(source)))
    }

    fn validate(name: &str, source: &str) {
        let module = parse(name, source);
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name} failed to validate: {e:?}"));
    }

    fn entry_points(source: &str) -> Vec<String> {
        parse("shader", source)
            .entry_points
            .iter()
            .map(|ep| ep.name.clone())
            .collect()
    }

    #[test]
    fn mesh_shader_wgsl_parses() {
        validate("mesh.wgsl", include_str!("mesh.wgsl"));
    }

    #[test]
    fn shadow_map_shader_wgsl_parses() {
        validate("shadow_map.wgsl", include_str!("shadow_map.wgsl"));
    }

    #[test]
    fn particle_stream_out_shader_wgsl_parses() {
        validate("particle_stream_out.wgsl", include_str!("particle_stream_out.wgsl"));
    }

    #[test]
    fn particle_draw_shader_wgsl_parses() {
        validate("particle_draw.wgsl", include_str!("particle_draw.wgsl"));
    }

    #[test]
    fn terrain_shader_wgsl_parses() {
        validate("terrain.wgsl", include_str!("terrain.wgsl"));
    }

    #[test]
    fn sky_shader_wgsl_parses() {
        validate("sky.wgsl", include_str!("sky.wgsl"));
    }

    #[test]
    fn technique_entry_points_exist() {
        let stream_out = entry_points(include_str!("particle_stream_out.wgsl"));
        assert!(stream_out.contains(&"StreamOutTech".to_string()));
        assert!(stream_out.contains(&"FinalizeTech".to_string()));

        let draw = entry_points(include_str!("particle_draw.wgsl"));
        assert!(draw.contains(&"vs_draw".to_string()));
        assert!(draw.contains(&"fs_draw".to_string()));

        let shadow = entry_points(include_str!("shadow_map.wgsl"));
        assert!(shadow.contains(&"vs_shadow".to_string()));
    }
}
