//! The scene every season shares: terrain, sky, shadowed tree, light and
//! camera. Weather belongs to the season that has it and is passed in.

use std::path::{Path, PathBuf};

use glam::Mat4;
use seasons_core::DemoConfig;
use seasons_render::{
    light_view_projection, Camera, FrameTarget, Gpu, Light, Model, RenderError,
    SkySphere, TerrainFrame, TerrainMaps, TerrainRenderer,
};
use seasons_runtime::{
    terrain_transform, tree_transform, GameClock, InputState, Season, SeasonProfile,
    HEIGHTMAP, SKY_SCALE, TERRAIN_SPEC_MAP,
};
use seasons_terrain::Terrain;
use tracing::{debug, info};
use winit::keyboard::KeyCode;

use crate::rig::CameraRig;
use crate::weather::Weather;

/// Ends the active season
pub const ADVANCE_KEY: KeyCode = KeyCode::Digit1;
/// Restarts the weather effect
pub const RESET_PARTICLES_KEY: KeyCode = KeyCode::KeyR;

/// Asset subdirectories under `assets_dir`
pub const TEXTURE_DIR: &str = "textures";
pub const MODEL_DIR: &str = "models";
pub const SKYMAP_DIR: &str = "skymaps";
pub const SPRITE_DIR: &str = "particles";

/// Terrain textures for `profile`, resolved under `assets`
pub fn terrain_maps(assets: &Path, profile: &SeasonProfile) -> TerrainMaps {
    let textures = assets.join(TEXTURE_DIR);
    TerrainMaps {
        layers: profile.terrain.layers.map(|layer| textures.join(layer)),
        blend_map: textures.join(profile.terrain.blend_map),
        spec_map: textures.join(TERRAIN_SPEC_MAP),
    }
}

/// Tree model file for `profile`
pub fn tree_path(assets: &Path, profile: &SeasonProfile) -> PathBuf {
    assets.join(MODEL_DIR).join(profile.tree)
}

pub struct SeasonWorld {
    profile: SeasonProfile,
    camera: Camera,
    rig: CameraRig,
    terrain: TerrainRenderer,
    sky: SkySphere,
    tree: Model,
    light: Light,
    light_view_proj: Mat4,
}

impl SeasonWorld {
    /// Build every component of `season` from the files under the asset
    /// directory
    pub fn initialise(gpu: Gpu<'_>, season: Season, config: &DemoConfig) -> Result<Self, RenderError> {
        let profile = season.profile();
        let assets = config.assets_dir.as_path();

        let terrain = Terrain::load(&assets.join(HEIGHTMAP))?;
        let terrain = TerrainRenderer::new(
            gpu,
            &terrain.mesh,
            terrain_transform(),
            &terrain_maps(assets, &profile),
        )?;

        let sky = SkySphere::new(gpu, &assets.join(SKYMAP_DIR), profile.skymap, SKY_SCALE)?;

        let tree = Model::load(
            gpu,
            &tree_path(assets, &profile),
            tree_transform(),
            config.shadow_map_size,
        )?;

        let lp = profile.light;
        let light = Light::directional(lp.position, lp.direction, lp.ambient, lp.specular);
        let light_view_proj = light_view_projection(
            lp.position,
            lp.volume.width,
            lp.volume.height,
            lp.volume.near,
            lp.volume.far,
        );

        info!(
            %season,
            tree = profile.tree,
            skymap = profile.skymap,
            particles = profile.particles.map(|p| p.kind.name()).unwrap_or("none"),
            "Season world built"
        );

        Ok(Self {
            profile,
            camera: Camera::new(gpu.aspect_ratio()),
            rig: CameraRig::new(&config.camera),
            terrain,
            sky,
            tree,
            light,
            light_view_proj,
        })
    }

    /// Advance one frame. Returns `true` when the season is over.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        input: &InputState,
        clock: &GameClock,
        mut weather: Option<&mut Weather>,
    ) -> bool {
        if input.pressed(ADVANCE_KEY) {
            return true;
        }

        let dt = clock.dt();
        self.rig.update(input, dt, &mut self.camera);

        if input.pressed(RESET_PARTICLES_KEY) {
            if let Some(weather) = weather.as_mut() {
                weather.reset();
            }
        }

        self.camera.zoom(input.wheel());
        self.sky.set_position(self.camera.position);

        if let Some(weather) = weather {
            weather.update(dt, clock.scene_time(), self.camera.position);
        }

        self.tree.update(queue, self.light_view_proj);
        false
    }

    /// Record and submit the frame: particle simulation, the tree's shadow
    /// pass, then the main pass (tree, terrain, sky, particles).
    pub fn render(
        &mut self,
        gpu: Gpu<'_>,
        target: FrameTarget<'_>,
        mut weather: Option<&mut Weather>,
    ) -> Result<(), RenderError> {
        let view_proj = self.camera.view_projection_matrix();
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Season Frame Encoder"),
            });

        if let Some(weather) = weather.as_mut() {
            let plan = weather.system_mut().simulate(gpu.queue, &mut encoder, view_proj);
            debug!(source = ?plan.source, target = plan.target, "Particle pass");
        }

        self.tree.render_shadow(&mut encoder)?;

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.tree.render_lit(
                gpu.queue,
                &mut pass,
                view_proj,
                self.camera.position,
                &self.light,
                self.profile.fog_color,
            )?;

            self.terrain.render(
                gpu.queue,
                &mut pass,
                &TerrainFrame {
                    view_proj,
                    eye_pos: self.camera.position,
                    sun_direction: self.profile.sun_direction,
                    fog_color: self.profile.fog_color,
                },
            );

            self.sky.render(gpu.queue, &mut pass, view_proj);

            if let Some(weather) = &weather {
                weather.system().draw(&mut pass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }
}

impl Drop for SeasonWorld {
    fn drop(&mut self) {
        debug!(season = %self.profile.season, "Releasing season resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winter_terrain_maps_resolve_under_textures() {
        let maps = terrain_maps(Path::new("assets"), &Season::Winter.profile());
        assert_eq!(maps.layers[0], PathBuf::from("assets/textures/snow.png"));
        assert_eq!(maps.blend_map, PathBuf::from("assets/textures/blendWinter.png"));
        assert_eq!(maps.spec_map, PathBuf::from("assets/textures/defaultspec.png"));
    }

    #[test]
    fn autumn_tree_lives_in_models() {
        assert_eq!(
            tree_path(Path::new("data"), &Season::Autumn.profile()),
            PathBuf::from("data/models/tree_autumn.m3d")
        );
    }
}
