//! A season's particle weather and where its emitter sits

use glam::Vec3;
use seasons_core::DemoConfig;
use seasons_particles::ParticleState;
use seasons_render::{Gpu, GpuParticleSystem, RenderError};
use seasons_runtime::{EmitAnchor, ParticleSetup};

use crate::world::SPRITE_DIR;

pub struct Weather {
    system: GpuParticleSystem,
    anchor: EmitAnchor,
}

impl Weather {
    pub fn new(gpu: Gpu<'_>, setup: ParticleSetup, config: &DemoConfig) -> Result<Self, RenderError> {
        let mut state = ParticleState::new(setup.kind, setup.kind.capacity(&config.particles))?;
        track(&mut state, setup.anchor, Vec3::ZERO);
        let system = GpuParticleSystem::new(gpu, state, &config.assets_dir.join(SPRITE_DIR))?;
        Ok(Self {
            system,
            anchor: setup.anchor,
        })
    }

    /// Advance the emitter clock and follow the camera at `eye`
    pub fn update(&mut self, dt: f32, scene_time: f32, eye: Vec3) {
        self.system.update(dt, scene_time);
        track(self.system.state_mut(), self.anchor, eye);
    }

    pub fn reset(&mut self) {
        self.system.reset();
    }

    pub fn system(&self) -> &GpuParticleSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut GpuParticleSystem {
        &mut self.system
    }
}

/// Point the effect at `eye` and move a camera-anchored emitter along with it
fn track(state: &mut ParticleState, anchor: EmitAnchor, eye: Vec3) {
    state.set_eye_pos(eye);
    match anchor {
        EmitAnchor::Camera => state.set_emit_pos(eye),
        EmitAnchor::Fixed(pos) => state.set_emit_pos(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seasons_particles::ParticleKind;

    #[test]
    fn camera_anchor_follows_the_eye() {
        let mut state = ParticleState::new(ParticleKind::Snow, 64).unwrap();
        let eye = Vec3::new(10.0, 2.0, -30.0);
        track(&mut state, EmitAnchor::Camera, eye);
        assert_eq!(state.emit_pos().truncate(), eye);
        assert_eq!(state.eye_pos().truncate(), eye);
    }

    #[test]
    fn fixed_anchor_ignores_the_eye() {
        let mut state = ParticleState::new(ParticleKind::Leaves, 64).unwrap();
        let tree_top = Vec3::new(0.0, 50.0, 350.0);
        track(&mut state, EmitAnchor::Fixed(tree_top), Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(state.emit_pos().truncate(), tree_top);
        assert_eq!(state.eye_pos().truncate(), Vec3::new(5.0, 5.0, 5.0));
    }
}
