//! Weather effects: rain, falling leaves and snow

use seasons_core::ParticleLimits;

/// Blend mode for rendering particles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleBlendMode {
    /// Standard alpha blending (src_alpha, one_minus_src_alpha)
    Alpha,
    /// Additive blending (src_alpha, one)
    Additive,
}

/// Which effect a particle system runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Rain,
    Leaves,
    Snow,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [ParticleKind::Rain, ParticleKind::Leaves, ParticleKind::Snow];

    /// Capacity bound configured for this effect
    pub fn capacity(self, limits: &ParticleLimits) -> u32 {
        match self {
            ParticleKind::Rain => limits.rain_max,
            ParticleKind::Leaves => limits.leaves_max,
            ParticleKind::Snow => limits.snow_max,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Rain => "rain",
            ParticleKind::Leaves => "leaves",
            ParticleKind::Snow => "snow",
        }
    }

    /// Simulation and drawing parameters for this effect
    pub fn effect(self) -> ParticleEffect {
        match self {
            ParticleKind::Rain => ParticleEffect {
                spawn_interval: 0.002,
                spawn_count: 5,
                lifetime: 3.0,
                acceleration: [-1.0, -9.8, 0.0],
                initial_velocity: [0.0, 0.0, 0.0],
                spawn_offset: [0.0, 20.0, 0.0],
                spawn_extent: [35.0, 0.0, 35.0],
                size: [0.15, 1.5],
                blend_mode: ParticleBlendMode::Additive,
                sprites: &["raindrop.png"],
            },
            ParticleKind::Leaves => ParticleEffect {
                spawn_interval: 0.1,
                spawn_count: 2,
                lifetime: 12.0,
                acceleration: [0.8, -1.5, 0.3],
                initial_velocity: [0.0, -1.0, 0.0],
                spawn_offset: [0.0, 0.0, 0.0],
                spawn_extent: [60.0, 10.0, 60.0],
                size: [2.0, 2.0],
                blend_mode: ParticleBlendMode::Alpha,
                sprites: &["tumbling_leaf.png"],
            },
            ParticleKind::Snow => ParticleEffect {
                spawn_interval: 0.002,
                spawn_count: 8,
                lifetime: 10.0,
                acceleration: [0.4, -2.0, 0.0],
                initial_velocity: [0.0, -1.0, 0.0],
                spawn_offset: [0.0, 40.0, 0.0],
                spawn_extent: [100.0, 0.0, 100.0],
                size: [0.6, 0.6],
                blend_mode: ParticleBlendMode::Additive,
                sprites: &["snowflake.png"],
            },
        }
    }
}

/// Parameters the stream-out and draw passes run with.
///
/// Live particles move ballistically: `p(t) = p0 + v0*t + a*t^2/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEffect {
    /// Seconds between emitter firings
    pub spawn_interval: f32,
    /// Particles spawned per firing
    pub spawn_count: u32,
    /// Seconds a particle lives before it is culled
    pub lifetime: f32,
    pub acceleration: [f32; 3],
    pub initial_velocity: [f32; 3],
    /// Offset from the emitter position to the centre of the spawn volume
    pub spawn_offset: [f32; 3],
    /// Half extents of the spawn volume
    pub spawn_extent: [f32; 3],
    /// Billboard width and height in world units
    pub size: [f32; 2],
    pub blend_mode: ParticleBlendMode,
    /// Sprite images, one texture array layer each
    pub sprites: &'static [&'static str],
}
