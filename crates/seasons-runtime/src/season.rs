//! The four seasons and the scene data each one is built from

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use seasons_core::{SeasonsError, Transform};
use seasons_particles::ParticleKind;

/// Raw heightmap shared by every season
pub const HEIGHTMAP: &str = "heightmap3.raw";
/// Specular map shared by every season's terrain
pub const TERRAIN_SPEC_MAP: &str = "defaultspec.png";
/// Uniform scale of the sky sphere
pub const SKY_SCALE: f32 = 50.0;

/// One of the four scene states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// The season that follows this one
    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Everything needed to build this season's scene
    pub fn profile(self) -> SeasonProfile {
        // Light direction shared by all but summer
        let diagonal = Vec3::new(0.57735, -0.57735, 0.57735);

        match self {
            Season::Spring => SeasonProfile {
                season: self,
                tree: "tree.m3d",
                terrain: TerrainLayers {
                    layers: ["grass0.png", "dark_grass.png", "grass.png"],
                    blend_map: "blendSpring.png",
                },
                skymap: "SpringSkymap",
                light: LightProfile {
                    direction: diagonal,
                    ambient: 0.5,
                    specular: 1.0,
                    position: Vec3::new(10.0, 100.0, 350.0),
                    volume: OrthoVolume::new(200.0, 200.0, -35.0, 100.0),
                },
                fog_color: Vec3::new(0.65, 0.7, 0.75),
                sun_direction: Vec3::new(300.0, 100.0, 500.0),
                particles: Some(ParticleSetup {
                    kind: ParticleKind::Rain,
                    anchor: EmitAnchor::Camera,
                }),
            },
            Season::Summer => SeasonProfile {
                season: self,
                tree: "tree.m3d",
                terrain: TerrainLayers {
                    layers: ["grass0.png", "dark_grass.png", "grass.png"],
                    blend_map: "blendSummer.png",
                },
                skymap: "SummerSkymap",
                light: LightProfile {
                    direction: Vec3::new(0.6, -0.97, 0.25),
                    ambient: 0.6,
                    specular: 1.0,
                    position: Vec3::new(-10.0, 100.0, 350.0),
                    volume: OrthoVolume::new(200.0, 200.0, -35.0, 100.0),
                },
                fog_color: Vec3::new(0.7, 0.65, 0.55),
                sun_direction: Vec3::new(-300.0, 100.0, -100.0),
                particles: None,
            },
            Season::Autumn => SeasonProfile {
                season: self,
                tree: "tree_autumn.m3d",
                terrain: TerrainLayers {
                    layers: ["leaves.png", "dark_grass.png", "grass.png"],
                    blend_map: "blendAutumn.png",
                },
                skymap: "AutumnSkymap",
                light: LightProfile {
                    direction: diagonal,
                    ambient: 0.6,
                    specular: 0.5,
                    position: Vec3::new(-95.0, 200.0, 350.0),
                    volume: OrthoVolume::new(400.0, 400.0, -100.0, 100.0),
                },
                fog_color: Vec3::new(0.4, 0.4, 0.25),
                sun_direction: Vec3::new(-300.0, 250.0, -200.0),
                particles: Some(ParticleSetup {
                    kind: ParticleKind::Leaves,
                    anchor: EmitAnchor::Fixed(Vec3::new(0.0, 50.0, 350.0)),
                }),
            },
            Season::Winter => SeasonProfile {
                season: self,
                tree: "tree_winter.m3d",
                terrain: TerrainLayers {
                    layers: ["snow.png", "frozen_ground.png", "ice.png"],
                    blend_map: "blendWinter.png",
                },
                skymap: "WinterSkymap",
                light: LightProfile {
                    direction: diagonal,
                    ambient: 0.4,
                    specular: 1.0,
                    position: Vec3::new(10.0, 100.0, 350.0),
                    volume: OrthoVolume::new(200.0, 200.0, -35.0, 100.0),
                },
                fog_color: Vec3::new(0.7, 0.8, 0.9),
                sun_direction: Vec3::new(300.0, 100.0, 500.0),
                particles: Some(ParticleSetup {
                    kind: ParticleKind::Snow,
                    anchor: EmitAnchor::Camera,
                }),
            },
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Season {
    type Err = SeasonsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SeasonsError::InvalidValue {
                field: "season".into(),
                value: s.into(),
            })
    }
}

/// Terrain texture set
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayers {
    /// Layers weighted by the blend map's R, G and B channels
    pub layers: [&'static str; 3],
    pub blend_map: &'static str,
}

/// Orthographic light volume (width, height, near, far)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoVolume {
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoVolume {
    pub const fn new(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self {
            width,
            height,
            near,
            far,
        }
    }
}

/// Directional light that also casts the tree's shadow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightProfile {
    pub direction: Vec3,
    /// Grey ambient level
    pub ambient: f32,
    /// Grey specular level
    pub specular: f32,
    /// Shadow camera position; it looks at the origin
    pub position: Vec3,
    pub volume: OrthoVolume,
}

/// Where a particle emitter sits each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitAnchor {
    /// Follows the camera
    Camera,
    /// Stays put in world space
    Fixed(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSetup {
    pub kind: ParticleKind,
    pub anchor: EmitAnchor,
}

/// Scene data for one season
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonProfile {
    pub season: Season,
    /// Tree model file
    pub tree: &'static str,
    pub terrain: TerrainLayers,
    /// Cube map base name; faces are `<name>_px.png` and so on
    pub skymap: &'static str,
    pub light: LightProfile,
    pub fog_color: Vec3,
    /// Direction towards the sun for terrain lighting (not normalised)
    pub sun_direction: Vec3,
    pub particles: Option<ParticleSetup>,
}

/// World transform of the terrain
pub fn terrain_transform() -> Transform {
    Transform::from_position(Vec3::new(-600.0, -150.0, -600.0)).with_uniform_scale(5.0)
}

/// World transform of the tree model
pub fn tree_transform() -> Transform {
    Transform::from_position(Vec3::new(0.0, -40.0, 350.0)).with_uniform_scale(25.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_closed() {
        let mut season = Season::Spring;
        let mut visited = Vec::new();
        for _ in 0..4 {
            visited.push(season);
            season = season.next();
        }
        assert_eq!(season, Season::Spring);
        assert_eq!(visited, Season::ALL.to_vec());
    }

    #[test]
    fn parse_names() {
        assert_eq!("winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!("Autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
        assert_eq!(Season::Summer.to_string(), "summer");
    }

    #[test]
    fn particle_effects_per_season() {
        assert_eq!(
            Season::Spring.profile().particles.map(|p| p.kind),
            Some(ParticleKind::Rain)
        );
        assert!(Season::Summer.profile().particles.is_none());

        let autumn = Season::Autumn.profile().particles.unwrap();
        assert_eq!(autumn.kind, ParticleKind::Leaves);
        assert_eq!(autumn.anchor, EmitAnchor::Fixed(Vec3::new(0.0, 50.0, 350.0)));

        let winter = Season::Winter.profile().particles.unwrap();
        assert_eq!(winter.kind, ParticleKind::Snow);
        assert_eq!(winter.anchor, EmitAnchor::Camera);
    }

    #[test]
    fn autumn_light_volume_is_wider() {
        let autumn = Season::Autumn.profile();
        assert_eq!(autumn.light.volume, OrthoVolume::new(400.0, 400.0, -100.0, 100.0));
        assert_eq!(autumn.light.specular, 0.5);
        assert_eq!(autumn.tree, "tree_autumn.m3d");
    }

    #[test]
    fn profiles_carry_their_season() {
        for season in Season::ALL {
            let profile = season.profile();
            assert_eq!(profile.season, season);
            assert!(profile.light.volume.width > 0.0);
            assert!(profile.light.volume.far > profile.light.volume.near);
        }
    }

    #[test]
    fn shared_transforms() {
        let terrain = terrain_transform().to_matrix();
        let corner = terrain.transform_point3(Vec3::new(256.0, 0.0, 256.0));
        assert!((corner - Vec3::new(680.0, -150.0, 680.0)).length() < 1e-3);

        let tree = tree_transform();
        assert_eq!(tree.scale, Vec3::splat(25.0));
        assert_eq!(tree.position, Vec3::new(0.0, -40.0, 350.0));
    }
}
