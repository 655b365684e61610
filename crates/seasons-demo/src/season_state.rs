//! Season states. Each variant owns a complete, independent scene plus the
//! weather only that season has.

use seasons_core::{DemoConfig, SeasonsError};
use seasons_render::{FrameTarget, Gpu, RenderError};
use seasons_runtime::{GameClock, InputState, Season};

use crate::weather::Weather;
use crate::world::SeasonWorld;

/// Light rain falling around the camera
pub struct Spring {
    world: SeasonWorld,
    rain: Weather,
}

/// Clear weather, no particles
pub struct Summer {
    world: SeasonWorld,
}

/// Leaves drifting from above the tree
pub struct Autumn {
    world: SeasonWorld,
    leaves: Weather,
}

/// Heavy snow around the camera
pub struct Winter {
    world: SeasonWorld,
    snow: Weather,
}

/// The active season. Dropping it releases every resource it built.
pub enum SeasonState {
    Spring(Box<Spring>),
    Summer(Box<Summer>),
    Autumn(Box<Autumn>),
    Winter(Box<Winter>),
}

impl SeasonState {
    /// Build the scene for `season`
    pub fn initialise(gpu: Gpu<'_>, season: Season, config: &DemoConfig) -> Result<Self, RenderError> {
        let world = SeasonWorld::initialise(gpu, season, config)?;
        Ok(match season {
            Season::Spring => SeasonState::Spring(Box::new(Spring {
                rain: weather(gpu, season, config)?,
                world,
            })),
            Season::Summer => SeasonState::Summer(Box::new(Summer { world })),
            Season::Autumn => SeasonState::Autumn(Box::new(Autumn {
                leaves: weather(gpu, season, config)?,
                world,
            })),
            Season::Winter => SeasonState::Winter(Box::new(Winter {
                snow: weather(gpu, season, config)?,
                world,
            })),
        })
    }

    /// Advance one frame. Returns `true` once the season is over.
    pub fn update(&mut self, queue: &wgpu::Queue, input: &InputState, clock: &GameClock) -> bool {
        let (world, weather) = self.parts();
        world.update(queue, input, clock, weather)
    }

    pub fn render(&mut self, gpu: Gpu<'_>, target: FrameTarget<'_>) -> Result<(), RenderError> {
        let (world, weather) = self.parts();
        world.render(gpu, target, weather)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.parts().0.set_aspect(aspect);
    }

    pub fn season(&self) -> Season {
        match self {
            SeasonState::Spring(_) => Season::Spring,
            SeasonState::Summer(_) => Season::Summer,
            SeasonState::Autumn(_) => Season::Autumn,
            SeasonState::Winter(_) => Season::Winter,
        }
    }

    fn parts(&mut self) -> (&mut SeasonWorld, Option<&mut Weather>) {
        match self {
            SeasonState::Spring(s) => (&mut s.world, Some(&mut s.rain)),
            SeasonState::Summer(s) => (&mut s.world, None),
            SeasonState::Autumn(s) => (&mut s.world, Some(&mut s.leaves)),
            SeasonState::Winter(s) => (&mut s.world, Some(&mut s.snow)),
        }
    }
}

/// The particle weather of a season that has one
fn weather(gpu: Gpu<'_>, season: Season, config: &DemoConfig) -> Result<Weather, RenderError> {
    let setup = season
        .profile()
        .particles
        .ok_or_else(|| SeasonsError::StateError(format!("{season} has no weather")))?;
    Weather::new(gpu, setup, config)
}

#[cfg(test)]
mod tests {
    use seasons_particles::ParticleKind;
    use seasons_runtime::Season;

    #[test]
    fn only_summer_builds_without_weather() {
        let kinds = Season::ALL.map(|season| season.profile().particles.map(|p| p.kind));
        assert_eq!(
            kinds,
            [
                Some(ParticleKind::Rain),
                None,
                Some(ParticleKind::Leaves),
                Some(ParticleKind::Snow),
            ]
        );
    }
}
