//! Seasons Runtime - frame loop building blocks
//!
//! - `GameClock` - per-frame delta and scene time
//! - `InputState` - keyboard, mouse button, mouse motion and wheel tracking
//! - `Season` / `SeasonProfile` - the four scene states and their data
//! - `SeasonDirector` - strict hand-off between season states
//! - `SceneFlags` - pause / minimise / resize gating

mod clock;
mod input;
mod season;
mod state;

pub use clock::GameClock;
pub use input::InputState;
pub use season::{
    terrain_transform, tree_transform, EmitAnchor, LightProfile, OrthoVolume, ParticleSetup,
    Season, SeasonProfile, TerrainLayers, HEIGHTMAP, SKY_SCALE, TERRAIN_SPEC_MAP,
};
pub use state::{FrameOutcome, SceneFlags, SeasonDirector};
