//! Seasons Demo - seasonal terrain and weather scene
//!
//! This crate provides the `SeasonsApp` application handler for the
//! windowed demo and `capture` for offscreen rendering. Both drive the
//! same `Scene`.

mod app;
pub mod capture;
mod rig;
pub mod scene;
pub mod season_state;
pub mod weather;
pub mod world;

pub use app::SeasonsApp;
pub use capture::capture;
pub use rig::CameraRig;
pub use scene::Scene;
pub use season_state::SeasonState;
pub use weather::Weather;
pub use world::SeasonWorld;
