//! Seasons Core - Foundational types for the Seasons demo
//!
//! This crate provides the types that all other Seasons crates depend on:
//! - `Transform` - scale, rotation and translation of scene objects
//! - `DemoConfig` - TOML configuration with defaults
//! - Error types and Result alias

mod config;
mod error;
mod types;

pub use config::{CameraConfig, DemoConfig, ParticleLimits, WindowConfig};
pub use error::{Result, SeasonsError};
pub use types::Transform;

pub use glam;
