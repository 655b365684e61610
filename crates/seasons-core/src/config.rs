//! Demo configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable configuration. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SeasonsError};

/// Top-level demo configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Directory that asset paths are resolved against
    pub assets_dir: PathBuf,
    pub window: WindowConfig,
    /// Edge length of the square shadow depth map
    pub shadow_map_size: u32,
    pub particles: ParticleLimits,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

/// Capacity bound for each particle effect
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleLimits {
    pub rain_max: u32,
    pub leaves_max: u32,
    pub snow_max: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// World units per second
    pub move_speed: f32,
    /// Radians per second
    pub rotate_speed: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            window: WindowConfig::default(),
            shadow_map_size: 1024,
            particles: ParticleLimits::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Seasons".to_string(),
        }
    }
}

impl Default for ParticleLimits {
    fn default() -> Self {
        Self {
            rain_max: 10_000,
            leaves_max: 1_000,
            snow_max: 100_000,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 50.0,
            rotate_speed: 1.5,
        }
    }
}

impl DemoConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: DemoConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| SeasonsError::file_read(path.display().to_string(), e))?;
        Self::from_toml_str(&source)
    }

    /// Resolve an asset-relative path
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }

    fn validate(&self) -> Result<()> {
        if self.shadow_map_size == 0 {
            return Err(SeasonsError::InvalidValue {
                field: "shadow_map_size".into(),
                value: "0".into(),
            });
        }
        for (field, value) in [
            ("particles.rain_max", self.particles.rain_max),
            ("particles.leaves_max", self.particles.leaves_max),
            ("particles.snow_max", self.particles.snow_max),
        ] {
            if value == 0 {
                return Err(SeasonsError::InvalidValue {
                    field: field.into(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DemoConfig::from_toml_str("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.shadow_map_size, 1024);
        assert_eq!(config.particles.snow_max, 100_000);
        assert_eq!(config.particles.leaves_max, 1_000);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = DemoConfig::from_toml_str(
            r#"
            assets_dir = "data"

            [window]
            width = 800

            [particles]
            snow_max = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.assets_dir, PathBuf::from("data"));
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.particles.snow_max, 5000);
        assert_eq!(config.particles.rain_max, 10_000);
        assert_eq!(config.asset_path("heightmap3.raw"), PathBuf::from("data/heightmap3.raw"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = DemoConfig::from_toml_str("[particles]\nleaves_max = 0\n").unwrap_err();
        assert!(matches!(err, SeasonsError::InvalidValue { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DemoConfig::from_toml_str("shadow_map_size = \"big\"").unwrap_err();
        assert!(matches!(err, SeasonsError::TomlParseError(_)));
    }
}
