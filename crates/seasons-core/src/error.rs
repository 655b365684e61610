//! Error types for Seasons

use thiserror::Error;

/// The main error type for Seasons operations
#[derive(Debug, Error)]
pub enum SeasonsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Heightmap error: {0}")]
    HeightmapError(String),

    #[error("Model error in '{path}': {message}")]
    ModelError { path: String, message: String },

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Particle error: {0}")]
    ParticleError(String),

    #[error("State error: {0}")]
    StateError(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl SeasonsError {
    pub fn model(path: impl Into<String>, message: impl Into<String>) -> Self {
        SeasonsError::ModelError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        SeasonsError::FileRead {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Seasons operations
pub type Result<T> = std::result::Result<T, SeasonsError>;

impl From<toml::de::Error> for SeasonsError {
    fn from(err: toml::de::Error) -> Self {
        SeasonsError::TomlParseError(err.to_string())
    }
}
