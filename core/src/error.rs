use thiserror::Error;

use crate::CellId;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid cell id {0}")]
    InvalidCell(CellId),
}

pub type Result<T, E = GameError> = core::result::Result<T, E>;

/// Failure to turn the polygon collection into a cell registry.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Malformed GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON has no features")]
    NoFeatures,
    #[error("Feature {index} has an unsupported geometry type")]
    UnsupportedGeometry { index: usize },
    #[error("Feature {index} has an empty outer ring")]
    EmptyRing { index: usize },
    #[error("Feature {index} has a position with fewer than two coordinates")]
    InvalidPosition { index: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
