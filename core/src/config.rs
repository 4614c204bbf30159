use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Nominal flat-top hex pitch in meters: `horizontal` is the hex width,
/// `vertical` the row-to-row height.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self {
            horizontal: 316.0,
            vertical: 274.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborConfig {
    pub spacing: GridSpacing,
    /// Relative half-width of each accepted distance band.
    pub tolerance: f64,
    /// Spatial hash bucket edge, in the same units as the centroids (degrees).
    pub bucket_size: f64,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            spacing: GridSpacing::default(),
            tolerance: 0.20,
            bucket_size: 0.01,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f64,
    /// Fraction of the data extent added on each side of both axes.
    pub padding: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            padding: 0.04,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Feature property holding the per-cell count.
    pub count_field: String,
    /// Initial mine threshold.
    pub threshold: f64,
    pub neighbors: NeighborConfig,
    pub view: ViewConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            count_field: "NUMPOINTS".into(),
            threshold: 15.0,
            neighbors: NeighborConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
            ConfigError::Invalid { field, reason }
        }

        let positive = |v: f64| v.is_finite() && v > 0.0;

        if self.count_field.is_empty() {
            return Err(invalid("count_field", "must not be empty"));
        }
        if !self.threshold.is_finite() {
            return Err(invalid("threshold", "must be finite"));
        }
        if !positive(self.neighbors.spacing.horizontal) {
            return Err(invalid("neighbors.spacing.horizontal", "must be positive"));
        }
        if !positive(self.neighbors.spacing.vertical) {
            return Err(invalid("neighbors.spacing.vertical", "must be positive"));
        }
        if !(self.neighbors.tolerance > 0.0 && self.neighbors.tolerance < 1.0) {
            return Err(invalid("neighbors.tolerance", "must lie in (0, 1)"));
        }
        if !positive(self.neighbors.bucket_size) {
            return Err(invalid("neighbors.bucket_size", "must be positive"));
        }
        if !positive(self.view.width) {
            return Err(invalid("view.width", "must be positive"));
        }
        if !(self.view.padding.is_finite() && self.view.padding >= 0.0) {
            return Err(invalid("view.padding", "must be zero or positive"));
        }
        Ok(())
    }
}
