//! Spline settings, loadable from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Closest point search settings of the native service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Distance samples per knot span before refinement.
    pub samples_per_span: usize,
    /// Iteration cap for each argmin solver run.
    pub max_iters: u64,
    /// Stream solver iterations to the terminal.
    pub trace_solver: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            samples_per_span: 16,
            max_iters: 100,
            trace_solver: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Candidate fits tried by the control point reduction.
    pub max_iterations: usize,
    /// Error samples per knot span.
    pub samples_per_span: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            samples_per_span: 8,
        }
    }
}

/// Everything needed to build a [`crate::Spline`].
///
/// ```toml
/// dimension = 3
/// curve_order = 4
/// geometric_resolution = 0.001
///
/// [search]
/// trace_solver = true
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    pub dimension: usize,
    pub curve_order: usize,
    pub geometric_resolution: f64,
    pub search: SearchConfig,
    pub simplify: SimplifyConfig,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            dimension: 2,
            curve_order: 3,
            geometric_resolution: 0.01,
            search: SearchConfig::default(),
            simplify: SimplifyConfig::default(),
        }
    }
}

impl SplineConfig {
    /// Parses and validates, missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        log::debug!("loaded spline config {config:?}");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.dimension) {
            return Err(ConfigError::Invalid(format!(
                "dimension must be 2 or 3, got {}",
                self.dimension
            )));
        }
        if self.curve_order < 2 {
            return Err(ConfigError::Invalid(format!(
                "curve_order must be at least 2, got {}",
                self.curve_order
            )));
        }
        if !(self.geometric_resolution.is_finite() && self.geometric_resolution > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "geometric_resolution must be positive, got {}",
                self.geometric_resolution
            )));
        }
        if self.search.samples_per_span == 0 || self.simplify.samples_per_span == 0 {
            return Err(ConfigError::Invalid(
                "samples_per_span must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
