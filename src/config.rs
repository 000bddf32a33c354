//! Engine configuration, persisted as TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::set::catalog::DEFAULT_RESOLUTION;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings shared by loading and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grid step for sampled universes. Held fixed across a run so centroids
    /// are reproducible.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Evaluate batches on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Output variable to evaluate when the rule base concludes on several.
    #[serde(default)]
    pub output_variable: Option<String>,
}

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}
fn default_parallel() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            parallel: default_parallel(),
            output_variable: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::Invalid {
                message: format!("resolution must be a positive number, got {}", self.resolution),
            });
        }
        Ok(())
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
