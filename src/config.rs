// ⚙️ Configuration - training hyperparameters + storage location
// Loaded from an optional JSON file, then overridden by CLI flags.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hyperparameters for fitting the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Hard cap on gradient-descent updates
    pub max_iterations: usize,
    /// Gradient-descent step size
    pub learning_rate: f64,
    /// Stop once every gradient component is below this
    pub tolerance: f64,
    /// Inverse L2 strength (C); larger means weaker regularization
    pub regularization: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            learning_rate: 1.0,
            tolerance: 1e-4,
            regularization: 1.0,
        }
    }
}

impl TrainingConfig {
    /// Describe the first unusable setting, if any
    pub fn problem(&self) -> Option<String> {
        if self.max_iterations == 0 {
            return Some("max_iterations must be at least 1".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Some(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Some(format!("tolerance must be non-negative, got {}", self.tolerance));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Some(format!(
                "regularization must be positive, got {}",
                self.regularization
            ));
        }
        None
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_server_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Application-wide settings shared by the CLI, TUI and server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one `<key>_transactions.csv` per user
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub training: TrainingConfig,

    /// Listen address for the web server
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            training: TrainingConfig::default(),
            server_addr: default_server_addr(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
