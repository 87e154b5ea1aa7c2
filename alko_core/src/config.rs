//! Configuration file support for Alkomat.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/alkomat/config.toml`.
//! Every field has a default, so a missing file or a partial file is fine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub presets: PresetsConfig,
}

/// Constants of the estimation model
///
/// Passed into every engine stage so tests can substitute them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Ethanol density (g/mL)
    #[serde(default = "default_ethanol_density")]
    pub ethanol_density_g_per_ml: f64,

    #[serde(default = "default_male_ratio")]
    pub male_ratio: f64,

    #[serde(default = "default_female_ratio")]
    pub female_ratio: f64,

    /// Elimination in percent per hour (0.015 % = 0.15 ‰)
    #[serde(default = "default_elimination_rate")]
    pub elimination_rate_pct_per_hour: f64,

    /// Status threshold in per-mille
    #[serde(default = "default_threshold")]
    pub threshold_promiles: f64,

    #[serde(default = "default_min_weight")]
    pub min_weight_kg: f64,

    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,

    #[serde(default = "default_min_horizon_hours")]
    pub min_horizon_hours: u32,

    /// Hours simulated past the end of drinking
    #[serde(default = "default_tail_hours")]
    pub tail_hours: u32,

    #[serde(default = "default_max_horizon_hours")]
    pub max_horizon_hours: u32,

    /// Decimal places of emitted concentrations
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ethanol_density_g_per_ml: default_ethanol_density(),
            male_ratio: default_male_ratio(),
            female_ratio: default_female_ratio(),
            elimination_rate_pct_per_hour: default_elimination_rate(),
            threshold_promiles: default_threshold(),
            min_weight_kg: default_min_weight(),
            step_minutes: default_step_minutes(),
            min_horizon_hours: default_min_horizon_hours(),
            tail_hours: default_tail_hours(),
            max_horizon_hours: default_max_horizon_hours(),
            precision: default_precision(),
        }
    }
}

impl ModelConfig {
    /// Round a concentration to the configured precision
    ///
    /// Values too large to scale are returned as they are.
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision.min(9) as i32);
        let scaled = value * factor;
        if scaled.is_finite() {
            scaled.round() / factor
        } else {
            value
        }
    }

    /// Check the constants for values the simulator cannot work with
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.ethanol_density_g_per_ml > 0.0) {
            errors.push("ethanol_density_g_per_ml must be positive".to_string());
        }
        if !(self.male_ratio > 0.0) || !(self.female_ratio > 0.0) {
            errors.push("distribution ratios must be positive".to_string());
        }
        if !(self.elimination_rate_pct_per_hour >= 0.0) {
            errors.push("elimination_rate_pct_per_hour must not be negative".to_string());
        }
        if !(self.min_weight_kg > 0.0) {
            errors.push("min_weight_kg must be positive".to_string());
        }
        if self.step_minutes == 0 {
            errors.push("step_minutes must be at least 1".to_string());
        }
        if self.min_horizon_hours > self.max_horizon_hours {
            errors.push(format!(
                "min_horizon_hours ({}) exceeds max_horizon_hours ({})",
                self.min_horizon_hours, self.max_horizon_hours
            ));
        }

        errors
    }
}

/// Custom drink preset definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomPreset {
    pub id: String,
    pub label: String,
    pub volume_ml: f64,
    pub percent: f64,
}

/// Drink presets configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PresetsConfig {
    #[serde(default)]
    pub custom: Vec<CustomPreset>,
}

// Default value functions
fn default_ethanol_density() -> f64 {
    0.789
}

fn default_male_ratio() -> f64 {
    0.68
}

fn default_female_ratio() -> f64 {
    0.55
}

fn default_elimination_rate() -> f64 {
    0.015
}

fn default_threshold() -> f64 {
    0.2
}

fn default_min_weight() -> f64 {
    30.0
}

fn default_step_minutes() -> u32 {
    10
}

fn default_min_horizon_hours() -> u32 {
    6
}

fn default_tail_hours() -> u32 {
    16
}

fn default_max_horizon_hours() -> u32 {
    24
}

fn default_precision() -> u32 {
    3
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("alkomat").join("config.toml")
    }

    /// Validate the whole configuration, failing on the first report
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.model.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(errors.join("; ")))
        }
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}
