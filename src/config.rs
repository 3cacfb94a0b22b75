//! Editor configuration.
//!
//! The whole file is optional: every field has a default, so an empty YAML
//! document (or no file at all) yields a usable configuration.

use crate::propagation::{PropagationModel, DEFAULT_PATH_LOSS_EXPONENT};
use crate::utils::validation::is_valid_cidr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_NETWORK_NAME: &str = "netflux5g";
pub const DEFAULT_IP_BASE: &str = "10.0.0.0/8";
pub const DEFAULT_CORE_STARTUP_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub general: GeneralConfig,
    pub export: ExportSettings,
}

impl EditorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if level.trim().is_empty() {
                return Err(ValidationError::InvalidGeneral(
                    "log_level cannot be empty".to_string(),
                ));
            }
        }
        self.export.validate()
    }

    /// Default log filter. `debug` wins over an explicit level.
    pub fn log_filter(&self) -> &str {
        if self.general.debug {
            "debug"
        } else {
            self.general.log_level.as_deref().unwrap_or("info")
        }
    }
}

/// Settings that are not tied to export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Verbose diagnostics.
    pub debug: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Knobs of the script generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Docker network the 5G containers share.
    pub network_name: String,
    pub ip_base: String,
    pub propagation_model: PropagationModel,
    pub path_loss_exponent: f64,
    /// Pause between starting the core functions and the gNBs, and between
    /// the gNBs and the UEs.
    #[serde(with = "humantime_serde")]
    pub core_startup_delay: Duration,
    pub plot_graph: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            ip_base: DEFAULT_IP_BASE.to_string(),
            propagation_model: PropagationModel::default(),
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            core_startup_delay: DEFAULT_CORE_STARTUP_DELAY,
            plot_graph: false,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.network_name.trim().is_empty() {
            return Err(ValidationError::InvalidExport(
                "network_name cannot be empty".to_string(),
            ));
        }
        if !is_valid_cidr(&self.ip_base) {
            return Err(ValidationError::InvalidExport(format!(
                "ip_base '{}' is not an IPv4 network in CIDR notation",
                self.ip_base
            )));
        }
        if self.path_loss_exponent <= 0.0 || !self.path_loss_exponent.is_finite() {
            return Err(ValidationError::InvalidExport(format!(
                "path_loss_exponent must be positive, got {}",
                self.path_loss_exponent
            )));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid export configuration: {0}")]
    InvalidExport(String),
}
