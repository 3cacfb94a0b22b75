//! Export engine.
//!
//! Serialises a topology graph into a Mininet-WiFi / Containernet script.
//! [`engine::export`] builds a structured [`TopologyDescription`]; the
//! functions in [`render`] turn it into Python source or dump it as YAML or
//! JSON.

pub mod engine;
pub mod render;
pub mod types;

pub use engine::{export, ExportError};
pub use render::{render_json, render_python, render_yaml};
pub use types::{NetworkInit, NetworkKind, NodeMethod, Section, Statement, TopologyDescription};

use std::fmt;
use std::str::FromStr;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Python,
    Yaml,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Python => "python",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Json => "json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(ExportFormat::Python),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to serialise topology as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to serialise topology as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `description` in `format`.
pub fn render(description: &TopologyDescription, format: ExportFormat) -> Result<String, RenderError> {
    Ok(match format {
        ExportFormat::Python => render_python(description),
        ExportFormat::Yaml => render_yaml(description)?,
        ExportFormat::Json => render_json(description)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("python".parse::<ExportFormat>(), Ok(ExportFormat::Python));
        assert_eq!("YML".parse::<ExportFormat>(), Ok(ExportFormat::Yaml));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::default().to_string(), "python");
    }
}
