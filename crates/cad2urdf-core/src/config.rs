//! Export configuration
//!
//! Stored as RON. Every field has a default so a partial file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::Units;

/// Fractional digits an f64 can still carry
pub const MAX_PRECISION: u32 = 15;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one export run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Identifier of the root body; also the component name that marks it
    pub root_body: String,
    /// CAD length units per meter
    pub length_scale: f64,
    /// Fractional digits kept for axes, limits and positions
    pub precision: u32,
    /// Overrides the robot name derived from the root component
    pub robot_name: Option<String>,
    /// Effort limit written for every movable joint
    pub effort: f64,
    /// Velocity limit written for every movable joint
    pub velocity: f64,
    /// Scale applied to mesh references
    pub mesh_scale: f64,
    /// Emit a transmission block per movable joint
    pub write_transmissions: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_body: "base_link".to_string(),
            length_scale: 100.0,
            precision: 6,
            robot_name: None,
            effort: 100.0,
            velocity: 100.0,
            mesh_scale: 0.001,
            write_transmissions: true,
        }
    }
}

impl ExportConfig {
    /// Parse from RON text and validate
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Pretty RON representation
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, self.to_ron()?).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_body.trim().is_empty() {
            return Err(ConfigError::Invalid("root_body must not be empty".into()));
        }
        if !self.length_scale.is_finite() || self.length_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "length_scale must be positive and finite, got {}",
                self.length_scale
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        Ok(())
    }

    /// Unit conversion derived from this configuration
    pub fn units(&self) -> Units {
        Units {
            length_scale: self.length_scale,
            precision: self.precision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = ExportConfig::from_ron(r#"(root_body: "chassis", effort: 25.0)"#).unwrap();
        assert_eq!(config.root_body, "chassis");
        assert_eq!(config.effort, 25.0);
        assert_eq!(config.length_scale, 100.0);
        assert_eq!(config.precision, 6);
        assert!(config.write_transmissions);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = ExportConfig {
            robot_name: Some("rover".into()),
            ..ExportConfig::default()
        };
        let text = config.to_ron().unwrap();
        assert_eq!(ExportConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            ExportConfig::from_ron(r#"(length_scale: 0.0)"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ExportConfig::from_ron(r#"(root_body: "  ")"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ExportConfig::from_ron("(root_body: 3)"),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_rejects_unbounded_precision_and_scale() {
        let config = ExportConfig {
            precision: 400,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ExportConfig {
            precision: MAX_PRECISION,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let config = ExportConfig {
            length_scale: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
