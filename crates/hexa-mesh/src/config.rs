//! Mesher configuration
//!
//! Settings that apply to every meshing pass, independent of the shape being
//! meshed. Stored on disk as RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SMOOTHING_ANGLE;

/// Error type for loading and saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MesherConfig {
    /// Dihedral angle threshold for smoothing groups, in degrees
    pub smoothing_angle: f64,
    /// Compute smoothing groups after generation
    pub auto_smooth: bool,
    /// Warn about blocks whose corner ordering is inverted
    pub check_orientation: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            smoothing_angle: DEFAULT_SMOOTHING_ANGLE,
            auto_smooth: true,
            check_orientation: true,
        }
    }
}

impl MesherConfig {
    pub fn with_smoothing_angle(mut self, degrees: f64) -> Self {
        self.smoothing_angle = degrees;
        self
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MesherConfig::default();
        assert_eq!(config.smoothing_angle, 60.0);
        assert!(config.auto_smooth);
        assert!(config.check_orientation);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = MesherConfig::from_ron_str("(smoothing_angle: 30.0)").unwrap();
        assert_eq!(config.smoothing_angle, 30.0);
        assert!(config.auto_smooth);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesher.ron");
        let config = MesherConfig {
            auto_smooth: false,
            ..MesherConfig::default().with_smoothing_angle(45.0)
        };
        config.save(&path).unwrap();
        assert_eq!(MesherConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MesherConfig::load(dir.path().join("missing.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_ron() {
        let err = MesherConfig::from_ron_str("(smoothing_angle: \"steep\")").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize(_)));
    }
}
