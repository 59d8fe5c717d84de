use crate::access::{BinaryCompare, CompareMode, IgnoreCaseCompare};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Expression layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Cache `[min, max]` bounds on IN lists and push them to the access path
    pub optimize_in: bool,
    /// String collation used by every comparison
    pub collation: Collation,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    Binary,
    IgnoreCase,
}

impl Collation {
    pub fn compare_mode(self) -> Arc<dyn CompareMode> {
        match self {
            Collation::Binary => Arc::new(BinaryCompare),
            Collation::IgnoreCase => Arc::new(IgnoreCaseCompare),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            optimize_in: true,
            collation: Collation::Binary,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ExpressionConfig {
    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExpressionConfig::default();
        assert!(config.optimize_in);
        assert_eq!(config.collation, Collation::Binary);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExpressionConfig::from_toml_str("collation = \"ignore_case\"\n").unwrap();
        assert!(config.optimize_in);
        assert_eq!(config.collation, Collation::IgnoreCase);
        assert_eq!(config.collation.compare_mode().name(), "ignore_case");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "optimize_in = false").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();

        let config = ExpressionConfig::load_from(file.path()).unwrap();
        assert!(!config.optimize_in);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_config() {
        assert!(ExpressionConfig::from_toml_str("optimize_in = \"yes\"").is_err());
        assert!(ExpressionConfig::load_from(Path::new("/nonexistent/vibeexpr.toml")).is_err());
    }
}
