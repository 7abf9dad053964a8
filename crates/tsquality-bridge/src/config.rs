//! Configuration for tsquality
//!
//! Loaded from TOML (or JSON) with defaults for every field:
//!
//! ```toml
//! [bridge]
//! separator = ","
//! header = true
//!
//! [module]
//! path = "/opt/tsquality/libanalysis.so"
//! allocate_symbol = "malloc"
//! release_symbol = "free"
//! analyze_symbol = "process"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "tsquality.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How input text is interpreted
    pub bridge: BridgeConfig,
    /// Where the analysis module comes from
    pub module: ModuleConfig,
}

/// Input interpretation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Field separator; must be a single ASCII character
    pub separator: char,
    /// Whether the first line of every file is a header row
    pub header: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            header: true,
        }
    }
}

impl BridgeConfig {
    /// Separator as the byte handed to the scanner and the module
    ///
    /// Fails for anything that is not a single ASCII byte, and for line
    /// terminators.
    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        if !self.separator.is_ascii() {
            return Err(ConfigError::InvalidSeparator(format!(
                "{:?} is not a single byte",
                self.separator
            )));
        }
        if matches!(self.separator, '\n' | '\r') {
            return Err(ConfigError::InvalidSeparator(
                "line terminators cannot separate fields".to_string(),
            ));
        }
        Ok(self.separator as u8)
    }

    /// Check the separator is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.separator_byte().map(|_| ())
    }
}

/// Analysis module location and exported symbol names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Path to the shared library
    pub path: Option<PathBuf>,
    pub allocate_symbol: String,
    pub release_symbol: String,
    pub analyze_symbol: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            path: None,
            allocate_symbol: "malloc".to_string(),
            release_symbol: "free".to_string(),
            analyze_symbol: "process".to_string(),
        }
    }
}

impl ModuleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("allocate_symbol", &self.allocate_symbol),
            ("release_symbol", &self.release_symbol),
            ("analyze_symbol", &self.analyze_symbol),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingSymbol(field.to_string()));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from the standard locations
    ///
    /// Tries `explicit` first, then `./tsquality.toml`, then
    /// `<config dir>/tsquality/config.toml`. Falls back to defaults when no
    /// file exists. An explicit path that does not exist is an error.
    pub fn load_standard(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in standard_paths() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading configuration");
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bridge.validate()?;
        self.module.validate()
    }
}

/// Candidate configuration files in lookup order
pub fn standard_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tsquality").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.bridge.separator, ',');
        assert!(config.bridge.header);
        assert_eq!(config.module.analyze_symbol, "process");
        assert!(config.module.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
[bridge]
separator = ";"

[module]
path = "/tmp/libanalysis.so"
"#,
        )
        .unwrap();

        assert_eq!(config.bridge.separator_byte().unwrap(), b';');
        assert!(config.bridge.header);
        assert_eq!(config.module.path, Some(PathBuf::from("/tmp/libanalysis.so")));
        assert_eq!(config.module.allocate_symbol, "malloc");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = AppConfig::new();
        config.bridge.header = false;
        let toml = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::new();
        let json = config.to_json().unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_separator() {
        let mut config = AppConfig::new();
        config.bridge.separator = '\n';
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSeparator(_))
        ));

        config.bridge.separator = 'é';
        assert!(config.validate().is_err());

        config.bridge.separator = '\t';
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_separator_byte_never_truncates() {
        for separator in ['Ĭ', 'é', '→'] {
            let config = BridgeConfig {
                separator,
                header: true,
            };
            assert!(matches!(
                config.separator_byte(),
                Err(ConfigError::InvalidSeparator(_))
            ));
        }

        let tab = BridgeConfig {
            separator: '\t',
            header: true,
        };
        assert_eq!(tab.separator_byte().unwrap(), b'\t');
    }

    #[test]
    fn test_validate_symbols() {
        let mut config = AppConfig::new();
        config.module.release_symbol = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSymbol(name)) if name == "release_symbol"
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = AppConfig::load_standard(Some(Path::new("/nonexistent/tsquality.toml")));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
