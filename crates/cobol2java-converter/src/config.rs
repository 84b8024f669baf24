//! Configuration for the conversion pipeline
//!
//! Every field has a default, so a TOML file only needs the settings it
//! changes.

use crate::generator::GenerationParams;
use crate::sanitizer::DEFAULT_SKIP_PHRASES;
use cobol2java_core::naming::is_java_identifier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for cobol2java_core::Cobol2JavaError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::InvalidValue { field, message } => Self::configuration_with_field(message, field),
            other => Self::configuration(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Name of the class generated on the rule-based path
    pub class_name: String,

    /// Name of the placeholder method in that class
    pub method_name: String,

    /// Hard cap on tokens the generator may produce
    pub max_tokens: u32,

    /// Sampling temperature handed to the generator
    pub temperature: f32,

    /// Sanitized responses shorter than this (in characters) are rejected
    pub min_candidate_length: usize,

    /// Responses containing any of these (case-insensitive) are rejected
    pub low_quality_markers: Vec<String>,

    /// Lines containing any of these (case-insensitive) are dropped from responses
    pub skip_phrases: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            class_name: "ConvertedCobol".to_string(),
            method_name: "processData".to_string(),
            max_tokens: 600,
            temperature: 0.1,
            min_candidate_length: 50,
            low_quality_markers: vec!["fibonacci".to_string()],
            skip_phrases: DEFAULT_SKIP_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file {:?}: {}", path.as_ref(), e)))?;

        content.parse()
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(format!("Failed to serialize TOML: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_java_identifier(&self.class_name) {
            return Err(ConfigError::invalid("class_name", format!("'{}' is not a Java identifier", self.class_name)));
        }

        if !is_java_identifier(&self.method_name) {
            return Err(ConfigError::invalid("method_name", format!("'{}' is not a Java identifier", self.method_name)));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::invalid("max_tokens", "must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid("temperature", format!("{} is outside 0.0..=2.0", self.temperature)));
        }

        if self.low_quality_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::invalid("low_quality_markers", "markers must not be empty"));
        }

        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl FromStr for ConverterConfig {
    type Err = ConfigError;

    /// Parse and validate configuration from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation_params(), GenerationParams { max_tokens: 600, temperature: 0.1 });
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConverterConfig = "class_name = \"Payroll\"\nmax_tokens = 1024\n".parse().unwrap();
        assert_eq!(config.class_name, "Payroll");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.method_name, "processData");
        assert_eq!(config.min_candidate_length, 50);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = "temperature = 3.5".parse::<ConverterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "temperature"));

        let err = "class_name = \"Not-Java\"".parse::<ConverterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "class_name"));

        let err = "max_tokens = 0".parse::<ConverterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "max_tokens"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = "class_name = ".parse::<ConverterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let mut config = ConverterConfig::default();
        config.low_quality_markers.push("lorem ipsum".to_string());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes()).unwrap();

        let loaded = ConverterConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = ConverterConfig::from_file("/nonexistent/cobol2java.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
