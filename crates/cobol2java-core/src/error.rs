//! Error handling for COBOL to Java conversion
//!
//! The conversion itself never fails: malformed source lines fall through to
//! comments and generator trouble routes to the rule-based path. The errors
//! here cover the fallible edges around it: compiling the pattern catalogs
//! and loading configuration.

use thiserror::Error;

/// Main error type for cobol2java operations
#[derive(Error, Debug)]
pub enum Cobol2JavaError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// A pattern in one of the rule catalogs failed to compile
    #[error("Pattern error in rule '{rule}': {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

impl Cobol2JavaError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error naming the offending field
    pub fn configuration_with_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Wrap a regex compilation failure for the named rule
    pub fn pattern<R: Into<String>>(rule: R, source: regex::Error) -> Self {
        Self::Pattern {
            rule: rule.into(),
            source,
        }
    }
}

/// Result type for cobol2java operations
pub type Cobol2JavaResult<T> = Result<T, Cobol2JavaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = Cobol2JavaError::configuration_with_field("must be positive", "max_tokens");
        assert_eq!(error.to_string(), "Configuration error: must be positive");

        match error {
            Cobol2JavaError::Configuration { field, .. } => assert_eq!(field.as_deref(), Some("max_tokens")),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_pattern_error_names_rule() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let error = Cobol2JavaError::pattern("numeric-declaration", source);
        assert!(error.to_string().contains("numeric-declaration"));
    }
}
