//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while loading, binding or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template input: {0}")]
    InvalidInput(String),

    #[error("Template does not contain variable \"{0}\"")]
    UnknownVariable(String),

    #[error("Sub template \"{0}\" does not exist")]
    UnknownSubTemplate(String),

    #[error("No value set for template variable \"{0}\"")]
    UnboundVariable(String),

    #[error("Invalid marker set: {0}")]
    InvalidMarkers(String),

    #[error("Invalid configuration in {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TemplateError {
    /// The variable or sub-template name this error refers to, if any.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::UnknownVariable(name)
            | Self::UnknownSubTemplate(name)
            | Self::UnboundVariable(name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = TemplateError::UnknownVariable("title".to_string());
        assert_eq!(err.to_string(), "Template does not contain variable \"title\"");
        assert_eq!(err.subject(), Some("title"));

        let err = TemplateError::UnknownSubTemplate("row".to_string());
        assert_eq!(err.to_string(), "Sub template \"row\" does not exist");
    }

    #[test]
    fn test_subject_absent_for_input_errors() {
        let err = TemplateError::InvalidInput("File \"x\" not found".to_string());
        assert!(err.subject().is_none());
    }
}
