//! Template configuration.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::markers::MarkerSet;

/// What `render` does with a declared placeholder that has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVariablePolicy {
    /// Fail with [`TemplateError::UnboundVariable`].
    #[default]
    Fail,
    /// Substitute an empty string.
    Empty,
    /// Leave the placeholder marker in the output untouched.
    Literal,
}

impl fmt::Display for MissingVariablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fail => "fail",
            Self::Empty => "empty",
            Self::Literal => "literal",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MissingVariablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "empty" => Ok(Self::Empty),
            "literal" => Ok(Self::Literal),
            other => Err(format!(
                "unknown missing variable policy '{}' (expected fail, empty or literal)",
                other
            )),
        }
    }
}

/// Options applied when parsing a template tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Marker literals of the template grammar.
    pub markers: MarkerSet,
    /// Behaviour for unbound placeholders at render time.
    pub missing_variable_policy: MissingVariablePolicy,
}

impl TemplateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_missing_variable_policy(mut self, policy: MissingVariablePolicy) -> Self {
        self.missing_variable_policy = policy;
        self
    }

    /// Load a configuration from a `.toml`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let path = path.as_ref();
        debug!("Loading template config from {:?}", path);

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path)?;
        let config: Self = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => {
                return Err(TemplateError::InvalidConfig {
                    path: path.to_path_buf(),
                    message: format!("unsupported config format '{}'", extension),
                })
            }
        };

        config.markers.validate()?;
        Ok(config)
    }
}
