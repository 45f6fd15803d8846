//! Template loading functionality.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::TemplateConfig;
use crate::error::{TemplateError, TemplateResult};
use crate::markers::Syntax;
use crate::template::Template;

/// Template loader.
///
/// Compiles the marker patterns of its configuration once and shares them
/// with every template it loads.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    config: TemplateConfig,
    syntax: Arc<Syntax>,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(config: TemplateConfig) -> TemplateResult<Self> {
        let syntax = Arc::new(Syntax::new(config.markers.clone())?);
        Ok(Self { config, syntax })
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Parse a root template from a string.
    pub fn load_str(&self, contents: &str) -> TemplateResult<Template> {
        Template::build(
            None,
            contents,
            Arc::clone(&self.syntax),
            self.config.missing_variable_policy,
        )
    }

    /// Read and parse a root template file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> TemplateResult<Template> {
        let path = path.as_ref();
        // Paths pasted from other tools often carry a trailing newline.
        let file = match path.to_str() {
            Some(s) => Path::new(s.trim()),
            None => path,
        };

        if file.as_os_str().is_empty() || !file.exists() {
            return Err(TemplateError::InvalidInput(format!(
                "File \"{}\" not found",
                file.display()
            )));
        }

        debug!("Loading template from {:?}", file);
        let contents = fs::read_to_string(file).map_err(|e| {
            TemplateError::InvalidInput(format!(
                "Cannot read file \"{}\": {}",
                file.display(),
                e
            ))
        })?;

        let template = self.load_str(&contents)?;
        info!(
            "Loaded template {:?} ({} variables, {} sub templates)",
            file,
            template.variables().count(),
            template.sub_template_names().count()
        );
        Ok(template)
    }
}
