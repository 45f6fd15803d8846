//! CLI command definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use tmpl_core::{Template, TemplateConfig, TemplateLoader};

pub mod inspect;
pub mod render;

/// tmpl - marker-driven text templates
#[derive(Parser)]
#[command(name = "tmpl")]
#[command(version, about = "tmpl - render marker-driven text templates")]
#[command(long_about = r#"
tmpl renders documents annotated with placeholders (@-{name}-@) and
named sub-templates declared inside <!--@@ ... @@--> directives.

COMMANDS:
  render   → Bind variables and render a template (or one of its sub-templates)
  inspect  → Show the sub-template tree and declared variables

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bind variables and render a template
    Render(render::RenderArgs),

    /// Show the sub-template tree of a template
    Inspect(inspect::InspectArgs),
}

/// Build a loader from an optional config file.
pub(crate) fn loader_from(config: Option<&PathBuf>) -> Result<TemplateLoader> {
    let config = match config {
        Some(path) => {
            debug!("Using config {:?}", path);
            TemplateConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => TemplateConfig::default(),
    };

    Ok(TemplateLoader::new(config)?)
}

/// Walk a dot-separated sub-template path such as `table.row`.
pub(crate) fn descend<'t>(template: &'t mut Template, path: &str) -> Result<&'t mut Template> {
    let mut current = template;
    for name in path.split('.').filter(|s| !s.is_empty()) {
        current = current
            .get_sub_template(name)
            .with_context(|| format!("Cannot resolve sub template path '{}'", path))?;
    }
    Ok(current)
}
