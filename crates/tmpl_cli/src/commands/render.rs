//! Render command - Bind variables and render a template.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::{debug, info};

use tmpl_core::MissingVariablePolicy;

use super::{descend, loader_from};

#[derive(Args)]
pub struct RenderArgs {
    /// Template file to render
    file: PathBuf,

    /// Bind a variable (repeatable), e.g. --set title=Home
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_binding)]
    set: Vec<(String, String)>,

    /// Variables file (.json, .yaml, .yml or .toml) with a flat name/value map
    #[arg(long, value_name = "FILE")]
    vars: Option<PathBuf>,

    /// Dot-separated sub template to render instead of the root, e.g. table.row
    #[arg(long, value_name = "PATH")]
    sub: Option<String>,

    /// What to do with unbound variables: fail, empty or literal
    #[arg(long)]
    policy: Option<MissingVariablePolicy>,

    /// Template config file (.toml, .yaml or .yml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let loader = loader_from(args.config.as_ref())?;
    let mut template = loader
        .load_file(&args.file)
        .with_context(|| format!("Failed to load template {}", args.file.display()))?;

    let target = descend(&mut template, args.sub.as_deref().unwrap_or(""))?;
    if let Some(policy) = args.policy {
        target.set_missing_variable_policy(policy);
    }

    let mut bindings = match &args.vars {
        Some(path) => read_vars_file(path)?,
        None => BTreeMap::new(),
    };
    bindings.extend(args.set);

    for (name, value) in bindings {
        debug!("Binding {}", name);
        target.set_variable(&name, value)?;
    }

    let rendered = target.render()?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Rendered {} to {}", args.file.display(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Parse a `NAME=VALUE` pair. The value may itself contain `=`.
fn parse_binding(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid binding '{}', expected NAME=VALUE", s)),
    }
}

/// Read a flat map of variable values; scalars are converted to strings.
fn read_vars_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let value: Value = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => bail!("Unsupported variables file format '{}'", other),
    };

    let Value::Object(map) = value else {
        bail!("Variables file {} must contain a map", path.display());
    };

    let mut vars = BTreeMap::new();
    for (name, value) in map {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                bail!("Variable '{}' in {} must be a scalar", name, path.display())
            }
        };
        vars.insert(name, value);
    }

    Ok(vars)
}
