//! Inspect command - Show the sub-template tree of a template.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tmpl_core::Template;

use super::loader_from;

#[derive(Args)]
pub struct InspectArgs {
    /// Template file to inspect
    file: PathBuf,

    /// Template config file (.toml, .yaml or .yml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the tree as JSON
    #[arg(long)]
    json: bool,
}

/// Serializable view of one template node.
#[derive(Debug, Serialize)]
struct Outline {
    name: Option<String>,
    variables: Vec<String>,
    sub_templates: Vec<Outline>,
}

impl Outline {
    fn of(template: &Template) -> Self {
        Self {
            name: template.name().map(str::to_string),
            variables: template.variables().map(str::to_string).collect(),
            sub_templates: template
                .sub_template_names()
                .filter_map(|name| template.sub_template(name).ok())
                .map(Outline::of)
                .collect(),
        }
    }

    fn write_tree(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let label = self.name.as_deref().unwrap_or("(root)");
        out.push_str(&format!("{}{}", indent, label));
        if !self.variables.is_empty() {
            out.push_str(&format!(" [{}]", self.variables.join(", ")));
        }
        out.push('\n');

        for child in &self.sub_templates {
            child.write_tree(depth + 1, out);
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let loader = loader_from(args.config.as_ref())?;
    let template = loader
        .load_file(&args.file)
        .with_context(|| format!("Failed to load template {}", args.file.display()))?;

    let outline = Outline::of(&template);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
    } else {
        let mut tree = String::new();
        outline.write_tree(0, &mut tree);
        print!("{}", tree);
    }

    Ok(())
}
