//! Decomposition of marker-delimited text into a template node.
//!
//! Parsing runs in three passes over the raw text of one node:
//!
//! 1. Template blocks declared outside any ignore block are registered as
//!    children and removed from the body.
//! 2. Ignore blocks addressed to this node are cut out. Each block's body is
//!    scanned for template declarations, and the block itself is replaced by
//!    the placeholder named in its header (`AS name`) or by nothing.
//! 3. Placeholders remaining in the clean body are collected in
//!    first-occurrence order.
//!
//! Children are parsed recursively with their own name as scope, so an
//! ignore block tagged `BEGIN_IGNORE row` only belongs to the `row` child.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::MissingVariablePolicy;
use crate::error::{TemplateError, TemplateResult};
use crate::markers::Syntax;
use crate::template::Template;

/// Output of parsing one node's raw text.
#[derive(Debug)]
pub(crate) struct ParsedBody {
    pub clean_body: String,
    pub variables: Vec<String>,
    pub children: BTreeMap<String, Template>,
}

pub(crate) struct Parser<'a> {
    syntax: &'a Arc<Syntax>,
    policy: MissingVariablePolicy,
    scope: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(
        syntax: &'a Arc<Syntax>,
        policy: MissingVariablePolicy,
        scope: Option<&'a str>,
    ) -> Self {
        Self {
            syntax,
            policy,
            scope,
        }
    }

    pub fn parse(&self, contents: &str) -> TemplateResult<ParsedBody> {
        if contents.trim().is_empty() {
            return Err(TemplateError::InvalidInput(match self.scope {
                Some(name) => format!("Sub template \"{}\" has empty content", name),
                None => "Cannot parse empty template content".to_string(),
            }));
        }

        let mut children = BTreeMap::new();
        // Top-level templates go first: their bodies may hold ignore blocks
        // tagged for the child, which must not reach this node's ignore scan.
        let reduced = self.read_top_level_templates(contents, &mut children)?;
        let clean_body = self.read_ignore_blocks(&reduced, &mut children)?;
        let variables = self.read_variables(&clean_body);

        Ok(ParsedBody {
            clean_body,
            variables,
            children,
        })
    }

    fn read_ignore_blocks(
        &self,
        text: &str,
        children: &mut BTreeMap<String, Template>,
    ) -> TemplateResult<String> {
        let pattern = self.syntax.ignore_block(self.scope)?;
        let mut clean = String::with_capacity(text.len());
        let mut last = 0;

        for caps in pattern.captures_iter(text) {
            let Some(block) = caps.get(0) else {
                continue;
            };
            let header = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            self.read_template_blocks(body, children)?;

            clean.push_str(&text[last..block.start()]);
            match self.syntax.ignore_target(header) {
                Some(variable) => {
                    debug!("Ignore block replaced by placeholder {}", variable);
                    clean.push_str(&self.syntax.markers().placeholder(variable));
                }
                None => debug!("Ignore block removed"),
            }
            last = block.end();
        }

        clean.push_str(&text[last..]);
        Ok(clean)
    }

    /// Register every template declared in `text` outside nested ignore
    /// blocks and return the spans of the matched blocks.
    fn read_template_blocks(
        &self,
        text: &str,
        children: &mut BTreeMap<String, Template>,
    ) -> TemplateResult<Vec<Range<usize>>> {
        // Declarations inside a nested ignore block belong to the template
        // that block is addressed to, not to this level.
        let nested = self.syntax.ignore_spans(text);
        let stripped = cut_spans(text, nested.clone());
        let mut spans = Vec::new();

        for caps in self.syntax.template_header().captures_iter(&stripped) {
            let name = &caps[1];
            let pattern = self.syntax.template_block(name)?;

            let found = pattern.captures_iter(text).find(|c| {
                c.get(0)
                    .map_or(false, |m| !nested.iter().any(|span| span.contains(&m.start())))
            });
            let Some(found) = found else {
                warn!("Sub template {} has no matching end marker, skipping", name);
                continue;
            };
            let (Some(whole), Some(inner)) = (found.get(0), found.get(1)) else {
                continue;
            };

            debug!("Found sub template {}", name);
            let child = Template::build(
                Some(name),
                inner.as_str(),
                Arc::clone(self.syntax),
                self.policy,
            )?;
            children.insert(name.to_string(), child);
            spans.push(whole.range());
        }

        Ok(spans)
    }

    fn read_top_level_templates(
        &self,
        text: &str,
        children: &mut BTreeMap<String, Template>,
    ) -> TemplateResult<String> {
        let spans = self.read_template_blocks(text, children)?;
        Ok(cut_spans(text, spans))
    }

    fn read_variables(&self, clean_body: &str) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for caps in self.syntax.variable().captures_iter(clean_body) {
            let name = &caps[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }

        debug!(
            "Collected {} placeholders for {}",
            variables.len(),
            self.scope.unwrap_or("<root>")
        );
        variables
    }
}

/// Remove `spans` from `text`. Spans starting inside an earlier one are
/// already gone with it.
fn cut_spans(text: &str, mut spans: Vec<Range<usize>>) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_by_key(|span| span.start);
    let mut clean = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        if span.start < last {
            continue;
        }
        clean.push_str(&text[last..span.start]);
        last = span.end;
    }
    clean.push_str(&text[last..]);
    clean
}
