//! Marker literals and the compiled patterns built from them.
//!
//! A document embeds directives between a command start and end marker
//! (`<!--@@ ... @@-->` by default) and placeholders between a variable
//! start and end marker (`@-{name}-@`). Every literal can be overridden
//! through [`MarkerSet`]; [`Syntax`] escapes them and compiles the regular
//! expressions the parser scans with.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};

/// The literal tokens that make up the template grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSet {
    pub command_start: String,
    pub command_end: String,
    pub variable_start: String,
    pub variable_end: String,
    pub begin_ignore: String,
    pub end_ignore: String,
    pub begin_template: String,
    pub end_template: String,
    /// Keyword naming the placeholder that replaces an ignore block.
    pub separator: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            command_start: "<!--@@".to_string(),
            command_end: "@@-->".to_string(),
            variable_start: "@-{".to_string(),
            variable_end: "}-@".to_string(),
            begin_ignore: "BEGIN_IGNORE".to_string(),
            end_ignore: "END_IGNORE".to_string(),
            begin_template: "BEGIN_TEMPLATE".to_string(),
            end_template: "END_TEMPLATE".to_string(),
            separator: "AS".to_string(),
        }
    }
}

impl MarkerSet {
    /// Build the placeholder marker for `name`.
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{}{}", self.variable_start, name, self.variable_end)
    }

    /// Check that no marker literal is empty.
    pub fn validate(&self) -> TemplateResult<()> {
        let fields = [
            ("command_start", &self.command_start),
            ("command_end", &self.command_end),
            ("variable_start", &self.variable_start),
            ("variable_end", &self.variable_end),
            ("begin_ignore", &self.begin_ignore),
            ("end_ignore", &self.end_ignore),
            ("begin_template", &self.begin_template),
            ("end_template", &self.end_template),
            ("separator", &self.separator),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(TemplateError::InvalidMarkers(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        Ok(())
    }
}

/// Compiled scanners for one [`MarkerSet`].
///
/// Patterns that do not depend on a template name are compiled once here;
/// name-scoped ones are built on demand by [`Syntax::ignore_block`] and
/// [`Syntax::template_block`].
#[derive(Debug)]
pub struct Syntax {
    markers: MarkerSet,
    root_ignore: Regex,
    ignore_marker: Regex,
    template_header: Regex,
    variable: Regex,
}

impl Syntax {
    /// Compile the patterns for `markers`.
    pub fn new(markers: MarkerSet) -> TemplateResult<Self> {
        markers.validate()?;

        let root_ignore = Regex::new(&ignore_pattern(&markers, None))?;
        let ignore_marker = Regex::new(&format!(
            r"(?s){cs}\s+(?:({bi})|{ei})(?:\s.*?)?{ce}",
            cs = regex::escape(&markers.command_start),
            ce = regex::escape(&markers.command_end),
            bi = regex::escape(&markers.begin_ignore),
            ei = regex::escape(&markers.end_ignore),
        ))?;
        let template_header = Regex::new(&format!(
            r"(?s){cs}\s+{bt}\s+(\S+)\s+{ce}",
            cs = regex::escape(&markers.command_start),
            ce = regex::escape(&markers.command_end),
            bt = regex::escape(&markers.begin_template),
        ))?;
        let variable = Regex::new(&format!(
            r"{vs}(.*?){ve}",
            vs = regex::escape(&markers.variable_start),
            ve = regex::escape(&markers.variable_end),
        ))?;

        Ok(Self {
            markers,
            root_ignore,
            ignore_marker,
            template_header,
            variable,
        })
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Ignore blocks addressed to the node called `scope`, or un-named
    /// blocks when `scope` is `None`.
    ///
    /// Capture 1 is the header after the scope name, capture 2 the body.
    pub fn ignore_block(&self, scope: Option<&str>) -> TemplateResult<Regex> {
        match scope {
            None => Ok(self.root_ignore.clone()),
            Some(name) => Ok(Regex::new(&ignore_pattern(&self.markers, Some(name)))?),
        }
    }

    /// Spans of the outermost ignore blocks in `text`, whatever their scope.
    ///
    /// Begin and end markers are paired by nesting depth, so a block that
    /// holds further ignore blocks spans up to its own end marker. A begin
    /// marker left open at the end of `text` yields no span.
    pub fn ignore_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;

        for caps in self.ignore_marker.captures_iter(text) {
            let Some(marker) = caps.get(0) else {
                continue;
            };
            if caps.get(1).is_some() {
                if depth == 0 {
                    start = marker.start();
                }
                depth += 1;
            } else if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    spans.push(start..marker.end());
                }
            }
        }

        spans
    }

    /// Template headers; capture 1 is the declared name.
    pub fn template_header(&self) -> &Regex {
        &self.template_header
    }

    /// The begin/end pair for the template called `name`; capture 1 is the
    /// body. The closing marker may repeat the name or omit it.
    pub fn template_block(&self, name: &str) -> TemplateResult<Regex> {
        let m = &self.markers;
        Ok(Regex::new(&format!(
            r"(?s){cs}\s+{bt}\s+{name}\s+{ce}(.*?){cs}\s+{et}(?:\s+{name})?\s+{ce}",
            cs = regex::escape(&m.command_start),
            ce = regex::escape(&m.command_end),
            bt = regex::escape(&m.begin_template),
            et = regex::escape(&m.end_template),
            name = regex::escape(name),
        ))?)
    }

    /// Placeholder markers; capture 1 is the variable name.
    pub fn variable(&self) -> &Regex {
        &self.variable
    }

    /// Extract the placeholder name from an ignore block header such as
    /// `" AS slot "`. Returns `None` when the block should simply vanish.
    pub fn ignore_target<'h>(&self, header: &'h str) -> Option<&'h str> {
        let header = header.trim();
        let name = match header.strip_prefix(self.markers.separator.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
            _ => header,
        };

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

fn ignore_pattern(markers: &MarkerSet, scope: Option<&str>) -> String {
    let scope = scope
        .map(|name| format!(r"\s+{}", regex::escape(name)))
        .unwrap_or_default();

    format!(
        r"(?s){cs}\s+{bi}{scope}(\s.*?)?{ce}(.*?){cs}\s+{ei}{scope}\s+{ce}",
        cs = regex::escape(&markers.command_start),
        ce = regex::escape(&markers.command_end),
        bi = regex::escape(&markers.begin_ignore),
        ei = regex::escape(&markers.end_ignore),
        scope = scope,
    )
}
