//! The template node: bound values, sub-templates and rendering.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use regex::Captures;

use crate::config::{MissingVariablePolicy, TemplateConfig};
use crate::error::{TemplateError, TemplateResult};
use crate::loader::TemplateLoader;
use crate::markers::{MarkerSet, Syntax};
use crate::parser::Parser;

/// A parsed template and the tree of sub-templates declared inside it.
///
/// Each node owns its children exclusively. Rendering a node only fills in
/// its own placeholders; a child's output reaches the parent when the caller
/// binds it to one of the parent's variables.
///
/// `to_string()` equals [`Template::render`] except under the `fail` policy,
/// where unbound placeholders are written literally instead of failing.
///
/// ```rust
/// use tmpl_core::Template;
///
/// let mut page = Template::parse(
///     "<ul>@-{items}-@</ul>\
///      <!--@@ BEGIN_TEMPLATE item @@--><li>@-{label}-@</li><!--@@ END_TEMPLATE item @@-->",
/// )?;
///
/// let mut items = String::new();
/// for label in ["one", "two"] {
///     let item = page.get_sub_template("item")?;
///     item.set_variable("label", label)?;
///     items.push_str(&item.render()?);
/// }
/// page.set_variable("items", items)?;
///
/// assert_eq!(page.render()?, "<ul><li>one</li><li>two</li></ul>");
/// # Ok::<(), tmpl_core::TemplateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    name: Option<String>,
    clean_body: String,
    variables: Vec<String>,
    values: HashMap<String, String>,
    children: BTreeMap<String, Template>,
    syntax: Arc<Syntax>,
    policy: MissingVariablePolicy,
}

impl Template {
    /// Parse a root template using the default markers and policy.
    pub fn parse(contents: &str) -> TemplateResult<Self> {
        Self::parse_with(contents, &TemplateConfig::default())
    }

    /// Parse a root template with an explicit configuration.
    pub fn parse_with(contents: &str, config: &TemplateConfig) -> TemplateResult<Self> {
        TemplateLoader::new(config.clone())?.load_str(contents)
    }

    /// Read and parse a root template file using the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        TemplateLoader::new(TemplateConfig::default())?.load_file(path)
    }

    /// Build a node named `name` (or a root when `None`) from raw text.
    pub(crate) fn build(
        name: Option<&str>,
        contents: &str,
        syntax: Arc<Syntax>,
        policy: MissingVariablePolicy,
    ) -> TemplateResult<Self> {
        let parsed = Parser::new(&syntax, policy, name).parse(contents)?;

        Ok(Self {
            name: name.map(str::to_string),
            clean_body: parsed.clean_body,
            variables: parsed.variables,
            values: HashMap::new(),
            children: parsed.children,
            syntax,
            policy,
        })
    }

    /// Re-parse this node from new text.
    ///
    /// The body, placeholders and sub-templates are rebuilt. Values bound so
    /// far are kept and apply again to any placeholder of the same name.
    pub fn reload(&mut self, contents: &str) -> TemplateResult<&mut Self> {
        let parsed = Parser::new(&self.syntax, self.policy, self.name.as_deref()).parse(contents)?;
        self.clean_body = parsed.clean_body;
        self.variables = parsed.variables;
        self.children = parsed.children;
        Ok(self)
    }

    /// Name this node was declared under, `None` for a root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Body after ignore and template blocks were extracted.
    pub fn clean_body(&self) -> &str {
        &self.clean_body
    }

    pub fn markers(&self) -> &MarkerSet {
        self.syntax.markers()
    }

    pub fn missing_variable_policy(&self) -> MissingVariablePolicy {
        self.policy
    }

    /// Override the unbound-variable policy of this node only.
    pub fn set_missing_variable_policy(&mut self, policy: MissingVariablePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Declared placeholder names in first-occurrence order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Current value of a declared variable, `None` if never bound.
    pub fn get_variable(&self, name: &str) -> TemplateResult<Option<&str>> {
        self.ensure_declared(name)?;
        Ok(self.values.get(name).map(String::as_str))
    }

    /// Bind `value` to `name`, replacing any previous value.
    ///
    /// The value is inserted verbatim at render time; markers inside it are
    /// not interpreted.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) -> TemplateResult<&mut Self> {
        self.ensure_declared(name)?;
        self.values.insert(name.to_string(), value.into());
        Ok(self)
    }

    /// Append `value` to whatever is bound to `name` (nothing counts as "").
    pub fn append_variable(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> TemplateResult<&mut Self> {
        self.ensure_declared(name)?;
        let value = value.into();
        self.values
            .entry(name.to_string())
            .and_modify(|bound| bound.push_str(&value))
            .or_insert(value);
        Ok(self)
    }

    fn ensure_declared(&self, name: &str) -> TemplateResult<()> {
        if self.has_variable(name) {
            Ok(())
        } else {
            Err(TemplateError::UnknownVariable(name.to_string()))
        }
    }

    pub fn has_sub_template(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Names of the direct sub-templates, sorted.
    pub fn sub_template_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Shared access to a direct sub-template.
    pub fn sub_template(&self, name: &str) -> TemplateResult<&Template> {
        self.children
            .get(name)
            .ok_or_else(|| TemplateError::UnknownSubTemplate(name.to_string()))
    }

    /// The owned sub-template instance; bindings made through it persist.
    pub fn get_sub_template(&mut self, name: &str) -> TemplateResult<&mut Template> {
        self.children
            .get_mut(name)
            .ok_or_else(|| TemplateError::UnknownSubTemplate(name.to_string()))
    }

    /// Substitute bound values into the clean body.
    pub fn render(&self) -> TemplateResult<String> {
        self.render_with(self.policy)
    }

    fn render_with(&self, policy: MissingVariablePolicy) -> TemplateResult<String> {
        if policy == MissingVariablePolicy::Fail {
            if let Some(name) = self.variables.iter().find(|v| !self.values.contains_key(*v)) {
                return Err(TemplateError::UnboundVariable(name.clone()));
            }
        }

        // Single pass: substituted values are never scanned again.
        let rendered = self
            .syntax
            .variable()
            .replace_all(&self.clean_body, |caps: &Captures| {
                match self.values.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None if policy == MissingVariablePolicy::Empty => String::new(),
                    None => caps[0].to_string(),
                }
            });

        Ok(rendered.into_owned())
    }
}

impl fmt::Display for Template {
    /// Writes [`Template::render`]. Under the `fail` policy unbound markers
    /// are written literally, since a formatter cannot carry the error.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = match self.policy {
            MissingVariablePolicy::Fail => MissingVariablePolicy::Literal,
            other => other,
        };
        let rendered = self.render_with(policy).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
