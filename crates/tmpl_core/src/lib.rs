//! # tmpl_core
//!
//! Marker-driven text templates with nested, named sub-templates.
//!
//! A template is any text document (usually HTML) annotated with:
//!
//! - Placeholders: `@-{name}-@`
//! - Template blocks: `<!--@@ BEGIN_TEMPLATE row @@--> ... <!--@@ END_TEMPLATE row @@-->`
//! - Ignore blocks: `<!--@@ BEGIN_IGNORE AS slot @@--> ... <!--@@ END_IGNORE @@-->`
//!
//! Ignore blocks let sub-templates be authored inline, next to the spot
//! where their output ends up, without being rendered as part of the parent.
//! The whole block is replaced by the placeholder named after `AS`, or by
//! nothing. Inside a sub-template, ignore blocks carry the sub-template's
//! name (`BEGIN_IGNORE row`) so they are picked up at the right level.
//!
//! ## Example
//!
//! ```rust
//! use tmpl_core::Template;
//!
//! let mut page = Template::parse(
//!     "<table>\
//!      <!--@@ BEGIN_IGNORE AS rows @@-->\
//!      <!--@@ BEGIN_TEMPLATE row @@--><tr><td>@-{cell}-@</td></tr><!--@@ END_TEMPLATE row @@-->\
//!      <!--@@ END_IGNORE @@-->\
//!      </table>",
//! )?;
//!
//! let row = page.get_sub_template("row")?;
//! row.set_variable("cell", "42")?;
//! let rendered_row = row.render()?;
//!
//! page.set_variable("rows", rendered_row)?;
//! assert_eq!(page.render()?, "<table><tr><td>42</td></tr></table>");
//! # Ok::<(), tmpl_core::TemplateError>(())
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod markers;
mod parser;
pub mod template;

pub use config::{MissingVariablePolicy, TemplateConfig};
pub use error::{TemplateError, TemplateResult};
pub use loader::TemplateLoader;
pub use markers::{MarkerSet, Syntax};
pub use template::Template;
