//! Email template rendering.
//!
//! Templates use Jinja2 syntax (minijinja). Every email has a plain-text and an
//! HTML variant named `<name>.txt.jinja` and `<name>.html.jinja`. The built-in
//! set is compiled into the binary from `templates/emails/`; files in an
//! optional override directory replace them by name.

pub mod engine;

pub use engine::{RenderedEmail, TemplateEngine, TemplateError};
