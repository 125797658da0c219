use minijinja::{AutoEscape, Environment, Value};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::error::AppError;

/// Built-in templates, keyed by the name used in [`TemplateEngine::render`]
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "contact_admin.txt.jinja",
        include_str!("../../../templates/emails/contact_admin.txt.jinja"),
    ),
    (
        "contact_admin.html.jinja",
        include_str!("../../../templates/emails/contact_admin.html.jinja"),
    ),
    (
        "intake_admin.txt.jinja",
        include_str!("../../../templates/emails/intake_admin.txt.jinja"),
    ),
    (
        "intake_admin.html.jinja",
        include_str!("../../../templates/emails/intake_admin.html.jinja"),
    ),
    (
        "intake_user.txt.jinja",
        include_str!("../../../templates/emails/intake_user.txt.jinja"),
    ),
    (
        "intake_user.html.jinja",
        include_str!("../../../templates/emails/intake_user.html.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to compile template '{name}': {reason}")]
    CompileError { name: String, reason: String },

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Text and HTML bodies of one email
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub text: String,
    pub html: String,
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.list_templates())
            .finish()
    }
}

impl TemplateEngine {
    /// Build the engine from the built-in templates only
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::new(None)
    }

    /// Build the engine, letting `.jinja` files under `override_dir` replace
    /// built-in templates of the same name.
    pub fn new(override_dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.contains(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        env.add_filter("filesize", filesize);

        for &(name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| TemplateError::CompileError {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }

        if let Some(dir) = override_dir {
            if dir.is_dir() {
                load_templates_recursive(&mut env, dir, dir)?;
            } else {
                tracing::warn!(
                    "Email template directory {} does not exist, using built-in templates",
                    dir.display()
                );
            }
        }

        Ok(Self { env })
    }

    /// Render a single template with a serializable context
    pub fn render<S: Serialize>(&self, template_name: &str, ctx: S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        template
            .render(Value::from_serialize(&ctx))
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    /// Render both `<base>.txt.jinja` and `<base>.html.jinja`
    pub fn render_email<S: Serialize>(
        &self,
        base: &str,
        ctx: S,
    ) -> Result<RenderedEmail, TemplateError> {
        let ctx = Value::from_serialize(&ctx);
        Ok(RenderedEmail {
            text: self.render(&format!("{}.txt.jinja", base), &ctx)?,
            html: self.render(&format!("{}.html.jinja", base), &ctx)?,
        })
    }

    pub fn template_exists(&self, template_name: &str) -> bool {
        self.env.get_template(template_name).is_ok()
    }

    pub fn list_templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .env
            .templates()
            .map(|(name, _)| name.to_string())
            .collect();
        names.sort();
        names
    }
}

/// Recursively load all .jinja templates from a directory
fn load_templates_recursive(
    env: &mut Environment<'static>,
    base_path: &Path,
    current_path: &Path,
) -> Result<(), TemplateError> {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path)?;
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }
        let (Ok(relative), Ok(content)) = (path.strip_prefix(base_path), std::fs::read_to_string(&path))
        else {
            continue;
        };

        let template_name = relative.to_string_lossy().replace('\\', "/");
        // Templates live for the whole process, so leaking gives them 'static
        let static_name: &'static str = Box::leak(template_name.clone().into_boxed_str());
        let static_content: &'static str = Box::leak(content.into_boxed_str());
        env.add_template(static_name, static_content)
            .map_err(|e| TemplateError::CompileError {
                name: template_name.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Loaded email template override: {}", template_name);
    }

    Ok(())
}

/// `{{ size|filesize }}` → "512 B", "1.5 KB", "2.0 MB"
fn filesize(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_templates_compile() {
        let engine = TemplateEngine::builtin().unwrap();
        for (name, _) in BUILTIN_TEMPLATES {
            assert!(engine.template_exists(name), "missing {}", name);
        }
    }

    #[test]
    fn test_missing_template() {
        let engine = TemplateEngine::builtin().unwrap();
        let result = engine.render("nonexistent.txt.jinja", json!({}));
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_html_variant_is_escaped_text_is_not() {
        let mut engine = TemplateEngine::builtin().unwrap();
        engine
            .env
            .add_template("sample.html.jinja", "{{ value }}")
            .unwrap();
        engine
            .env
            .add_template("sample.txt.jinja", "{{ value }}")
            .unwrap();

        let rendered = engine
            .render_email("sample", json!({ "value": "<b>A&B" }))
            .unwrap();
        assert_eq!(rendered.text, "<b>A&B");
        assert_eq!(rendered.html, "&lt;b&gt;A&amp;B");
    }

    #[test]
    fn test_filesize_filter() {
        assert_eq!(filesize(512), "512 B");
        assert_eq!(filesize(1536), "1.5 KB");
        assert_eq!(filesize(2 * 1024 * 1024), "2.0 MB");
    }
}
