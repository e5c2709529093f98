// ABOUTME: Template collaborator turning page data into HTML via Tera
// ABOUTME: Ships built-in templates and lets a templates directory override them

use crate::errors::{Result, SiteError};
use comrak::{markdown_to_html, ComrakOptions};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera, Value};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const SLIDE_DECK_TEMPLATE: &str = "slide_deck.html";
pub const ERROR_TEMPLATE: &str = "error.html";

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    (INDEX_TEMPLATE, include_str!("../templates/index.html")),
    (SLIDE_DECK_TEMPLATE, include_str!("../templates/slide_deck.html")),
    (ERROR_TEMPLATE, include_str!("../templates/error.html")),
];

/// The set of page templates used by the renderer
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::load(None)
    }

    /// Load templates, preferring `<dir>/<name>` over the built-in version when present.
    ///
    /// Templates are read again on every call; nothing is cached between loads.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("markdown", markdown_filter);

        for (name, builtin) in BUILTIN_TEMPLATES {
            let source = match dir.map(|d| d.join(name)) {
                Some(path) if path.is_file() => {
                    debug!("Using template override {:?}", path);
                    fs::read_to_string(&path).map_err(|e| {
                        SiteError::RenderError(format!(
                            "Failed to read template {:?}: {}",
                            path, e
                        ))
                    })?
                }
                _ => builtin.to_string(),
            };
            tera.add_raw_template(name, &source)?;
        }

        Ok(Self { tera })
    }

    /// Render a named template with a serializable data object
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(name, &context)?)
    }
}

/// `{{ text | markdown }}`: CommonMark to HTML, raw HTML passed through
fn markdown_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("markdown filter requires a string"))?;

    let mut options = ComrakOptions::default();
    options.render.unsafe_ = true; // Keep no-break spans intact
    Ok(Value::String(markdown_to_html(text, &options)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markdown_filter_keeps_inline_html() {
        let html = markdown_filter(
            &json!(r#"Learn <span class="no-break">C++</span> *fast*"#),
            &HashMap::new(),
        )
        .unwrap();
        let html = html.as_str().unwrap();
        assert!(html.contains(r#"<span class="no-break">C++</span>"#));
        assert!(html.contains("<em>fast</em>"));
    }

    #[test]
    fn test_markdown_filter_rejects_non_strings() {
        assert!(markdown_filter(&json!(3), &HashMap::new()).is_err());
    }

    #[test]
    fn test_override_directory_replaces_single_template() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(ERROR_TEMPLATE), "custom {{ status }}").unwrap();

        let templates = Templates::load(Some(dir.path())).unwrap();
        let html = templates
            .render(ERROR_TEMPLATE, &json!({ "status": 418 }))
            .unwrap();
        assert_eq!(html, "custom 418");

        // Templates without an override fall back to the built-in version
        let html = templates
            .render(
                SLIDE_DECK_TEMPLATE,
                &json!({ "title": "T", "title_raw": "T", "content": "# Hi", "favicon": "/f.ico" }),
            )
            .unwrap();
        assert!(html.contains("# Hi"));
    }

    #[test]
    fn test_broken_override_is_render_error() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_TEMPLATE), "{% if %}").unwrap();

        match Templates::load(Some(dir.path())) {
            Err(SiteError::RenderError(_)) => {}
            other => panic!("expected render error, got {:?}", other.err()),
        }
    }
}
