//! Shared page template
//!
//! Parsed once at startup and only read afterwards, so one instance can
//! serve any number of concurrent requests.

use crate::error::RenderError;
use std::fmt;
use std::path::Path;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "page.html";
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/page.html");

/// Page layout taking `title` (escaped) and `body` (inserted verbatim)
pub struct PageTemplate {
    tera: Tera,
}

impl fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTemplate").finish_non_exhaustive()
    }
}

impl PageTemplate {
    /// The template compiled into the binary
    pub fn embedded() -> Result<Self, RenderError> {
        Self::from_source(DEFAULT_TEMPLATE)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::TemplateFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_source(&source)
    }

    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    pub fn render(&self, title: &str, body: &str) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("body", body);
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
