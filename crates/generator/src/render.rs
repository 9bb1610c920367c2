//! Renderer (§4.10, ambient). The distilled contract treats rendering as an
//! external collaborator (`generate_file(config, ctx) -> changed: bool`);
//! this crate ships one concrete, runnable implementation driven by
//! Handlebars so the rest of the engine has something real to exercise.

use std::io::Write;

use handlebars::Handlebars;
use thiserror::Error;

use crate::context::Context;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("template error in {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("render error: {0}")]
    Render(#[from] Box<handlebars::RenderError>),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The external renderer contract (§6): render `config.dest` from `ctx`,
/// report whether the bytes changed. Write errors are the renderer's to
/// report; it must still return a well-defined boolean — so a write failure
/// is surfaced as `Err`, and callers decide what "well-defined" means for
/// their own error handling (this crate's callers log and treat it as
/// unchanged).
pub trait Renderer: Send + Sync {
    fn generate_file(&self, config: &crate::config::Config, ctx: &Context) -> Result<bool, RenderError>;
}

pub struct HandlebarsRenderer;

impl HandlebarsRenderer {
    pub fn new() -> Self {
        HandlebarsRenderer
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HandlebarsRenderer {
    fn generate_file(&self, config: &crate::config::Config, ctx: &Context) -> Result<bool, RenderError> {
        let template_path = config.template.to_string_lossy().to_string();
        let template_source =
            std::fs::read_to_string(&config.template).map_err(|e| RenderError::TemplateRead {
                path: template_path.clone(),
                source: e,
            })?;

        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string("config", &template_source)
            .map_err(|e| RenderError::Template {
                path: template_path.clone(),
                source: Box::new(e),
            })?;

        let rendered = handlebars
            .render("config", ctx)
            .map_err(|e| RenderError::Render(Box::new(e)))?;
        let rendered_bytes = rendered.into_bytes();

        let existing = std::fs::read(&config.dest).ok();
        if existing.as_deref() == Some(rendered_bytes.as_slice()) {
            return Ok(false);
        }

        write_atomic(&config.dest, &rendered_bytes).map_err(|e| RenderError::Write {
            path: config.dest.to_string_lossy().to_string(),
            source: e,
        })?;

        Ok(true)
    }
}

fn write_atomic(dest: &std::path::Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = dest.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(dest)
        .map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn empty_context() -> Context {
        Context {
            containers: Vec::new(),
            services: HashMap::new(),
            info: None,
        }
    }

    #[test]
    fn generate_file_writes_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("tpl.hbs");
        std::fs::write(&template_path, "containers={{containers.len}}").unwrap();
        let dest = dir.path().join("out.conf");

        let config = crate::config::Config {
            template: template_path,
            dest: dest.clone(),
            ..crate::config::Config::default()
        };

        let renderer = HandlebarsRenderer::new();
        let changed = renderer.generate_file(&config, &empty_context()).unwrap();
        assert!(changed);
        assert!(dest.exists());
    }

    #[test]
    fn generate_file_reports_unchanged_on_identical_rerender() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("tpl.hbs");
        std::fs::write(&template_path, "static content").unwrap();
        let dest = dir.path().join("out.conf");

        let config = crate::config::Config {
            template: template_path,
            dest,
            ..crate::config::Config::default()
        };

        let renderer = HandlebarsRenderer::new();
        assert!(renderer.generate_file(&config, &empty_context()).unwrap());
        assert!(!renderer.generate_file(&config, &empty_context()).unwrap());
    }
}
