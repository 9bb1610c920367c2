//! Top-level error taxonomy (§7). Setup-fatal errors surface from
//! [`crate::generator::Generator::new`]/`main`; everything else is handled
//! at the point of occurrence by logging and continuing.

use thiserror::Error;

use crate::docker::DockerError;
use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Docker(#[from] DockerError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
