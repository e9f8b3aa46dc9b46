//! Template errors

use std::io;
use std::path::PathBuf;

/// Errors raised while locating or reading templates
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("invalid template name: {0}")]
    InvalidName(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
