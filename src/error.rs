//! Top-level build errors

use thiserror::Error;

use crate::classifier::ClassifyError;
use crate::config::{ConfigError, ResolveError};
use crate::gateway::PipelineError;

/// Errors raised while building a gateway
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FactoryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FactoryError::Config(_) => 1,
            FactoryError::Resolve(_) => 20,
            FactoryError::Classify(_) => 10,
            FactoryError::Pipeline(_) => 30,
            FactoryError::Serialization(_) => 1,
        }
    }
}

/// Result type for factory operations
pub type FactoryResult<T> = Result<T, FactoryError>;
