//! Errors surfaced by [`super::Orchestrator`].

use crate::runtime::RuntimeError;
use crate::stack::{FieldError, GraphError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum OrchestratorError {
    #[error("stack failed validation: {0:?}")]
    InvalidStack(Vec<FieldError>),

    #[error("agent dependency resolution failed: {0}")]
    DependencyCycle(#[from] GraphError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("runtime unavailable: {0}")]
    Unavailable(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
