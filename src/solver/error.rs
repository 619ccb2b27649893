use thiserror::Error;

use crate::ir::{ConfigError, Name, Sort};

/// Engine-level failures. Unification no-matches and filter rejections
/// are not errors; they are absorbed locally as "no patches". Everything
/// here indicates either a rejected input module or an engine bug.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("sort mismatch during unification: {left} vs {right}")]
    SortMismatch { left: Sort, right: Sort },

    #[error("missing implementation for function '{0}'")]
    MissingFunction(Name),

    #[error("malformed rule shape: {0}")]
    MalformedRule(String),

    #[error("internal error: {0}")]
    Internal(String),
}
