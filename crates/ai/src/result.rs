use thiserror::Error;

use crate::provider::LlmError;

/// Failure raised while analysing a situation.
///
/// `Provider` and `Validation` never escape the engine: the AI-backed generator
/// turns them into a fallback. They exist so the cause can be logged and tested.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("invalid analysis input: {0}")]
    InvalidInput(String),

    #[error("provider failure: {0}")]
    Provider(#[from] LlmError),

    #[error("provider output failed validation: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}
