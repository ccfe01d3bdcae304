use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] oracle_core::error::CoreError),
}

impl BedrockError {
    /// True for failures in the returned payload rather than the call itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BedrockError::ResponseParse(_) | BedrockError::SchemaViolation(_)
        )
    }
}
