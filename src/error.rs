use thiserror::Error;

/// Failures surfaced by the analysis core.
///
/// Element-level decode problems are handled by skipping the offending
/// record; only context-level problems and missing required inputs surface
/// as errors. Degraded inputs (auto-detected industry, defaulted factors)
/// travel as warnings in result metadata instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl AnalysisError {
    pub fn validation(message: impl Into<String>) -> Self {
        AnalysisError::Validation(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        AnalysisError::Decode(message.into())
    }
}
