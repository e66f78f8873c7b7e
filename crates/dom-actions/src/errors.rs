use thiserror::Error;

/// Failures raised by a page binding
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    #[error("page unavailable: {0}")]
    Unavailable(String),
}
