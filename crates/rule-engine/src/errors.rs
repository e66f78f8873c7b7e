//! Engine error types

use consent_rules::Phase;
use dom_actions::DomError;
use thiserror::Error;

/// Fatal engine failures.
///
/// A phase that merely did not succeed is `Ok(false)`, never an error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A DOM action failed, e.g. an `eval` expression threw
    #[error("dom action failed: {0}")]
    Dom(#[from] DomError),

    /// Phase invoked on a CMP that does not provide it
    #[error("{phase} is not implemented for {cmp}")]
    NotImplemented { cmp: String, phase: Phase },

    /// A required outcome came back `false`
    #[error("{0} did not succeed")]
    MustSucceed(String),
}

/// Result of a phase: `Ok(false)` is a soft failure
pub type Outcome = Result<bool, EngineError>;
