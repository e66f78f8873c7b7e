//! Rule loading error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating rule bundles
#[derive(Debug, Error)]
pub enum RulesError {
    /// Bundle file could not be read
    #[error("failed to read rules from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bundle is not valid JSON or does not match the schema
    #[error("invalid rule bundle: {0}")]
    Parse(#[from] serde_json::Error),

    /// A rule set has no name
    #[error("rule set #{index} has an empty name")]
    EmptyName { index: usize },

    /// Two rule sets share a name
    #[error("duplicate rule set name: {0}")]
    DuplicateName(String),
}
