use rule_engine::EngineError;
use thiserror::Error;

use crate::background::TabId;

/// Errors surfaced by the background and content drivers.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no consent popup reported for tab {0}")]
    NoPopup(TabId),

    #[error("no cmp detected on this page")]
    NoCmp,

    #[error("unexpected message: {0}")]
    Protocol(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("message codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
