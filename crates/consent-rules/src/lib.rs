//! Declarative consent rules
//!
//! Data model consumed by the rule engine: single rule steps, the per-CMP rule
//! set with its lifecycle phases, and the bundle file that ships all of them
//! together with the named expression snippets.

pub mod bundle;
pub mod cmp;
pub mod errors;
pub mod snippets;
pub mod step;

pub use bundle::{RuleBundle, ValidationReport, ValidationWarning};
pub use cmp::{CmpRuleSet, Phase, PhaseMode};
pub use errors::RulesError;
pub use snippets::SnippetTable;
pub use step::{RuleStep, VisibilityCheck, DEFAULT_WAIT_TIMEOUT_MS};
