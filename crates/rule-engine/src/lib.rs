//! Consent rule evaluation engine
//!
//! Interprets declarative CMP rule sets against a page: a
//! [`StepInterpreter`] evaluates single rule steps, a [`PhaseRunner`]
//! schedules the steps of a lifecycle phase, and every CMP variant, whether
//! rule-driven ([`RuleCmp`]) or hand-written ([`builtin`]), is reached through
//! the [`ConsentCmp`] trait.

pub mod builtin;
pub mod cmp;
pub mod errors;
pub mod phase;
pub mod poll;
pub mod registry;
pub mod rule_cmp;
pub mod settings;
pub mod step;

pub use cmp::{must_succeed, ConsentCmp, UnresolvedCmp};
pub use errors::{EngineError, Outcome};
pub use phase::PhaseRunner;
pub use poll::{try_wait_for, wait_for};
pub use registry::CmpRegistry;
pub use rule_cmp::RuleCmp;
pub use settings::EngineSettings;
pub use step::StepInterpreter;
