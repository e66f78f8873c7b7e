//! CMP capability
//!
//! Orchestrators only talk to [`ConsentCmp`]. The declarative
//! [`RuleCmp`](crate::RuleCmp) covers rule-file CMPs; hand-written strategies
//! implement the same trait directly.

use std::future::Future;

use async_trait::async_trait;
use consent_rules::Phase;

use crate::errors::{EngineError, Outcome};

/// Lifecycle operations of a consent management platform.
///
/// The provided methods are the base contract: a CMP that does not override
/// `detect_cmp`, `opt_out`, `opt_in` or `open_cmp` fails them with
/// [`EngineError::NotImplemented`], which callers must treat as a programming
/// error. Popup and frame detection default to `false`; self-test defaults to
/// success.
#[async_trait]
pub trait ConsentCmp: Send + Sync {
    fn name(&self) -> &str;

    /// Selectors hidden cosmetically while the CMP is handled
    fn prehide_selectors(&self) -> &[String] {
        &[]
    }

    fn is_hiding_rule(&self) -> bool {
        false
    }

    /// Whether `self_test` checks anything beyond the default
    fn has_self_test(&self) -> bool {
        true
    }

    async fn detect_cmp(&self) -> Outcome {
        Err(not_implemented(self.name(), Phase::DetectCmp))
    }

    async fn detect_popup(&self) -> Outcome {
        Ok(false)
    }

    /// Pure prefix predicate on the frame URL; no DOM access
    fn detect_frame(&self, _frame_url: &str) -> bool {
        false
    }

    async fn opt_out(&self) -> Outcome {
        Err(not_implemented(self.name(), Phase::OptOut))
    }

    async fn opt_in(&self) -> Outcome {
        Err(not_implemented(self.name(), Phase::OptIn))
    }

    async fn open_cmp(&self) -> Outcome {
        Err(not_implemented(self.name(), Phase::OpenCmp))
    }

    async fn self_test(&self) -> Outcome {
        Ok(true)
    }
}

/// Placeholder for a CMP that is known by name only
#[derive(Clone, Debug)]
pub struct UnresolvedCmp {
    name: String,
}

impl UnresolvedCmp {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ConsentCmp for UnresolvedCmp {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Escalate a soft `false` into [`EngineError::MustSucceed`].
///
/// Errors from `outcome` pass through unchanged.
pub async fn must_succeed<F>(what: impl Into<String>, outcome: F) -> Result<(), EngineError>
where
    F: Future<Output = Outcome>,
{
    if outcome.await? {
        Ok(())
    } else {
        Err(EngineError::MustSucceed(what.into()))
    }
}

fn not_implemented(cmp: &str, phase: Phase) -> EngineError {
    EngineError::NotImplemented {
        cmp: cmp.to_string(),
        phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_actions::DomError;

    #[tokio::test]
    async fn test_base_contract() {
        let cmp = UnresolvedCmp::new("pending");

        for result in [
            cmp.detect_cmp().await,
            cmp.opt_out().await,
            cmp.opt_in().await,
            cmp.open_cmp().await,
        ] {
            assert!(matches!(
                result,
                Err(EngineError::NotImplemented { ref cmp, .. }) if cmp == "pending"
            ));
        }
        assert!(!cmp.detect_popup().await.unwrap());
        assert!(!cmp.detect_frame("https://anything.example/"));
        assert!(cmp.self_test().await.unwrap());
        assert!(cmp.prehide_selectors().is_empty());
    }

    #[tokio::test]
    async fn test_not_implemented_names_phase() {
        let err = UnresolvedCmp::new("x").open_cmp().await.unwrap_err();
        assert_eq!(err.to_string(), "openCmp is not implemented for x");
    }

    #[tokio::test]
    async fn test_must_succeed() {
        assert!(must_succeed("opt-out", async { Ok(true) }).await.is_ok());

        let err = must_succeed("opt-out", async { Ok(false) })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MustSucceed(ref what) if what == "opt-out"));

        let err = must_succeed("opt-out", async {
            Err(EngineError::Dom(DomError::Evaluation("boom".into())))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Dom(_)));
    }
}
