//! Declarative CMP backed by a rule set

use std::sync::Arc;

use async_trait::async_trait;
use consent_rules::{CmpRuleSet, Phase};
use tracing::{debug, info, instrument};

use crate::cmp::ConsentCmp;
use crate::errors::Outcome;
use crate::phase::PhaseRunner;

/// Interprets a [`CmpRuleSet`]. Phases without a rule list report `false`
/// (self-test reports `true`).
#[derive(Clone)]
pub struct RuleCmp {
    rules: Arc<CmpRuleSet>,
    runner: PhaseRunner,
}

impl RuleCmp {
    pub fn new(rules: Arc<CmpRuleSet>, runner: PhaseRunner) -> Self {
        Self { rules, runner }
    }

    pub fn rules(&self) -> &CmpRuleSet {
        &self.rules
    }

    #[instrument(skip_all, fields(cmp = %self.rules.name, phase = %phase))]
    async fn run_phase(&self, phase: Phase, unconfigured: bool) -> Outcome {
        let Some(steps) = self.rules.steps(phase) else {
            debug!("no rules configured");
            return Ok(unconfigured);
        };
        let result = self.runner.run(phase, steps).await?;
        debug!(result, steps = steps.len(), "phase finished");
        Ok(result)
    }
}

#[async_trait]
impl ConsentCmp for RuleCmp {
    fn name(&self) -> &str {
        &self.rules.name
    }

    fn prehide_selectors(&self) -> &[String] {
        &self.rules.prehide_selectors
    }

    fn is_hiding_rule(&self) -> bool {
        self.rules.is_hiding_rule
    }

    fn has_self_test(&self) -> bool {
        self.rules.self_test.is_some()
    }

    async fn detect_cmp(&self) -> Outcome {
        self.run_phase(Phase::DetectCmp, false).await
    }

    async fn detect_popup(&self) -> Outcome {
        self.run_phase(Phase::DetectPopup, false).await
    }

    fn detect_frame(&self, frame_url: &str) -> bool {
        self.rules.matches_frame(frame_url)
    }

    async fn opt_out(&self) -> Outcome {
        info!(cmp = %self.rules.name, "Initiated optOut()");
        self.run_phase(Phase::OptOut, false).await
    }

    async fn opt_in(&self) -> Outcome {
        self.run_phase(Phase::OptIn, false).await
    }

    async fn open_cmp(&self) -> Outcome {
        self.run_phase(Phase::OpenCmp, false).await
    }

    async fn self_test(&self) -> Outcome {
        self.run_phase(Phase::SelfTest, true).await
    }
}
