//! Phase runner
//!
//! Schedules the steps of one lifecycle phase, either all at once (detection)
//! or one after the other (anything that changes the page).

use std::sync::Arc;

use consent_rules::{Phase, PhaseMode, RuleStep, SnippetTable};
use dom_actions::ConsentActions;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::Outcome;
use crate::settings::EngineSettings;
use crate::step::StepInterpreter;

#[derive(Clone)]
pub struct PhaseRunner {
    interpreter: StepInterpreter,
}

impl PhaseRunner {
    pub fn new(actions: Arc<dyn ConsentActions>, settings: EngineSettings) -> Self {
        Self {
            interpreter: StepInterpreter::new(actions, settings),
        }
    }

    pub fn with_snippets(mut self, snippets: Arc<SnippetTable>) -> Self {
        self.interpreter = self.interpreter.with_snippets(snippets);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.interpreter = self.interpreter.with_cancel(cancel);
        self
    }

    pub fn interpreter(&self) -> &StepInterpreter {
        &self.interpreter
    }

    /// Run `steps` with the scheduling `phase` calls for
    pub async fn run(&self, phase: Phase, steps: &[RuleStep]) -> Outcome {
        match phase.mode() {
            PhaseMode::Parallel => self.run_parallel(steps).await,
            PhaseMode::Sequential => self.run_sequential(steps).await,
        }
    }

    /// Start every step at once and AND the results once all have settled.
    ///
    /// A false step does not stop the others. If any step errors, the phase
    /// fails with the error of the first erroring step in authored order.
    pub async fn run_parallel(&self, steps: &[RuleStep]) -> Outcome {
        let settled = join_all(steps.iter().map(|step| self.interpreter.evaluate(step))).await;

        let mut detected = true;
        for (index, result) in settled.into_iter().enumerate() {
            match result {
                Ok(ok) => detected &= ok,
                Err(err) => {
                    warn!(step = index, error = %err, "parallel step failed");
                    return Err(err);
                }
            }
        }
        Ok(detected)
    }

    /// Run steps in order. A false result on a required step stops the phase
    /// before any later step starts.
    pub async fn run_sequential(&self, steps: &[RuleStep]) -> Outcome {
        for (index, step) in steps.iter().enumerate() {
            let ok = self.interpreter.evaluate(step).await?;
            if !ok && !step.optional {
                debug!(step = index, total = steps.len(), "required step failed");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
