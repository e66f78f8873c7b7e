//! Rule step interpreter
//!
//! The only place that knows the rule step schema. Every action key present on
//! a step is started at once; the step holds when all of them do.

use std::sync::Arc;
use std::time::Duration;

use consent_rules::{RuleStep, SnippetTable, VisibilityCheck};
use dom_actions::ConsentActions;
use futures::future::{try_join_all, BoxFuture};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Outcome;
use crate::poll::try_wait_for;
use crate::settings::EngineSettings;

#[derive(Clone)]
pub struct StepInterpreter {
    actions: Arc<dyn ConsentActions>,
    snippets: Arc<SnippetTable>,
    settings: EngineSettings,
    cancel: CancellationToken,
}

impl StepInterpreter {
    pub fn new(actions: Arc<dyn ConsentActions>, settings: EngineSettings) -> Self {
        Self {
            actions,
            snippets: Arc::new(SnippetTable::default()),
            settings,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_snippets(mut self, snippets: Arc<SnippetTable>) -> Self {
        self.snippets = snippets;
        self
    }

    /// Token observed by the wait actions; cancel it on page teardown
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Evaluate one step. An empty step succeeds.
    pub async fn evaluate(&self, step: &RuleStep) -> Outcome {
        let mut pending: Vec<BoxFuture<'_, Outcome>> = Vec::with_capacity(step.action_count());

        if let Some(selector) = step.exists.as_deref() {
            pending.push(Box::pin(self.exists(selector)));
        }
        if let Some(selector) = step.visible.as_deref() {
            pending.push(Box::pin(self.visible(selector, step.check)));
        }
        if let Some(expression) = step.eval.as_deref() {
            pending.push(Box::pin(self.eval(expression)));
        }
        if let Some(selector) = step.wait_for.as_deref() {
            pending.push(Box::pin(
                self.wait_for_element(selector, step.wait_timeout_ms()),
            ));
        }
        if let Some(selector) = step.wait_for_then_click.as_deref() {
            pending.push(Box::pin(
                self.wait_then_click(selector, step.wait_timeout_ms()),
            ));
        }
        if let Some(ms) = step.wait {
            pending.push(Box::pin(self.pause(Duration::from_millis(ms))));
        }
        if let Some(selector) = step.click.as_deref() {
            pending.push(Box::pin(self.click(selector, step.all)));
        }

        if self.settings.trace_steps {
            debug!(?step, actions = pending.len(), "Running rule...");
        }
        let results = try_join_all(pending).await?;
        let result = results.into_iter().all(|ok| ok);
        if self.settings.trace_steps {
            debug!(result, "...rule result");
        }
        Ok(result)
    }

    async fn exists(&self, selector: &str) -> Outcome {
        Ok(self.actions.exists(selector).await?)
    }

    async fn visible(&self, selector: &str, check: VisibilityCheck) -> Outcome {
        Ok(self.actions.visible(selector, check).await?)
    }

    async fn click(&self, selector: &str, all: bool) -> Outcome {
        Ok(self.actions.click(selector, all).await?)
    }

    async fn eval(&self, expression: &str) -> Outcome {
        let resolved = self.snippets.resolve(expression);
        Ok(self.actions.eval(&resolved).await?)
    }

    async fn wait_then_click(&self, selector: &str, timeout_ms: u64) -> Outcome {
        if !self.wait_for_element(selector, timeout_ms).await? {
            return Ok(false);
        }
        self.click(selector, false).await
    }

    async fn wait_for_element(&self, selector: &str, timeout_ms: u64) -> Outcome {
        let attempts = self.settings.attempts_for(timeout_ms);
        let found = try_wait_for(
            || self.actions.exists(selector),
            attempts,
            self.settings.poll_interval(),
            &self.cancel,
        )
        .await?;
        debug!(selector, found, attempts, "[waitFor]");
        Ok(found)
    }

    async fn pause(&self, duration: Duration) -> Outcome {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(false),
            _ = sleep(duration) => Ok(true),
        }
    }
}
