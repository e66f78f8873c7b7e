//! Named CMP variants in detection order

use std::sync::Arc;

use consent_rules::RuleBundle;
use tracing::{debug, info};

use crate::cmp::ConsentCmp;
use crate::phase::PhaseRunner;
use crate::rule_cmp::RuleCmp;

/// Ordered collection of CMP variants.
///
/// Detection walks the variants in insertion order, so earlier entries win
/// when several would match a page.
#[derive(Clone, Default)]
pub struct CmpRegistry {
    cmps: Vec<Arc<dyn ConsentCmp>>,
}

impl CmpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`RuleCmp`] per rule set, skipping names listed in `disabled`.
    ///
    /// The bundle's snippet table is installed into `runner` so every variant
    /// resolves `EVAL_*` ids against it.
    pub fn from_bundle(bundle: &RuleBundle, runner: PhaseRunner, disabled: &[String]) -> Self {
        let runner = runner.with_snippets(Arc::new(bundle.snippets.clone()));
        let mut registry = Self::new();
        for rules in &bundle.autoconsent {
            if disabled.iter().any(|name| name == &rules.name) {
                debug!(cmp = %rules.name, "skipping disabled cmp");
                continue;
            }
            registry.register(Arc::new(RuleCmp::new(
                Arc::new(rules.clone()),
                runner.clone(),
            )));
        }
        info!(
            loaded = registry.len(),
            disabled = disabled.len(),
            snippets = bundle.snippets.len(),
            "cmp registry built"
        );
        registry
    }

    /// Append a variant. A later variant with an existing name replaces the
    /// earlier one in place.
    pub fn register(&mut self, cmp: Arc<dyn ConsentCmp>) {
        if let Some(slot) = self.cmps.iter_mut().find(|c| c.name() == cmp.name()) {
            debug!(cmp = cmp.name(), "replacing registered cmp");
            *slot = cmp;
        } else {
            self.cmps.push(cmp);
        }
    }

    /// Drop every variant whose name is listed in `disabled`
    pub fn disable(&mut self, disabled: &[String]) {
        self.cmps
            .retain(|cmp| !disabled.iter().any(|name| name == cmp.name()));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ConsentCmp>> {
        self.cmps.iter().find(|c| c.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ConsentCmp>> {
        self.cmps.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.cmps.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.cmps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmps.is_empty()
    }

    /// Variants whose frame prefix matches `frame_url`
    pub fn frames_matching(&self, frame_url: &str) -> Vec<Arc<dyn ConsentCmp>> {
        self.cmps
            .iter()
            .filter(|c| c.detect_frame(frame_url))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for CmpRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmpRegistry")
            .field("cmps", &self.names())
            .finish()
    }
}
