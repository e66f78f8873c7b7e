//! Recorded page snapshot usable as a [`DomPort`].
//!
//! Elements are keyed by the exact selector string a rule uses, so a snapshot
//! answers the questions a rule set asks without a selector engine. Every
//! interaction is journaled, which is what dry runs and tests inspect.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomError;
use crate::model::ElementLayout;
use crate::ports::DomPort;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    /// Matches per selector
    #[serde(default)]
    pub elements: HashMap<String, Vec<ElementLayout>>,
    /// Evaluation results per expression
    #[serde(default)]
    pub evals: HashMap<String, Value>,
    /// Expressions that throw, with their error message
    #[serde(default)]
    pub throws: HashMap<String, String>,
}

/// Interaction recorded by [`StaticPage`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
    Query(String),
    Click { selector: String, index: usize },
    Eval(String),
    Style(String),
}

pub struct StaticPage {
    snapshot: RwLock<PageSnapshot>,
    journal: Mutex<Vec<PageEvent>>,
}

impl StaticPage {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn url(&self) -> String {
        self.snapshot.read().url.clone()
    }

    /// Replace the matches of `selector`, e.g. to make an element appear later
    pub fn set_elements(&self, selector: impl Into<String>, elements: Vec<ElementLayout>) {
        self.snapshot.write().elements.insert(selector.into(), elements);
    }

    pub fn set_eval(&self, expression: impl Into<String>, value: Value) {
        self.snapshot.write().evals.insert(expression.into(), value);
    }

    pub fn journal(&self) -> Vec<PageEvent> {
        self.journal.lock().clone()
    }

    /// Selectors clicked so far, one entry per dispatched click
    pub fn clicks(&self) -> Vec<(String, usize)> {
        self.journal
            .lock()
            .iter()
            .filter_map(|event| match event {
                PageEvent::Click { selector, index } => Some((selector.clone(), *index)),
                _ => None,
            })
            .collect()
    }

    /// Whether `selector` was looked up at all
    pub fn queried(&self, selector: &str) -> bool {
        self.journal.lock().iter().any(|event| match event {
            PageEvent::Query(s) | PageEvent::Click { selector: s, .. } => s == selector,
            _ => false,
        })
    }

    pub fn styles(&self) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .filter_map(|event| match event {
                PageEvent::Style(css) => Some(css.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PageEvent) {
        self.journal.lock().push(event);
    }
}

#[async_trait]
impl DomPort for StaticPage {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementLayout>, DomError> {
        if selector.trim().is_empty() {
            return Err(DomError::InvalidSelector(selector.to_string()));
        }
        self.record(PageEvent::Query(selector.to_string()));
        Ok(self
            .snapshot
            .read()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), DomError> {
        let matched = self
            .snapshot
            .read()
            .elements
            .get(selector)
            .map(Vec::len)
            .unwrap_or(0);
        if index >= matched {
            return Err(DomError::Unavailable(format!(
                "no element #{} for {}",
                index, selector
            )));
        }
        self.record(PageEvent::Click {
            selector: selector.to_string(),
            index,
        });
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, DomError> {
        self.record(PageEvent::Eval(expression.to_string()));
        let snapshot = self.snapshot.read();
        if let Some(message) = snapshot.throws.get(expression) {
            return Err(DomError::Evaluation(message.clone()));
        }
        snapshot
            .evals
            .get(expression)
            .cloned()
            .ok_or_else(|| DomError::Evaluation(format!("{} is not defined", expression)))
    }

    async fn append_style(&self, _element_id: &str, css: &str) -> Result<(), DomError> {
        self.record(PageEvent::Style(css.to_string()));
        Ok(())
    }
}
