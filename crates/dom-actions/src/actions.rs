use std::sync::Arc;

use async_trait::async_trait;
use consent_rules::VisibilityCheck;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::DomError;
use crate::model::HideMethod;
use crate::ports::DomPort;
use crate::prehide::{hiding_rule, STYLE_ELEMENT_ID};

/// Capability the rule engine evaluates steps against.
///
/// `exists`, `visible` and `click` only fail when the binding itself fails.
/// `eval` also fails when the expression throws; the engine treats both as
/// fatal for the enclosing phase.
#[async_trait]
pub trait ConsentActions: Send + Sync {
    /// At least one element matches `selector`
    async fn exists(&self, selector: &str) -> Result<bool, DomError>;

    /// Visibility of every match, reduced with `check`; no match is `false`
    async fn visible(&self, selector: &str, check: VisibilityCheck) -> Result<bool, DomError>;

    /// Click the first match, or every match when `all` is set.
    /// Returns whether anything matched.
    async fn click(&self, selector: &str, all: bool) -> Result<bool, DomError>;

    /// Evaluate `expression` and coerce the result to a boolean
    async fn eval(&self, expression: &str) -> Result<bool, DomError>;
}

/// JavaScript truthiness of an evaluation result
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reduce per-element visibility to a single answer
pub fn reduce_visibility(results: &[bool], check: VisibilityCheck) -> bool {
    if results.is_empty() {
        return false;
    }
    match check {
        VisibilityCheck::Any => results.iter().any(|visible| *visible),
        VisibilityCheck::None => results.iter().all(|visible| !*visible),
        VisibilityCheck::All => results.iter().all(|visible| *visible),
    }
}

/// [`ConsentActions`] implemented over a [`DomPort`]
#[derive(Clone)]
pub struct PageActions {
    port: Arc<dyn DomPort>,
}

impl PageActions {
    pub fn new(port: Arc<dyn DomPort>) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &Arc<dyn DomPort> {
        &self.port
    }

    /// Hide `selectors` with a cosmetic CSS rule.
    /// Returns `false` when there is nothing to hide.
    pub async fn hide(&self, selectors: &[String], method: HideMethod) -> Result<bool, DomError> {
        if selectors.is_empty() {
            return Ok(false);
        }
        let rule = hiding_rule(selectors, method);
        debug!(count = selectors.len(), ?method, "[hide]");
        self.port.append_style(STYLE_ELEMENT_ID, &rule).await?;
        Ok(true)
    }
}

#[async_trait]
impl ConsentActions for PageActions {
    async fn exists(&self, selector: &str) -> Result<bool, DomError> {
        let exists = !self.port.query_all(selector).await?.is_empty();
        debug!(selector, exists, "[exists?]");
        Ok(exists)
    }

    async fn visible(&self, selector: &str, check: VisibilityCheck) -> Result<bool, DomError> {
        let elements = self.port.query_all(selector).await?;
        let results: Vec<bool> = elements.iter().map(|e| e.is_visible()).collect();
        let visible = reduce_visibility(&results, check);
        debug!(selector, ?check, ?results, visible, "[visible?]");
        Ok(visible)
    }

    #[instrument(skip(self), level = "debug")]
    async fn click(&self, selector: &str, all: bool) -> Result<bool, DomError> {
        let matched = self.port.query_all(selector).await?.len();
        debug!(selector, matched, "[click]");
        if matched == 0 {
            return Ok(false);
        }
        let targets = if all { matched } else { 1 };
        for index in 0..targets {
            // the page may have changed since the query; a lost target is not fatal
            if let Err(err) = self.port.click_nth(selector, index).await {
                warn!(selector, index, error = %err, "[click] target gone");
            }
        }
        Ok(true)
    }

    async fn eval(&self, expression: &str) -> Result<bool, DomError> {
        debug!(expression, "about to [eval]");
        let value = self.port.evaluate(expression).await?;
        Ok(is_truthy(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_empty_match_is_false_for_every_mode() {
        for check in [
            VisibilityCheck::Any,
            VisibilityCheck::None,
            VisibilityCheck::All,
        ] {
            assert!(!reduce_visibility(&[], check));
        }
    }

    #[test]
    fn test_visibility_modes() {
        let mixed = [true, false];
        assert!(reduce_visibility(&mixed, VisibilityCheck::Any));
        assert!(!reduce_visibility(&mixed, VisibilityCheck::None));
        assert!(!reduce_visibility(&mixed, VisibilityCheck::All));

        let hidden = [false, false];
        assert!(!reduce_visibility(&hidden, VisibilityCheck::Any));
        assert!(reduce_visibility(&hidden, VisibilityCheck::None));
        assert!(!reduce_visibility(&hidden, VisibilityCheck::All));

        let shown = [true, true];
        assert!(reduce_visibility(&shown, VisibilityCheck::Any));
        assert!(!reduce_visibility(&shown, VisibilityCheck::None));
        assert!(reduce_visibility(&shown, VisibilityCheck::All));
    }
}
