//! Rule step definition

use serde::{Deserialize, Serialize};

/// Budget applied to `waitFor` / `waitForThenClick` when a step sets no timeout.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Aggregation mode for visibility checks over every matched element.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityCheck {
    /// At least one matched element is visible
    Any,
    /// No matched element is visible
    None,
    /// Every matched element is visible
    #[default]
    All,
}

/// One evaluation unit of a rule list.
///
/// A step may carry several action keys at once; the engine runs all of them
/// and the step succeeds only if every one of them does. A step without any
/// action key always succeeds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStep {
    /// Presence check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,

    /// Visibility check selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<String>,

    /// Visibility aggregation mode
    #[serde(default, skip_serializing_if = "is_default_check")]
    pub check: VisibilityCheck,

    /// Click target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,

    /// Click every match instead of the first one
    #[serde(default, skip_serializing_if = "is_false")]
    pub all: bool,

    /// Expression (or snippet id) evaluated in page context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval: Option<String>,

    /// Poll until the selector exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,

    /// Poll until the selector exists, then click the first match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_then_click: Option<String>,

    /// Fixed pause in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,

    /// Polling budget in milliseconds for the wait actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Failure does not abort a sequential phase
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

impl RuleStep {
    pub fn exists(selector: impl Into<String>) -> Self {
        Self {
            exists: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn visible(selector: impl Into<String>, check: VisibilityCheck) -> Self {
        Self {
            visible: Some(selector.into()),
            check,
            ..Self::default()
        }
    }

    pub fn click(selector: impl Into<String>) -> Self {
        Self {
            click: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn click_all(selector: impl Into<String>) -> Self {
        Self {
            click: Some(selector.into()),
            all: true,
            ..Self::default()
        }
    }

    pub fn eval(expression: impl Into<String>) -> Self {
        Self {
            eval: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn wait_for(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            wait_for: Some(selector.into()),
            timeout: Some(timeout_ms),
            ..Self::default()
        }
    }

    pub fn wait_for_then_click(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            wait_for_then_click: Some(selector.into()),
            timeout: Some(timeout_ms),
            ..Self::default()
        }
    }

    pub fn wait(ms: u64) -> Self {
        Self {
            wait: Some(ms),
            ..Self::default()
        }
    }

    /// Mark the step optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Number of action keys present on the step
    pub fn action_count(&self) -> usize {
        [
            self.exists.is_some(),
            self.visible.is_some(),
            self.click.is_some(),
            self.eval.is_some(),
            self.wait_for.is_some(),
            self.wait_for_then_click.is_some(),
            self.wait.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Whether the step clicks anything
    pub fn is_mutating(&self) -> bool {
        self.click.is_some() || self.wait_for_then_click.is_some()
    }

    /// Effective polling budget for the wait actions
    pub fn wait_timeout_ms(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_default_check(check: &VisibilityCheck) -> bool {
    *check == VisibilityCheck::All
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let step: RuleStep = serde_json::from_str(r##"{"visible": "#banner"}"##).unwrap();
        assert_eq!(step.check, VisibilityCheck::All);
        assert!(!step.optional);
        assert!(!step.all);
        assert_eq!(step.action_count(), 1);
    }

    #[test]
    fn test_camel_case_keys() {
        let step: RuleStep = serde_json::from_str(
            r##"{"waitForThenClick": "#reject", "timeout": 500, "optional": true}"##,
        )
        .unwrap();
        assert_eq!(step.wait_for_then_click.as_deref(), Some("#reject"));
        assert_eq!(step.wait_timeout_ms(), 500);
        assert!(step.optional);
        assert!(step.is_mutating());
    }

    #[test]
    fn test_check_modes_parse() {
        for (raw, expected) in [
            ("any", VisibilityCheck::Any),
            ("none", VisibilityCheck::None),
            ("all", VisibilityCheck::All),
        ] {
            let json = format!(r#"{{"visible": "div", "check": "{raw}"}}"#);
            let step: RuleStep = serde_json::from_str(&json).unwrap();
            assert_eq!(step.check, expected);
        }
    }

    #[test]
    fn test_empty_step_has_no_actions() {
        let step: RuleStep = serde_json::from_str("{}").unwrap();
        assert_eq!(step.action_count(), 0);
        assert_eq!(step.wait_timeout_ms(), DEFAULT_WAIT_TIMEOUT_MS);
    }

    #[test]
    fn test_serialization_omits_defaults() {
        let json = serde_json::to_value(RuleStep::click("#accept")).unwrap();
        assert_eq!(json, serde_json::json!({"click": "#accept"}));
    }
}
