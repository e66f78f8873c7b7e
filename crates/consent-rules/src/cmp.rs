//! Per-CMP rule set

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::RuleStep;

/// Lifecycle phase backed by a rule list
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    DetectCmp,
    DetectPopup,
    OptOut,
    OptIn,
    OpenCmp,
    #[serde(rename = "test")]
    SelfTest,
}

/// How the steps of a phase are scheduled
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PhaseMode {
    /// Every step runs concurrently, results are AND-ed after all settle
    Parallel,
    /// Steps run one after the other, stopping at the first required failure
    Sequential,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::DetectCmp,
        Phase::DetectPopup,
        Phase::OptOut,
        Phase::OptIn,
        Phase::OpenCmp,
        Phase::SelfTest,
    ];

    pub fn mode(self) -> PhaseMode {
        match self {
            Phase::DetectCmp | Phase::DetectPopup => PhaseMode::Parallel,
            Phase::OptOut | Phase::OptIn | Phase::OpenCmp | Phase::SelfTest => {
                PhaseMode::Sequential
            }
        }
    }

    /// Key used for the rule list in the bundle file
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::DetectCmp => "detectCmp",
            Phase::DetectPopup => "detectPopup",
            Phase::OptOut => "optOut",
            Phase::OptIn => "optIn",
            Phase::OpenCmp => "openCmp",
            Phase::SelfTest => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one consent management platform.
///
/// Rule lists are immutable once loaded. A missing list means the phase is
/// unsupported by this CMP.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmpRuleSet {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_cmp: Option<Vec<RuleStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_popup: Option<Vec<RuleStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_out: Option<Vec<RuleStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_in: Option<Vec<RuleStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_cmp: Option<Vec<RuleStep>>,

    #[serde(default, rename = "test", skip_serializing_if = "Option::is_none")]
    pub self_test: Option<Vec<RuleStep>>,

    /// URL prefix of the frame the CMP dialog lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,

    /// Cosmetic selectors hidden before the CMP is handled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prehide_selectors: Vec<String>,

    #[serde(default)]
    pub is_hiding_rule: bool,
}

impl CmpRuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_phase(mut self, phase: Phase, steps: Vec<RuleStep>) -> Self {
        *self.slot_mut(phase) = Some(steps);
        self
    }

    pub fn with_frame(mut self, prefix: impl Into<String>) -> Self {
        self.frame = Some(prefix.into());
        self
    }

    /// Rule list configured for a phase
    pub fn steps(&self, phase: Phase) -> Option<&[RuleStep]> {
        match phase {
            Phase::DetectCmp => self.detect_cmp.as_deref(),
            Phase::DetectPopup => self.detect_popup.as_deref(),
            Phase::OptOut => self.opt_out.as_deref(),
            Phase::OptIn => self.opt_in.as_deref(),
            Phase::OpenCmp => self.open_cmp.as_deref(),
            Phase::SelfTest => self.self_test.as_deref(),
        }
    }

    /// Phases with a configured rule list
    pub fn supported_phases(&self) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|phase| self.steps(*phase).is_some())
            .collect()
    }

    /// Whether `frame_url` belongs to the frame this CMP renders in.
    /// An empty prefix counts as no frame.
    pub fn matches_frame(&self, frame_url: &str) -> bool {
        self.frame
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| frame_url.starts_with(prefix))
            .unwrap_or(false)
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Option<Vec<RuleStep>> {
        match phase {
            Phase::DetectCmp => &mut self.detect_cmp,
            Phase::DetectPopup => &mut self.detect_popup,
            Phase::OptOut => &mut self.opt_out,
            Phase::OptIn => &mut self.opt_in,
            Phase::OpenCmp => &mut self.open_cmp,
            Phase::SelfTest => &mut self.self_test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_modes() {
        assert_eq!(Phase::DetectCmp.mode(), PhaseMode::Parallel);
        assert_eq!(Phase::DetectPopup.mode(), PhaseMode::Parallel);
        for phase in [Phase::OptOut, Phase::OptIn, Phase::OpenCmp, Phase::SelfTest] {
            assert_eq!(phase.mode(), PhaseMode::Sequential);
        }
    }

    #[test]
    fn test_parse_rule_set() {
        let rules: CmpRuleSet = serde_json::from_str(
            r##"{
                "name": "example",
                "detectCmp": [{"exists": "#cmp"}],
                "optOut": [{"click": "#reject"}, {"click": "#close", "optional": true}],
                "test": [{"eval": "EVAL_EXAMPLE_0"}],
                "frame": "https://consent.example.com/",
                "prehideSelectors": ["#cmp"]
            }"##,
        )
        .unwrap();

        assert_eq!(rules.name, "example");
        assert_eq!(rules.steps(Phase::OptOut).map(|s| s.len()), Some(2));
        assert_eq!(rules.steps(Phase::SelfTest).map(|s| s.len()), Some(1));
        assert!(rules.steps(Phase::OptIn).is_none());
        assert!(!rules.is_hiding_rule);
        assert_eq!(
            rules.supported_phases(),
            vec![Phase::DetectCmp, Phase::OptOut, Phase::SelfTest]
        );
    }

    #[test]
    fn test_step_order_preserved() {
        let rules = CmpRuleSet::new("ordered").with_phase(
            Phase::OptOut,
            vec![
                RuleStep::click("#first"),
                RuleStep::click("#second"),
                RuleStep::click("#third"),
            ],
        );
        let clicks: Vec<_> = rules
            .steps(Phase::OptOut)
            .unwrap()
            .iter()
            .filter_map(|s| s.click.as_deref())
            .collect();
        assert_eq!(clicks, vec!["#first", "#second", "#third"]);
    }

    #[test]
    fn test_frame_prefix() {
        let rules = CmpRuleSet::new("framed").with_frame("https://cmp.example.net/");
        assert!(rules.matches_frame("https://cmp.example.net/dialog?x=1"));
        assert!(!rules.matches_frame("https://example.net/"));
        assert!(!CmpRuleSet::new("plain").matches_frame("https://cmp.example.net/"));
    }

    #[test]
    fn test_empty_frame_prefix_matches_nothing() {
        let rules = CmpRuleSet::new("blank").with_frame("");
        assert!(!rules.matches_frame("https://any.example/"));
        assert!(!rules.matches_frame(""));
    }
}
