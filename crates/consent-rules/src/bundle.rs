//! Rule bundle loading and validation

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cmp::{CmpRuleSet, Phase, PhaseMode};
use crate::errors::RulesError;
use crate::snippets::SnippetTable;

/// Everything shipped in a `rules.json` file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBundle {
    #[serde(default)]
    pub autoconsent: Vec<CmpRuleSet>,

    #[serde(default, skip_serializing_if = "SnippetTable::is_empty")]
    pub snippets: SnippetTable,
}

/// Non-fatal findings of [`RuleBundle::validate`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationWarning {
    pub cmp: String,
    pub phase: Phase,
    pub step: usize,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub cmps: usize,
    pub warnings: Vec<ValidationWarning>,
}

impl RuleBundle {
    pub fn from_json(raw: &str) -> Result<Self, RulesError> {
        let bundle: RuleBundle = serde_json::from_str(raw)?;
        debug!(
            cmps = bundle.autoconsent.len(),
            snippets = bundle.snippets.len(),
            "parsed rule bundle"
        );
        Ok(bundle)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json(&raw)?;
        info!(path = %path.display(), cmps = bundle.autoconsent.len(), "loaded rule bundle");
        Ok(bundle)
    }

    pub fn get(&self, name: &str) -> Option<&CmpRuleSet> {
        self.autoconsent.iter().find(|rules| rules.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.autoconsent.iter().map(|rules| rules.name.as_str())
    }

    /// Check structural constraints.
    ///
    /// Empty and duplicate names are errors. Clicks inside parallel phases and
    /// snippet ids that are not in the table are reported as warnings.
    pub fn validate(&self) -> Result<ValidationReport, RulesError> {
        let mut seen = HashSet::new();
        let mut report = ValidationReport {
            cmps: self.autoconsent.len(),
            warnings: Vec::new(),
        };

        for (index, rules) in self.autoconsent.iter().enumerate() {
            if rules.name.trim().is_empty() {
                return Err(RulesError::EmptyName { index });
            }
            if !seen.insert(rules.name.as_str()) {
                return Err(RulesError::DuplicateName(rules.name.clone()));
            }

            for phase in Phase::ALL {
                let Some(steps) = rules.steps(phase) else {
                    continue;
                };
                for (step_index, step) in steps.iter().enumerate() {
                    let mut warn = |message: String| {
                        report.warnings.push(ValidationWarning {
                            cmp: rules.name.clone(),
                            phase,
                            step: step_index,
                            message,
                        })
                    };
                    if phase.mode() == PhaseMode::Parallel && step.is_mutating() {
                        warn("click action inside a parallel phase".to_string());
                    }
                    if let Some(expression) = step.eval.as_deref() {
                        if looks_like_snippet_id(expression)
                            && self.snippets.get(expression).is_none()
                        {
                            warn(format!("unknown snippet id {}", expression));
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}

fn looks_like_snippet_id(expression: &str) -> bool {
    expression.starts_with("EVAL_")
        && expression
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
