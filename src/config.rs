//! Application configuration
//!
//! Loaded from YAML by the CLI; every field has a default so a partial file
//! (or none at all) is valid.

use std::path::PathBuf;

use consent_bridge::{BackgroundSettings, SessionOptions};
use dom_actions::HideMethod;
use rule_engine::EngineSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Rule bundle (`rules.json`)
    pub rules_path: PathBuf,
    pub enabled: bool,
    pub auto_opt_out: bool,
    pub disabled_cmps: Vec<String>,
    pub prehide_method: HideMethod,
    /// Fail the run when opt-out reports `false`
    pub mandatory_opt_out: bool,
    pub engine: EngineSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("rules/rules.json"),
            enabled: true,
            auto_opt_out: false,
            disabled_cmps: Vec::new(),
            prehide_method: HideMethod::default(),
            mandatory_opt_out: false,
            engine: EngineSettings::default(),
        }
    }
}

impl Config {
    pub fn background_settings(&self) -> BackgroundSettings {
        BackgroundSettings {
            enabled: self.enabled,
            auto_opt_out: self.auto_opt_out,
            disabled_cmps: self.disabled_cmps.clone(),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            engine: self.engine.clone(),
            prehide_method: self.prehide_method,
            mandatory_opt_out: self.mandatory_opt_out,
        }
    }
}
