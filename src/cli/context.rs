use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use consent_rules::RuleBundle;
use tracing::debug;

use super::output::OutputFormat;
use crate::config::Config;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Load the rule bundle from `over` or the configured path
    pub fn load_rules(&self, over: Option<&Path>) -> Result<Arc<RuleBundle>> {
        let path = over.unwrap_or(self.config.rules_path.as_path());
        debug!(path = %path.display(), config = %self.config_path.display(), "loading rules");
        let bundle = RuleBundle::from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
        Ok(Arc::new(bundle))
    }
}
