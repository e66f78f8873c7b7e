use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Engine tuning passed in at construction time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Delay between poll attempts of the wait actions
    pub poll_interval_ms: u64,
    /// Log every step and its result at debug level
    pub trace_steps: bool,
}

impl EngineSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Retries that fit into `timeout_ms` at the configured interval
    pub fn attempts_for(&self, timeout_ms: u64) -> u32 {
        let attempts = timeout_ms / self.poll_interval_ms.max(1);
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            trace_steps: false,
        }
    }
}
