//! Background coordinator
//!
//! Owns the rule bundle, answers content script handshakes and keeps per-tab
//! opt-out status. Status changes are published on a broadcast channel so a
//! UI layer can render them.

use std::fmt;
use std::sync::Arc;

use consent_rules::RuleBundle;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::errors::BridgeError;
use crate::messages::{BackgroundMessage, ContentScriptMessage};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin of a content script message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSender {
    pub tab: TabId,
    pub frame: FrameId,
    pub url: String,
}

/// Opt-out progress shown for a tab
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptOutStatus {
    Available,
    Working,
    Success,
    Complete,
}

impl OptOutStatus {
    pub fn title(self) -> &'static str {
        match self {
            OptOutStatus::Available => "Click to opt out",
            OptOutStatus::Working => "Processing...",
            OptOutStatus::Success => "Opt out successful!",
            OptOutStatus::Complete => "Opt out complete!",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            OptOutStatus::Available => "icons/cookie.png",
            OptOutStatus::Working => "icons/cog.png",
            OptOutStatus::Success => "icons/party.png",
            OptOutStatus::Complete => "icons/tick.png",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub tab: TabId,
    pub status: OptOutStatus,
}

/// Settings handed to content scripts in the `initResp` handshake
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundSettings {
    pub enabled: bool,
    pub auto_opt_out: bool,
    pub disabled_cmps: Vec<String>,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_opt_out: false,
            disabled_cmps: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct TabState {
    /// Last frame that reported a popup
    frame: Option<FrameId>,
    cmp: Option<String>,
    status: Option<OptOutStatus>,
}

pub struct BackgroundCoordinator {
    rules: Arc<RuleBundle>,
    settings: BackgroundSettings,
    tabs: DashMap<TabId, TabState>,
    events: broadcast::Sender<StatusEvent>,
}

impl BackgroundCoordinator {
    pub fn new(rules: Arc<RuleBundle>, settings: BackgroundSettings) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            rules,
            settings,
            tabs: DashMap::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    pub fn rules(&self) -> &RuleBundle {
        &self.rules
    }

    /// Process one content script message. The returned message, if any, is
    /// the reply for the sending frame.
    pub fn handle_message(
        &self,
        sender: &MessageSender,
        message: ContentScriptMessage,
    ) -> Option<BackgroundMessage> {
        debug!(tab = %sender.tab, frame = sender.frame.0, url = %sender.url, ?message, "received message");
        match message {
            ContentScriptMessage::Init { .. } => Some(BackgroundMessage::InitResp {
                rules: self.rules.as_ref().clone(),
                enabled: self.settings.enabled,
                auto_opt_out: self.settings.auto_opt_out,
                disabled_cmps: self.settings.disabled_cmps.clone(),
            }),
            ContentScriptMessage::PopupFound { cmp, url } => {
                info!(tab = %sender.tab, frame = sender.frame.0, %cmp, %url, "popup found");
                {
                    let mut state = self.tabs.entry(sender.tab).or_default();
                    state.frame = Some(sender.frame);
                    state.cmp = Some(cmp);
                }
                self.set_status(sender.tab, OptOutStatus::Available);
                None
            }
            ContentScriptMessage::OptOutResult {
                cmp,
                result,
                schedule_self_test,
                ..
            } => {
                if !result {
                    warn!(tab = %sender.tab, %cmp, "opt-out did not succeed");
                    return None;
                }
                self.set_status(sender.tab, OptOutStatus::Success);
                schedule_self_test.then_some(BackgroundMessage::SelfTest)
            }
            ContentScriptMessage::SelfTestResult { cmp, result, .. } => {
                if result {
                    self.set_status(sender.tab, OptOutStatus::Complete);
                } else {
                    warn!(tab = %sender.tab, %cmp, "self-test failed");
                }
                None
            }
            ContentScriptMessage::Success => {
                self.set_status(sender.tab, OptOutStatus::Success);
                None
            }
            ContentScriptMessage::Failure => {
                warn!(tab = %sender.tab, "content script reported failure");
                None
            }
        }
    }

    /// User asked to opt out on `tab`: returns the frame to message and the
    /// message to send there.
    pub fn on_action_clicked(&self, tab: TabId) -> Result<(FrameId, BackgroundMessage), BridgeError> {
        let frame = self
            .tabs
            .get(&tab)
            .and_then(|state| state.frame)
            .ok_or(BridgeError::NoPopup(tab))?;
        info!(tab = %tab, frame = frame.0, "page action clicked");
        self.set_status(tab, OptOutStatus::Working);
        Ok((frame, BackgroundMessage::OptOut))
    }

    pub fn status(&self, tab: TabId) -> Option<OptOutStatus> {
        self.tabs.get(&tab).and_then(|state| state.status)
    }

    pub fn detected_cmp(&self, tab: TabId) -> Option<String> {
        self.tabs.get(&tab).and_then(|state| state.cmp.clone())
    }

    /// Drop everything known about a closed tab
    pub fn forget_tab(&self, tab: TabId) {
        self.tabs.remove(&tab);
    }

    /// Record and broadcast a status; repeats of the current one are dropped.
    fn set_status(&self, tab: TabId, status: OptOutStatus) {
        {
            let mut state = self.tabs.entry(tab).or_default();
            if state.status == Some(status) {
                return;
            }
            state.status = Some(status);
        }
        debug!(tab = %tab, ?status, title = status.title(), "status changed");
        let _ = self.events.send(StatusEvent { tab, status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(tab: u64, frame: u64) -> MessageSender {
        MessageSender {
            tab: TabId(tab),
            frame: FrameId(frame),
            url: "https://a.example/".into(),
        }
    }

    #[test]
    fn test_init_replies_with_settings() {
        let settings = BackgroundSettings {
            auto_opt_out: true,
            disabled_cmps: vec!["klaro".into()],
            ..BackgroundSettings::default()
        };
        let coordinator = BackgroundCoordinator::new(Arc::new(RuleBundle::default()), settings);

        let reply = coordinator.handle_message(
            &sender(1, 0),
            ContentScriptMessage::Init {
                url: "https://a.example/".into(),
            },
        );
        assert_eq!(
            reply,
            Some(BackgroundMessage::InitResp {
                rules: RuleBundle::default(),
                enabled: true,
                auto_opt_out: true,
                disabled_cmps: vec!["klaro".into()],
            })
        );
    }

    #[test]
    fn test_click_without_popup_fails() {
        let coordinator =
            BackgroundCoordinator::new(Arc::new(RuleBundle::default()), BackgroundSettings::default());
        let err = coordinator.on_action_clicked(TabId(9)).unwrap_err();
        assert!(matches!(err, BridgeError::NoPopup(TabId(9))));
        assert_eq!(coordinator.status(TabId(9)), None);
    }

    #[test]
    fn test_repeated_status_is_broadcast_once() {
        let coordinator =
            BackgroundCoordinator::new(Arc::new(RuleBundle::default()), BackgroundSettings::default());
        let mut events = coordinator.subscribe();

        coordinator.handle_message(
            &sender(4, 0),
            ContentScriptMessage::OptOutResult {
                cmp: "klaro".into(),
                result: true,
                schedule_self_test: false,
                url: "https://a.example/".into(),
            },
        );
        coordinator.handle_message(&sender(4, 0), ContentScriptMessage::Success);

        assert_eq!(coordinator.status(TabId(4)), Some(OptOutStatus::Success));
        let first = events.try_recv().unwrap();
        assert_eq!(first.status, OptOutStatus::Success);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(OptOutStatus::Available.title(), "Click to opt out");
        assert_eq!(OptOutStatus::Complete.icon(), "icons/tick.png");
    }
}
