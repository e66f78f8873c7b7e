//! Content-side session driver
//!
//! One session per page (or frame). It turns the background's `initResp`
//! into a registry, hides known banners, finds the CMP that shows a popup
//! and runs opt-out and self-test on request.

use std::sync::Arc;

use consent_rules::RuleBundle;
use dom_actions::{HideMethod, PageActions};
use rule_engine::builtin::builtin_cmps;
use rule_engine::{must_succeed, CmpRegistry, ConsentCmp, EngineSettings, PhaseRunner};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::errors::BridgeError;
use crate::messages::{BackgroundMessage, ContentScriptMessage};

/// Local knobs that are not part of the handshake
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub engine: EngineSettings,
    pub prehide_method: HideMethod,
    /// Treat an opt-out that returns `false` as an error
    pub mandatory_opt_out: bool,
}

pub struct ContentSession {
    url: String,
    actions: PageActions,
    registry: CmpRegistry,
    options: SessionOptions,
    enabled: bool,
    auto_opt_out: bool,
    cancel: CancellationToken,
    found: Option<Arc<dyn ConsentCmp>>,
}

impl ContentSession {
    /// First message a content script sends
    pub fn init_message(url: impl Into<String>) -> ContentScriptMessage {
        ContentScriptMessage::Init { url: url.into() }
    }

    /// Build a session from the background's `initResp`
    pub fn from_init(
        response: BackgroundMessage,
        url: impl Into<String>,
        actions: PageActions,
        options: SessionOptions,
    ) -> Result<Self, BridgeError> {
        let (rules, enabled, auto_opt_out, disabled_cmps) = match response {
            BackgroundMessage::InitResp {
                rules,
                enabled,
                auto_opt_out,
                disabled_cmps,
            } => (rules, enabled, auto_opt_out, disabled_cmps),
            other => {
                return Err(BridgeError::Protocol(format!(
                    "expected initResp, got {:?}",
                    other
                )))
            }
        };

        let cancel = CancellationToken::new();
        let registry = build_registry(&rules, &actions, &options, &disabled_cmps, cancel.clone());
        Ok(Self {
            url: url.into(),
            actions,
            registry,
            options,
            enabled,
            auto_opt_out,
            cancel,
            found: None,
        })
    }

    pub fn registry(&self) -> &CmpRegistry {
        &self.registry
    }

    pub fn detected(&self) -> Option<&str> {
        self.found.as_ref().map(|cmp| cmp.name())
    }

    /// Stop pending waits; call when the page goes away
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Prehide, detect and, with auto opt-out, opt out right away.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn start(&mut self) -> Result<Vec<ContentScriptMessage>, BridgeError> {
        if !self.enabled {
            debug!("autoconsent disabled");
            return Ok(Vec::new());
        }

        self.prehide().await;

        let mut outbox = Vec::new();
        let Some(cmp) = self.find_popup().await else {
            return Ok(outbox);
        };
        outbox.push(ContentScriptMessage::PopupFound {
            cmp: cmp.name().to_string(),
            url: self.url.clone(),
        });
        self.found = Some(cmp);

        if self.auto_opt_out {
            outbox.extend(self.opt_out().await?);
        }
        Ok(outbox)
    }

    /// React to a background message
    pub async fn handle(
        &mut self,
        message: BackgroundMessage,
    ) -> Result<Vec<ContentScriptMessage>, BridgeError> {
        match message {
            BackgroundMessage::OptOut => self.opt_out().await,
            BackgroundMessage::SelfTest => Ok(vec![self.self_test().await?]),
            other => Err(BridgeError::Protocol(format!(
                "unexpected {:?} after init",
                other
            ))),
        }
    }

    pub async fn opt_out(&self) -> Result<Vec<ContentScriptMessage>, BridgeError> {
        let cmp = self.found.clone().ok_or(BridgeError::NoCmp)?;
        let result = if self.options.mandatory_opt_out {
            must_succeed(format!("{} opt-out", cmp.name()), cmp.opt_out()).await?;
            true
        } else {
            cmp.opt_out().await?
        };
        info!(cmp = cmp.name(), result, "opt-out finished");

        Ok(vec![
            ContentScriptMessage::OptOutResult {
                cmp: cmp.name().to_string(),
                result,
                schedule_self_test: result && cmp.has_self_test(),
                url: self.url.clone(),
            },
            if result {
                ContentScriptMessage::Success
            } else {
                ContentScriptMessage::Failure
            },
        ])
    }

    pub async fn self_test(&self) -> Result<ContentScriptMessage, BridgeError> {
        let cmp = self.found.clone().ok_or(BridgeError::NoCmp)?;
        let result = cmp.self_test().await?;
        info!(cmp = cmp.name(), result, "self-test finished");
        Ok(ContentScriptMessage::SelfTestResult {
            cmp: cmp.name().to_string(),
            result,
            url: self.url.clone(),
        })
    }

    async fn prehide(&self) {
        let selectors: Vec<String> = self
            .candidates()
            .iter()
            .flat_map(|cmp| cmp.prehide_selectors().iter().cloned())
            .collect();
        if let Err(err) = self
            .actions
            .hide(&selectors, self.options.prehide_method)
            .await
        {
            warn!(error = %err, "prehide failed");
        }
    }

    /// Frame-scoped variants when the session URL matches one, all variants
    /// otherwise
    fn candidates(&self) -> Vec<Arc<dyn ConsentCmp>> {
        let framed = self.registry.frames_matching(&self.url);
        if framed.is_empty() {
            self.registry.iter().cloned().collect()
        } else {
            framed
        }
    }

    async fn find_popup(&self) -> Option<Arc<dyn ConsentCmp>> {
        for cmp in self.candidates() {
            match detect(cmp.as_ref()).await {
                Ok(true) => {
                    info!(cmp = cmp.name(), "Detected CMP with open popup");
                    return Some(cmp);
                }
                Ok(false) => {}
                Err(err) => warn!(cmp = cmp.name(), error = %err, "detection failed"),
            }
        }
        debug!("no popup found");
        None
    }
}

async fn detect(cmp: &dyn ConsentCmp) -> rule_engine::Outcome {
    if !cmp.detect_cmp().await? {
        return Ok(false);
    }
    debug!(cmp = cmp.name(), "cmp present, checking popup");
    cmp.detect_popup().await
}

fn build_registry(
    rules: &RuleBundle,
    actions: &PageActions,
    options: &SessionOptions,
    disabled: &[String],
    cancel: CancellationToken,
) -> CmpRegistry {
    let runner = PhaseRunner::new(Arc::new(actions.clone()), options.engine.clone())
        .with_cancel(cancel);
    let mut registry = CmpRegistry::from_bundle(rules, runner, disabled);
    for cmp in builtin_cmps(Arc::new(actions.clone())) {
        registry.register(cmp);
    }
    registry.disable(disabled);
    registry
}
