//! Dry run of the full content/background flow against a page snapshot

use std::sync::Arc;

use consent_bridge::{
    BackgroundCoordinator, BridgeError, ContentScriptMessage, ContentSession,
    FrameId, MessageSender, OptOutStatus, TabId,
};
use consent_rules::RuleBundle;
use dom_actions::{PageActions, StaticPage};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;

const TAB: TabId = TabId(1);
const FRAME: FrameId = FrameId(0);

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecord {
    pub selector: String,
    pub index: usize,
}

/// What a dry run observed
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub url: String,
    pub detected: Option<String>,
    pub status: Option<OptOutStatus>,
    /// Content script messages in the order they were sent
    pub messages: Vec<ContentScriptMessage>,
    pub clicks: Vec<ClickRecord>,
    pub styles: Vec<String>,
}

/// Drive one page through handshake, detection and, when `opt_out` is set
/// (or the config enables auto opt-out), opt-out and self-test.
pub async fn run_check(
    bundle: Arc<RuleBundle>,
    page: Arc<StaticPage>,
    config: &Config,
    opt_out: bool,
) -> Result<CheckReport, BridgeError> {
    let url = page.url();
    let background = BackgroundCoordinator::new(bundle, config.background_settings());
    let sender = MessageSender {
        tab: TAB,
        frame: FRAME,
        url: url.clone(),
    };

    let init = background
        .handle_message(&sender, ContentSession::init_message(url.clone()))
        .ok_or_else(|| BridgeError::Protocol("no reply to init".into()))?;
    let mut session = ContentSession::from_init(
        init,
        url.clone(),
        PageActions::new(page.clone()),
        config.session_options(),
    )?;

    let mut sent = Vec::new();
    let mut pending = session.start().await?;
    let mut requested_opt_out = false;

    loop {
        let mut replies = Vec::new();
        for message in pending.drain(..) {
            sent.push(message.clone());
            replies.extend(background.handle_message(&sender, message));
        }

        if replies.is_empty()
            && opt_out
            && !requested_opt_out
            && background.status(TAB) == Some(OptOutStatus::Available)
        {
            let (_, request) = background.on_action_clicked(TAB)?;
            requested_opt_out = true;
            replies.push(request);
        }
        if replies.is_empty() {
            break;
        }
        for reply in replies {
            debug!(?reply, "delivering to content session");
            pending.extend(session.handle(reply).await?);
        }
    }
    session.teardown();

    let report = CheckReport {
        url,
        detected: session.detected().map(str::to_string),
        status: background.status(TAB),
        messages: sent,
        clicks: page
            .clicks()
            .into_iter()
            .map(|(selector, index)| ClickRecord { selector, index })
            .collect(),
        styles: page.styles(),
    };
    info!(detected = ?report.detected, status = ?report.status, "check finished");
    Ok(report)
}
