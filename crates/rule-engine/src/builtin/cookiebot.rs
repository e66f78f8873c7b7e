use std::sync::Arc;

use async_trait::async_trait;
use dom_actions::ConsentActions;
use tracing::{debug, info};

use crate::cmp::ConsentCmp;
use crate::errors::Outcome;

const PRESENT: &str = "!!window.Cookiebot";
const POPUP_SHOWN: &str =
    "!window.Cookiebot.hasResponse && window.Cookiebot.dialog?.visible === true";
const WITHDRAW: &str = "window.Cookiebot.withdraw() || true";
const HIDE: &str = "window.Cookiebot.hide() || true";
const RENEW: &str = "window.Cookiebot.renew() || true";
const DECLINED: &str = "window.Cookiebot.declined === true";
const ALLOW_ALL: &str = "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll";

const PREHIDE: [&str; 4] = [
    "#CybotCookiebotDialog",
    "#dtcookie-container",
    "#cookiebanner",
    "#cb-cookieoverlay",
];

/// Cookiebot, driven through its page-level JavaScript API
pub struct Cookiebot {
    actions: Arc<dyn ConsentActions>,
    prehide: Vec<String>,
}

impl Cookiebot {
    pub const NAME: &'static str = "Cybotcookiebot";

    pub fn new(actions: Arc<dyn ConsentActions>) -> Self {
        Self {
            actions,
            prehide: PREHIDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ConsentCmp for Cookiebot {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn prehide_selectors(&self) -> &[String] {
        &self.prehide
    }

    async fn detect_cmp(&self) -> Outcome {
        Ok(self.actions.eval(PRESENT).await?)
    }

    async fn detect_popup(&self) -> Outcome {
        Ok(self.actions.eval(POPUP_SHOWN).await?)
    }

    async fn opt_out(&self) -> Outcome {
        info!(cmp = Self::NAME, "Initiated optOut()");
        if !self.actions.eval(WITHDRAW).await? {
            debug!("withdraw reported failure");
            return Ok(false);
        }
        Ok(self.actions.eval(HIDE).await?)
    }

    async fn opt_in(&self) -> Outcome {
        Ok(self.actions.click(ALLOW_ALL, false).await?)
    }

    async fn open_cmp(&self) -> Outcome {
        Ok(self.actions.eval(RENEW).await?)
    }

    async fn self_test(&self) -> Outcome {
        Ok(self.actions.eval(DECLINED).await?)
    }
}
