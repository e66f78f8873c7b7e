//! Wire messages between content scripts and the background coordinator.
//!
//! Both directions are JSON objects tagged by `type`, with camelCase keys.

use consent_rules::RuleBundle;
use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

/// Sent by a content script
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ContentScriptMessage {
    Init {
        url: String,
    },
    PopupFound {
        cmp: String,
        url: String,
    },
    OptOutResult {
        cmp: String,
        result: bool,
        schedule_self_test: bool,
        url: String,
    },
    SelfTestResult {
        cmp: String,
        result: bool,
        url: String,
    },
    Success,
    Failure,
}

/// Sent by the background coordinator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BackgroundMessage {
    InitResp {
        rules: RuleBundle,
        enabled: bool,
        auto_opt_out: bool,
        #[serde(default)]
        disabled_cmps: Vec<String>,
    },
    OptOut,
    SelfTest,
}

impl ContentScriptMessage {
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl BackgroundMessage {
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_content_message_shape() {
        let msg = ContentScriptMessage::OptOutResult {
            cmp: "klaro".into(),
            result: true,
            schedule_self_test: false,
            url: "https://a.example/".into(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "optOutResult",
                "cmp": "klaro",
                "result": true,
                "scheduleSelfTest": false,
                "url": "https://a.example/"
            })
        );
        assert_eq!(
            serde_json::to_value(ContentScriptMessage::Success).unwrap(),
            json!({ "type": "success" })
        );
    }

    #[test]
    fn test_background_message_parse() {
        let raw = r#"{"type":"initResp","rules":{"autoconsent":[],"snippets":{}},"enabled":true,"autoOptOut":false,"disabledCmps":["klaro"]}"#;
        match BackgroundMessage::from_json(raw).unwrap() {
            BackgroundMessage::InitResp {
                enabled,
                auto_opt_out,
                disabled_cmps,
                ..
            } => {
                assert!(enabled);
                assert!(!auto_opt_out);
                assert_eq!(disabled_cmps, vec!["klaro".to_string()]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(
            BackgroundMessage::from_json(r#"{"type":"optOut"}"#).unwrap(),
            BackgroundMessage::OptOut
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = ContentScriptMessage::from_json(r#"{"type":"reload"}"#).unwrap_err();
        assert!(matches!(err, BridgeError::Codec(_)));
    }
}
