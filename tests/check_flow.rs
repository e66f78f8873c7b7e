use std::sync::Arc;

use autoconsent_cli::{run_check, Config};
use consent_bridge::{ContentScriptMessage, OptOutStatus};
use consent_rules::RuleBundle;
use dom_actions::StaticPage;
use pretty_assertions::assert_eq;

const RULES: &str = include_str!("../rules/rules.json");
const TEST_PAGE: &str = include_str!("fixtures/test-page.json");
const KLARO_PAGE: &str = include_str!("fixtures/klaro-page.json");

fn bundle() -> Arc<RuleBundle> {
    Arc::new(RuleBundle::from_json(RULES).unwrap())
}

fn page(raw: &str) -> Arc<StaticPage> {
    Arc::new(StaticPage::from_json(raw).unwrap())
}

#[tokio::test]
async fn detection_only_does_not_touch_the_page() {
    let page = page(TEST_PAGE);
    let report = run_check(bundle(), page.clone(), &Config::default(), false)
        .await
        .unwrap();

    assert_eq!(report.detected.as_deref(), Some("test-page-cmp"));
    assert_eq!(report.status, Some(OptOutStatus::Available));
    assert!(report.clicks.is_empty());
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.styles.len(), 1);
}

#[tokio::test]
async fn opt_out_runs_through_self_test() {
    let page = page(TEST_PAGE);
    let report = run_check(bundle(), page, &Config::default(), true)
        .await
        .unwrap();

    assert_eq!(report.status, Some(OptOutStatus::Complete));
    assert_eq!(report.clicks.len(), 1);
    assert_eq!(report.clicks[0].selector, "#reject-all");
    assert!(report.messages.iter().any(|m| matches!(
        m,
        ContentScriptMessage::SelfTestResult { result: true, .. }
    )));
}

#[tokio::test]
async fn auto_opt_out_needs_no_click() {
    let config = Config {
        auto_opt_out: true,
        ..Config::default()
    };
    let report = run_check(bundle(), page(TEST_PAGE), &config, false)
        .await
        .unwrap();

    assert_eq!(report.status, Some(OptOutStatus::Complete));
    assert_eq!(report.clicks.len(), 1);
}

#[tokio::test]
async fn failed_opt_out_leaves_tab_working() {
    let report = run_check(bundle(), page(KLARO_PAGE), &Config::default(), true)
        .await
        .unwrap();

    assert_eq!(report.detected.as_deref(), Some("klaro"));
    assert_eq!(report.status, Some(OptOutStatus::Working));
    assert!(report.messages.contains(&ContentScriptMessage::Failure));
    assert!(report.clicks.is_empty());
}

#[tokio::test]
async fn mandatory_opt_out_turns_failure_into_error() {
    let config = Config {
        mandatory_opt_out: true,
        ..Config::default()
    };
    let err = run_check(bundle(), page(KLARO_PAGE), &config, true)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("klaro opt-out did not succeed"));
}
