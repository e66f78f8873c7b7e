use std::sync::Arc;

use consent_rules::RuleBundle;
use dom_actions::{ElementLayout, PageActions, PageEvent, PageSnapshot, StaticPage};
use rule_engine::builtin::{builtin_cmps, Cookiebot};
use rule_engine::{CmpRegistry, ConsentCmp, EngineSettings, PhaseRunner, UnresolvedCmp};
use serde_json::json;

const RULES: &str = include_str!("../../../rules/rules.json");

fn bundle() -> RuleBundle {
    RuleBundle::from_json(RULES).unwrap()
}

fn registry_for(page: &Arc<StaticPage>, disabled: &[String]) -> CmpRegistry {
    let runner = PhaseRunner::new(
        Arc::new(PageActions::new(page.clone())),
        EngineSettings::default(),
    );
    CmpRegistry::from_bundle(&bundle(), runner, disabled)
}

#[test]
fn builds_one_variant_per_rule_set_in_order() {
    let page = Arc::new(StaticPage::new(PageSnapshot::default()));
    let registry = registry_for(&page, &[]);
    let bundle = bundle();

    assert_eq!(registry.len(), bundle.autoconsent.len());
    assert_eq!(registry.names(), bundle.names().collect::<Vec<_>>());
}

#[test]
fn disabled_names_are_skipped() {
    let page = Arc::new(StaticPage::new(PageSnapshot::default()));
    let registry = registry_for(&page, &["klaro".to_string()]);

    assert!(registry.get("klaro").is_none());
    assert!(registry.get("onetrust").is_some());
}

#[test]
fn frame_lookup_uses_prefix() {
    let page = Arc::new(StaticPage::new(PageSnapshot::default()));
    let registry = registry_for(&page, &[]);

    let matched = registry.frames_matching("https://cdn.privacy-mgmt.com/index.html?message_id=1");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name(), "sourcepoint-frame");
    assert!(registry
        .frames_matching("https://cdn.example.com/")
        .is_empty());
}

#[test]
fn register_replaces_same_name() {
    let page = Arc::new(StaticPage::new(PageSnapshot::default()));
    let mut registry = registry_for(&page, &[]);
    let before = registry.len();

    for cmp in builtin_cmps(Arc::new(PageActions::new(page.clone()))) {
        registry.register(cmp);
    }
    assert_eq!(registry.len(), before + 1);

    registry.register(Arc::new(UnresolvedCmp::new(Cookiebot::NAME)));
    assert_eq!(registry.len(), before + 1);
    assert!(registry
        .get(Cookiebot::NAME)
        .unwrap()
        .prehide_selectors()
        .is_empty());

    registry.disable(&[Cookiebot::NAME.to_string()]);
    assert_eq!(registry.len(), before);
}

#[tokio::test]
async fn test_page_cmp_full_lifecycle() {
    let bundle = bundle();
    let snippet = bundle.snippets.get("EVAL_TESTCMP_0").unwrap();
    let expanded = format!("({})()", snippet);

    let mut snapshot = PageSnapshot::default();
    snapshot.elements.insert(
        "#privacy-test-page-cmp-test".into(),
        vec![ElementLayout::shown()],
    );
    snapshot
        .elements
        .insert("#reject-all".into(), vec![ElementLayout::shown()]);
    snapshot.evals.insert(expanded.clone(), json!(true));
    let page = Arc::new(StaticPage::new(snapshot));

    let registry = registry_for(&page, &[]);
    let cmp = registry.get("test-page-cmp").unwrap();

    assert!(cmp.detect_cmp().await.unwrap());
    assert!(cmp.detect_popup().await.unwrap());
    assert!(cmp.opt_out().await.unwrap());
    assert!(cmp.has_self_test());
    assert!(cmp.self_test().await.unwrap());

    assert_eq!(page.clicks(), vec![("#reject-all".to_string(), 0)]);
    assert!(page.journal().contains(&PageEvent::Eval(expanded)));
    assert_eq!(cmp.prehide_selectors(), ["#reject-all".to_string()]);
}
