use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use consent_bridge::ContentScriptMessage;
use dom_actions::StaticPage;
use tokio::fs;

use super::context::CliContext;
use super::output::emit_structured;
use crate::check::{run_check, CheckReport};

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Page snapshot (JSON)
    pub snapshot: PathBuf,

    /// Click through opt-out once a popup is found
    #[arg(long)]
    pub opt_out: bool,

    /// Rule bundle to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

pub async fn cmd_check(args: CheckArgs, ctx: &CliContext) -> Result<()> {
    let bundle = ctx.load_rules(args.rules.as_deref())?;
    let raw = fs::read_to_string(&args.snapshot)
        .await
        .with_context(|| format!("Failed to read snapshot {}", args.snapshot.display()))?;
    let page = StaticPage::from_json(&raw).context("Failed to parse snapshot")?;

    let report = run_check(bundle, Arc::new(page), ctx.config(), args.opt_out).await?;
    if !emit_structured(ctx.output(), &report)? {
        print_human(&report);
    }
    Ok(())
}

fn print_human(report: &CheckReport) {
    println!("Page: {}", report.url);
    match &report.detected {
        Some(cmp) => println!("Detected: {}", cmp),
        None => println!("Detected: none"),
    }
    if let Some(status) = report.status {
        println!("Status: {}", status.title());
    }
    for message in &report.messages {
        match message {
            ContentScriptMessage::OptOutResult { result, .. } => {
                println!("Opt-out: {}", if *result { "ok" } else { "failed" })
            }
            ContentScriptMessage::SelfTestResult { result, .. } => {
                println!("Self-test: {}", if *result { "passed" } else { "failed" })
            }
            _ => {}
        }
    }
    for click in &report.clicks {
        println!("  clicked {} [{}]", click.selector, click.index);
    }
    if !report.styles.is_empty() {
        println!("  {} prehide rule(s) injected", report.styles.len());
    }
}
