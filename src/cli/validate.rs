use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use consent_rules::Phase;
use serde::Serialize;
use tracing::warn;

use super::context::CliContext;
use super::output::emit_structured;

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Rule bundle to check instead of the configured one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Serialize)]
struct WarningView<'a> {
    cmp: &'a str,
    phase: Phase,
    step: usize,
    message: &'a str,
}

#[derive(Serialize)]
struct ValidateView<'a> {
    cmps: usize,
    snippets: usize,
    warnings: Vec<WarningView<'a>>,
}

pub async fn cmd_validate(args: ValidateArgs, ctx: &CliContext) -> Result<()> {
    let bundle = ctx.load_rules(args.rules.as_deref())?;
    let report = bundle.validate()?;

    let view = ValidateView {
        cmps: report.cmps,
        snippets: bundle.snippets.len(),
        warnings: report
            .warnings
            .iter()
            .map(|w| WarningView {
                cmp: &w.cmp,
                phase: w.phase,
                step: w.step,
                message: &w.message,
            })
            .collect(),
    };

    if !emit_structured(ctx.output(), &view)? {
        println!(
            "{} CMP rule sets, {} snippets, {} warnings",
            view.cmps,
            view.snippets,
            view.warnings.len()
        );
        for w in &view.warnings {
            println!("  {} {} step {}: {}", w.cmp, w.phase, w.step, w.message);
        }
    }

    for w in &report.warnings {
        warn!(cmp = %w.cmp, phase = %w.phase, step = w.step, "{}", w.message);
    }
    if args.strict && !report.warnings.is_empty() {
        bail!("{} validation warnings", report.warnings.len());
    }
    Ok(())
}
