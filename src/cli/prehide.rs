use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use dom_actions::{hiding_rule, HideMethod};
use serde::Serialize;

use super::context::CliContext;
use super::output::emit_structured;

#[derive(Args, Clone, Debug)]
pub struct PrehideArgs {
    /// Only include these CMPs
    #[arg(long = "cmp", value_name = "NAME")]
    pub cmps: Vec<String>,

    /// Hide with `opacity: 0` instead of `display: none`
    #[arg(long)]
    pub opacity: bool,

    /// Rule bundle to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

#[derive(Serialize)]
struct PrehideView {
    selectors: Vec<String>,
    css: String,
}

pub async fn cmd_prehide(args: PrehideArgs, ctx: &CliContext) -> Result<()> {
    let bundle = ctx.load_rules(args.rules.as_deref())?;
    for name in &args.cmps {
        if bundle.get(name).is_none() {
            bail!("unknown cmp {}", name);
        }
    }

    let selectors: Vec<String> = bundle
        .autoconsent
        .iter()
        .filter(|rules| args.cmps.is_empty() || args.cmps.contains(&rules.name))
        .filter(|rules| !ctx.config().disabled_cmps.contains(&rules.name))
        .flat_map(|rules| rules.prehide_selectors.iter().cloned())
        .collect();
    let method = if args.opacity {
        HideMethod::Opacity
    } else {
        ctx.config().prehide_method
    };
    let css = if selectors.is_empty() {
        String::new()
    } else {
        hiding_rule(&selectors, method)
    };

    let view = PrehideView { selectors, css };
    if !emit_structured(ctx.output(), &view)? {
        println!("{}", view.css.trim_end());
    }
    Ok(())
}
