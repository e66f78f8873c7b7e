use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::context::CliContext;
use super::output::emit_structured;

#[derive(Args, Clone, Debug)]
pub struct FrameArgs {
    /// Frame URL to match
    pub url: String,

    /// Rule bundle to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

pub async fn cmd_frame(args: FrameArgs, ctx: &CliContext) -> Result<()> {
    let bundle = ctx.load_rules(args.rules.as_deref())?;
    let matched: Vec<&str> = bundle
        .autoconsent
        .iter()
        .filter(|rules| rules.matches_frame(&args.url))
        .map(|rules| rules.name.as_str())
        .collect();

    if !emit_structured(ctx.output(), &matched)? {
        if matched.is_empty() {
            println!("No frame rules match {}", args.url);
        }
        for name in &matched {
            println!("{}", name);
        }
    }
    Ok(())
}
