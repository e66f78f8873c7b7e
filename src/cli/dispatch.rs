use super::check::cmd_check;
use super::env::CliArgs;
use super::frame::cmd_frame;
use super::prehide::cmd_prehide;
use super::validate::cmd_validate;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Validate(args) => cmd_validate(args, ctx).await,
        Commands::Frame(args) => cmd_frame(args, ctx).await,
        Commands::Prehide(args) => cmd_prehide(args, ctx).await,
        Commands::Check(args) => cmd_check(args, ctx).await,
    }
}
