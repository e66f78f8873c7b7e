use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use super::commands::Commands;
use super::output::OutputFormat;

/// How diagnostics are written to stderr
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file; relative `rules_path` entries resolve against its directory
    #[arg(short, long, value_name = "FILE", env = "AUTOCONSENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(
        short,
        long,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Shorthand for `--log-level debug`
    #[arg(short, long)]
    pub debug: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_logs_with_command_rules() {
        let args = CliArgs::try_parse_from([
            "autoconsent",
            "--log-format",
            "json",
            "validate",
            "--rules",
            "bundle.json",
        ])
        .unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.log_level, "warn");
        assert!(matches!(args.command, Commands::Validate(_)));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        assert!(CliArgs::try_parse_from(["autoconsent", "-l", "loud", "validate"]).is_err());
    }
}
