//! CLI argument parsing

use std::num::NonZeroUsize;

use clap::Parser;

use crate::cli::Config;
use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "sqldump")]
#[command(author, version, about = "Parse SQL statements and dump their syntax trees", long_about = None)]
pub struct Args {
    /// Output generator: console, plaintext or latex (anything else means console)
    #[arg(short, long, env = "SQLDUMP_GENERATOR", value_name = "NAME")]
    pub generator: Option<String>,

    /// Parse a single statement given on the command line
    #[arg(short, long, value_name = "SQL")]
    pub statement: Option<String>,

    /// Read statements from standard input, one per line
    #[arg(short, long)]
    pub interactive: bool,

    /// Write diagnostics to standard output instead of standard error
    #[arg(short = 'o', long = "stdout")]
    pub stdout: bool,

    /// Verbose logging on standard error
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of grammar rule calls per statement
    #[arg(long, env = "SQLDUMP_CALL_LIMIT", default_value = "50000000", value_name = "N")]
    pub call_limit: NonZeroUsize,
}

impl Args {
    pub fn into_config(self) -> Config {
        let mode = self
            .generator
            .as_deref()
            .map(OutputMode::resolve)
            .unwrap_or_default();

        Config {
            mode,
            statement: self.statement,
            interactive: self.interactive,
            diagnostics_to_stdout: self.stdout,
            call_limit: self.call_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DEFAULT_CALL_LIMIT;
    use clap::CommandFactory;

    fn config(argv: &[&str]) -> Config {
        Args::try_parse_from(argv).unwrap().into_config()
    }

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = config(&["sqldump"]);
        assert_eq!(config.mode, OutputMode::Console);
        assert_eq!(config.statement, None);
        assert!(!config.interactive);
        assert!(!config.diagnostics_to_stdout);
        assert_eq!(config.call_limit, DEFAULT_CALL_LIMIT);
    }

    #[test]
    fn test_short_flags() {
        let config = config(&["sqldump", "-g", "latex", "-s", "SELECT 1", "-i", "-o"]);
        assert_eq!(config.mode, OutputMode::Document);
        assert_eq!(config.statement.as_deref(), Some("SELECT 1"));
        assert!(config.interactive);
        assert!(config.diagnostics_to_stdout);
    }

    #[test]
    fn test_long_flags() {
        let config = config(&[
            "sqldump",
            "--generator",
            "plaintext",
            "--statement",
            "DELETE FROM t",
            "--interactive",
            "--stdout",
            "--call-limit",
            "500",
        ]);
        assert_eq!(config.mode, OutputMode::Plaintext);
        assert_eq!(config.statement.as_deref(), Some("DELETE FROM t"));
        assert_eq!(config.call_limit.get(), 500);
    }

    #[test]
    fn test_unknown_generator_is_console() {
        assert_eq!(config(&["sqldump", "-g", "html"]).mode, OutputMode::Console);
    }

    #[test]
    fn test_zero_call_limit_rejected() {
        assert!(Args::try_parse_from(["sqldump", "--call-limit", "0"]).is_err());
    }

    #[test]
    fn test_help_is_reported_as_display_help() {
        let err = Args::try_parse_from(["sqldump", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
