//! sqldump CLI - parse SQL and dump syntax trees

use std::io::{self, Write};

use clap::error::ErrorKind;
use clap::Parser;
use sqldump::cli::{init_tracing, Args};
use sqldump::{Config, Session, SqlError};
use tracing::debug;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args.into_config()) {
        eprintln!("{}", error_report(&e));
        std::process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let diagnostics: Box<dyn Write> = if config.diagnostics_to_stdout {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    };

    let mut session = Session::with_engine(config.mode, config.engine(), diagnostics, io::stdout());
    let stdin = io::stdin();
    let summary = session.run(config.statement.as_deref(), config.interactive, stdin.lock())?;
    debug!(parsed = summary.parsed, failed = summary.failed, "run complete");
    Ok(())
}

/// Engine failures and everything else get different prefixes
fn error_report(e: &anyhow::Error) -> String {
    match e.downcast_ref::<SqlError>() {
        Some(SqlError::Engine(msg)) => format!("A runtime error occurred: {}", msg),
        _ => format!("An error occurred: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_report() {
        let e = anyhow::Error::from(SqlError::Engine("Unexpected rule EOI".to_string()));
        assert_eq!(error_report(&e), "A runtime error occurred: Unexpected rule EOI");
    }

    #[test]
    fn test_other_error_report() {
        let io = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let e = anyhow::Error::from(SqlError::from(io));
        assert_eq!(error_report(&e), "An error occurred: IO error: pipe closed");

        let e = anyhow::anyhow!("no terminal");
        assert_eq!(error_report(&e), "An error occurred: no terminal");
    }
}
