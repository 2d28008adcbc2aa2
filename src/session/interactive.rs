//! Interactive read-eval loop

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::Result;
use crate::session::Session;

pub const BANNER: &str = "Give input to parse or type [q or Q] to quit";
pub const PROMPT: &str = "> ";

/// True for the inputs that end the loop: an empty line or a line starting
/// with `q`/`Q`
pub fn is_quit(line: &str) -> bool {
    line.is_empty() || line.starts_with(['q', 'Q'])
}

impl<D: Write, O: Write> Session<D, O> {
    /// Prompt on the diagnostic sink and parse one line at a time from
    /// `input` until end of input or a quit line
    pub fn run_interactive<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        writeln!(self.diagnostics, "{}", BANNER)?;
        self.prompt()?;

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                break;
            }
            writeln!(self.diagnostics)?;

            let statement = line.trim_end_matches(['\n', '\r']);
            if is_quit(statement) {
                debug!("quit requested");
                break;
            }

            self.run_statement(statement)?;
            self.prompt()?;
        }

        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.diagnostics, "\n{}", PROMPT)?;
        self.diagnostics.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;
    use crate::parser::Engine;
    use crate::session::SessionSummary;
    use std::io::Cursor;
    use std::num::NonZeroUsize;

    fn interact(mode: OutputMode, input: &str) -> (usize, String, String) {
        let mut session = Session::new(mode, Vec::new(), Vec::new());
        session.run_interactive(Cursor::new(input.to_string())).unwrap();
        let parsed = session.summary().parsed;
        let (diagnostics, data) = session.into_sinks();
        (
            parsed,
            String::from_utf8(diagnostics).unwrap(),
            String::from_utf8(data).unwrap(),
        )
    }

    #[test]
    fn test_quit_sentinels() {
        assert!(is_quit(""));
        assert!(is_quit("q"));
        assert!(is_quit("Q"));
        assert!(is_quit("quit"));
        assert!(is_quit("Query"));
        assert!(!is_quit("SELECT q FROM t"));
        assert!(!is_quit(" q"));
    }

    #[test]
    fn test_empty_line_stops_before_parsing() {
        let (parsed, diagnostics, data) =
            interact(OutputMode::Plaintext, "DELETE FROM a\n\nDELETE FROM b\n");
        assert_eq!(parsed, 1);
        assert!(data.contains("DELETE FROM a"));
        assert!(!data.contains("DELETE FROM b"));
        assert_eq!(diagnostics.matches("SQL parsing status:").count(), 1);
    }

    #[test]
    fn test_q_alone_parses_nothing() {
        let (parsed, diagnostics, data) = interact(OutputMode::Console, "Q\n");
        assert_eq!(parsed, 0);
        assert!(data.is_empty());
        assert_eq!(diagnostics, format!("{}\n\n{}\n", BANNER, PROMPT));
    }

    #[test]
    fn test_end_of_input_ends_the_loop() {
        let (parsed, _, data) = interact(OutputMode::Plaintext, "DELETE FROM a\nDELETE FROM b");
        assert_eq!(parsed, 2);
        assert!(data.contains("DELETE FROM b"));
    }

    #[test]
    fn test_no_input_at_all() {
        let (parsed, diagnostics, data) = interact(OutputMode::Console, "");
        assert_eq!(parsed, 0);
        assert!(data.is_empty());
        assert_eq!(diagnostics, format!("{}\n\n{}", BANNER, PROMPT));
    }

    #[test]
    fn test_crlf_lines() {
        let (parsed, _, data) = interact(OutputMode::Plaintext, "DELETE FROM a\r\n\r\n");
        assert_eq!(parsed, 1);
        assert!(data.contains("DELETE FROM a\n"));
    }

    #[test]
    fn test_failures_do_not_stop_the_loop() {
        let (parsed, diagnostics, _) = interact(OutputMode::Console, "nonsense\nSELECT 1\nq\n");
        assert_eq!(parsed, 2);
        let no = diagnostics.find("Successful: no").unwrap();
        let yes = diagnostics.find("Successful: yes").unwrap();
        assert!(no < yes);
    }

    #[test]
    fn test_prompt_after_each_statement() {
        let (_, diagnostics, _) = interact(OutputMode::Console, "SELECT 1\nSELECT 2\n");
        assert_eq!(diagnostics.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_large_statement_keeps_the_loop_going() {
        let rows: Vec<String> = (0..1000).map(|i| format!("({}, 'x', 2.5)", i)).collect();
        let input = format!("SELECT 1\nINSERT INTO t VALUES {}\nSELECT 2\n", rows.join(", "));

        let mut session = Session::new(OutputMode::Plaintext, Vec::new(), Vec::new());
        session.run_interactive(Cursor::new(input)).unwrap();
        assert_eq!(session.summary(), SessionSummary { parsed: 3, failed: 0 });

        let (diagnostics, data) = session.into_sinks();
        let diagnostics = String::from_utf8(diagnostics).unwrap();
        assert_eq!(diagnostics.matches("Successful: yes").count(), 3);
        let data = String::from_utf8(data).unwrap();
        assert!(data.contains("INSERT INTO t"));
        assert!(data.ends_with("      2\n\n\n"));
    }

    #[test]
    fn test_parser_giving_up_keeps_the_loop_going() {
        let engine = Engine::new(NonZeroUsize::new(5).unwrap());
        let mut session = Session::with_engine(OutputMode::Console, engine, Vec::new(), Vec::new());
        session
            .run_interactive(Cursor::new("SELECT 1\nSELECT 2\n"))
            .unwrap();
        assert_eq!(session.summary(), SessionSummary { parsed: 2, failed: 2 });

        let (diagnostics, _) = session.into_sinks();
        let diagnostics = String::from_utf8(diagnostics).unwrap();
        assert_eq!(diagnostics.matches("Successful: no").count(), 2);
        assert!(diagnostics.contains("call limit reached"));
    }
}
