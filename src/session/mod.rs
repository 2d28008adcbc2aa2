//! Session driver
//!
//! A session owns the two output sinks and the selected renderer for the
//! whole run. Diagnostics (status blocks, prompts, parser messages) only ever
//! go to the diagnostic sink; rendered trees and document framing only ever
//! go to the data sink.

pub mod interactive;

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::error::Result;
use crate::output::{latex, OutputMode, Renderer, StatusRenderer};
use crate::parser::Engine;

/// Counters reported when a session ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Statement texts handed to the parser
    pub parsed: usize,
    /// How many of those were rejected
    pub failed: usize,
}

pub struct Session<D: Write, O: Write> {
    mode: OutputMode,
    engine: Engine,
    renderer: Box<dyn Renderer>,
    diagnostics: D,
    data: O,
    summary: SessionSummary,
}

impl<D: Write, O: Write> Session<D, O> {
    pub fn new(mode: OutputMode, diagnostics: D, data: O) -> Self {
        Self::with_engine(mode, Engine::default(), diagnostics, data)
    }

    pub fn with_engine(mode: OutputMode, engine: Engine, diagnostics: D, data: O) -> Self {
        Self {
            mode,
            engine,
            renderer: mode.renderer(),
            diagnostics,
            data,
            summary: SessionSummary::default(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Give back the sinks, mainly so callers can inspect captured output
    pub fn into_sinks(self) -> (D, O) {
        (self.diagnostics, self.data)
    }

    /// Drive a whole run: optional one-shot statement first, then the
    /// interactive loop if requested. In document mode the output is framed
    /// by the LaTeX header and footer, and the footer is written even if the
    /// run stops on an error.
    pub fn run<R: BufRead>(
        &mut self,
        statement: Option<&str>,
        interactive: bool,
        input: R,
    ) -> Result<SessionSummary> {
        info!(mode = %self.mode, interactive, one_shot = statement.is_some(), "session started");

        self.begin()?;
        let result = self.drive(statement, interactive, input);
        let finished = self.finish();
        result?;
        finished?;

        info!(
            parsed = self.summary.parsed,
            failed = self.summary.failed,
            "session finished"
        );
        Ok(self.summary)
    }

    fn drive<R: BufRead>(
        &mut self,
        statement: Option<&str>,
        interactive: bool,
        input: R,
    ) -> Result<()> {
        if let Some(statement) = statement {
            self.run_statement(statement)?;
        }
        if interactive {
            self.run_interactive(input)?;
        }
        Ok(())
    }

    /// Write the document header when in document mode
    pub fn begin(&mut self) -> Result<()> {
        if self.mode.is_document() {
            self.data.write_all(latex::header().as_bytes())?;
        }
        Ok(())
    }

    /// Write the document footer when in document mode and flush both sinks
    pub fn finish(&mut self) -> Result<()> {
        if self.mode.is_document() {
            self.data.write_all(latex::footer().as_bytes())?;
        }
        self.data.flush()?;
        self.diagnostics.flush()?;
        Ok(())
    }

    /// One parse-and-render cycle: status block to the diagnostic sink, then
    /// the selected rendering to the data sink
    pub fn run_statement(&mut self, text: &str) -> Result<()> {
        let outcome = self.engine.parse(text)?;

        self.summary.parsed += 1;
        if !outcome.success {
            self.summary.failed += 1;
        }
        debug!(success = outcome.success, messages = outcome.messages.len(), "rendering outcome");

        StatusRenderer.render(&outcome, &mut self.diagnostics)?;
        self.diagnostics.flush()?;
        self.renderer.render(&outcome, &mut self.data)?;
        self.data.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(mode: OutputMode) -> Session<Vec<u8>, Vec<u8>> {
        Session::new(mode, Vec::new(), Vec::new())
    }

    fn outputs(session: Session<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (diagnostics, data) = session.into_sinks();
        (
            String::from_utf8(diagnostics).unwrap(),
            String::from_utf8(data).unwrap(),
        )
    }

    #[test]
    fn test_one_shot_routes_status_and_data_apart() {
        let mut s = session(OutputMode::Console);
        s.run(Some("SELECT a FROM t"), false, Cursor::new("")).unwrap();
        let (diagnostics, data) = outputs(s);

        assert!(diagnostics.contains("Successful: yes"));
        assert!(!diagnostics.contains("statements"));
        assert!(data.starts_with("statements\n"));
        assert!(!data.contains("Successful"));
    }

    #[test]
    fn test_syntax_failure_is_reported_not_raised() {
        let mut s = session(OutputMode::Plaintext);
        let summary = s.run(Some("SELECT FROM"), false, Cursor::new("")).unwrap();
        assert_eq!(summary, SessionSummary { parsed: 1, failed: 1 });

        let (diagnostics, data) = outputs(s);
        assert!(diagnostics.contains("Successful: no"));
        assert_eq!(data, "statements\n\n\n");
    }

    #[test]
    fn test_document_mode_without_statements_is_header_and_footer() {
        let mut s = session(OutputMode::Document);
        let summary = s.run(None, false, Cursor::new("")).unwrap();
        assert_eq!(summary, SessionSummary::default());

        let (diagnostics, data) = outputs(s);
        assert_eq!(data, latex::header() + &latex::footer());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_document_mode_frames_the_renderings() {
        let mut s = session(OutputMode::Document);
        s.run(Some("SELECT a FROM t"), false, Cursor::new("")).unwrap();
        let (_, data) = outputs(s);

        assert!(data.starts_with(&latex::header()));
        assert!(data.ends_with(&latex::footer()));
        assert_eq!(data.matches("\\begin{document}").count(), 1);
        assert_eq!(data.matches("\\end{document}").count(), 1);
        assert!(data.contains("\\begin{forest}"));
        assert!(data.contains("\\begin{tikzpicture}"));
    }

    #[test]
    fn test_non_document_modes_have_no_framing() {
        for mode in [OutputMode::Console, OutputMode::Plaintext] {
            let mut s = session(mode);
            s.run(None, false, Cursor::new("")).unwrap();
            let (diagnostics, data) = outputs(s);
            assert!(diagnostics.is_empty());
            assert!(data.is_empty());
        }
    }

    #[test]
    fn test_one_shot_runs_before_interactive() {
        let mut s = session(OutputMode::Plaintext);
        let summary = s
            .run(Some("DELETE FROM first"), true, Cursor::new("DELETE FROM second\n"))
            .unwrap();
        assert_eq!(summary.parsed, 2);

        let (_, data) = outputs(s);
        let first = data.find("DELETE FROM first").unwrap();
        let second = data.find("DELETE FROM second").unwrap();
        assert!(first < second);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_footer_written_when_the_run_fails() {
        let mut s = Session::new(OutputMode::Document, BrokenPipe, Vec::new());
        let err = s.run(Some("SELECT 1"), false, Cursor::new("")).unwrap_err();
        assert!(matches!(err, crate::error::SqlError::Io(_)));

        let (_, data) = s.into_sinks();
        assert_eq!(String::from_utf8(data).unwrap(), latex::header() + &latex::footer());
    }

    #[test]
    fn test_deeply_nested_statement_is_reported_not_fatal() {
        let sql = format!("SELECT {}1{}", "(".repeat(1000), ")".repeat(1000));
        let mut s = session(OutputMode::Console);
        let summary = s.run(Some(&sql), false, Cursor::new("")).unwrap();
        assert_eq!(summary, SessionSummary { parsed: 1, failed: 1 });

        let (diagnostics, data) = outputs(s);
        assert!(diagnostics.contains("Successful: no"));
        assert_eq!(data, "statements\n\n\n");
    }
}
