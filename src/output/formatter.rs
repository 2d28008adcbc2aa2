//! Output modes and the rendering strategies behind them

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use tracing::warn;

use crate::error::SqlError;
use crate::output::console::ConsoleDumper;
use crate::output::forest::ForestDumper;
use crate::output::plaintext::PlaintextDumper;
use crate::output::tikz::TikzDumper;
use crate::output::Dumper;
use crate::parser::ParseOutcome;
use crate::tree::{statements_tree, ToTree};

/// Rendering style of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Plaintext,
    /// Typeset LaTeX output, selected with the name `latex`
    Document,
}

impl OutputMode {
    /// Names accepted on the command line
    pub const NAMES: [&'static str; 3] = ["console", "plaintext", "latex"];

    /// Resolve a generator name; anything unknown falls back to console
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: SqlError| {
            warn!(generator = name, "{}, falling back to console output", e);
            OutputMode::Console
        })
    }

    pub fn is_document(self) -> bool {
        self == OutputMode::Document
    }

    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputMode::Console => Box::new(ConsoleRenderer),
            OutputMode::Plaintext => Box::new(PlaintextRenderer),
            OutputMode::Document => Box::new(DocumentRenderer),
        }
    }
}

impl FromStr for OutputMode {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(OutputMode::Console),
            "plaintext" => Ok(OutputMode::Plaintext),
            "latex" => Ok(OutputMode::Document),
            _ => Err(SqlError::Config(format!(
                "unknown generator '{}' (expected one of: {})",
                s,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Console => write!(f, "console"),
            OutputMode::Plaintext => write!(f, "plaintext"),
            OutputMode::Document => write!(f, "latex"),
        }
    }
}

/// A strategy consuming one parse outcome
pub trait Renderer {
    fn render(&self, outcome: &ParseOutcome, out: &mut dyn Write) -> io::Result<()>;
}

// ============================================================================
// Strategies
// ============================================================================

/// Parse status block, written to the diagnostic sink after every parse
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusRenderer;

impl Renderer for StatusRenderer {
    fn render(&self, outcome: &ParseOutcome, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "SQL parsing status: ")?;
        writeln!(out, "Successful: {}", if outcome.success { "yes" } else { "no" })?;
        writeln!(out, "Messages: ")?;
        for message in &outcome.messages {
            writeln!(out, "{}", message)?;
        }
        writeln!(out)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn render(&self, outcome: &ParseOutcome, out: &mut dyn Write) -> io::Result<()> {
        ConsoleDumper.dump(&statements_tree(&outcome.attribute), out)?;
        write!(out, "\n\n")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextRenderer;

impl Renderer for PlaintextRenderer {
    fn render(&self, outcome: &ParseOutcome, out: &mut dyn Write) -> io::Result<()> {
        PlaintextDumper.dump(&statements_tree(&outcome.attribute), out)?;
        write!(out, "\n\n")
    }
}

/// Typeset rendering: every statement as a forest tree, then every
/// statement again as a TikZ picture. Framing is left to the session.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentRenderer;

impl Renderer for DocumentRenderer {
    fn render(&self, outcome: &ParseOutcome, out: &mut dyn Write) -> io::Result<()> {
        let trees: Vec<_> = outcome.attribute.iter().map(ToTree::to_tree).collect();
        for tree in &trees {
            ForestDumper.dump(tree, out)?;
        }
        for tree in &trees {
            TikzDumper.dump(tree, out)?;
        }
        Ok(())
    }
}
