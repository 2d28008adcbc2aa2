//! Resolved run configuration

use std::num::NonZeroUsize;

use crate::output::OutputMode;
use crate::parser::{Engine, DEFAULT_CALL_LIMIT};

/// Everything a run needs, fixed before the first statement is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: OutputMode,
    /// One-shot statement, run before the interactive loop
    pub statement: Option<String>,
    pub interactive: bool,
    /// Route the diagnostic sink to stdout
    pub diagnostics_to_stdout: bool,
    pub call_limit: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            statement: None,
            interactive: false,
            diagnostics_to_stdout: false,
            call_limit: DEFAULT_CALL_LIMIT,
        }
    }
}

impl Config {
    pub fn engine(&self) -> Engine {
        Engine::new(self.call_limit)
    }
}
