//! Parse adapter
//!
//! Wraps the pest grammar behind a single `parse(text) -> ParseOutcome` call.
//! Invalid SQL is a normal outcome (`success == false` with messages), and so
//! is text the parser gives up on: too many rule calls, too little stack, or
//! nesting deeper than the tree builders accept. Only a parse tree the
//! builders cannot make sense of yields [`SqlError::Engine`].

use std::num::NonZeroUsize;
use std::sync::Mutex;

use pest::error::{ErrorVariant, LineColLocation};
use pest::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::ast::Statement;
use crate::parser::grammar::{build_statements, describe_rule, nesting_depth, Rule, SqlParser};

/// Maximum number of rule invocations per parse
///
/// A statement costs in the order of a hundred calls per input byte, so this
/// admits several hundred kilobytes of SQL in one piece of statement text.
pub const DEFAULT_CALL_LIMIT: NonZeroUsize = match NonZeroUsize::new(50_000_000) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// Deepest syntax tree the builders, the tree lowering and the dumpers are
/// handed
pub const MAX_NESTING_DEPTH: usize = 256;

// pest reads its call limit from a process-wide setting when a parse starts
static PARSE_LOCK: Mutex<()> = Mutex::new(());

/// Result of parsing one piece of statement text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub success: bool,
    /// Parser diagnostics, in the order they were produced
    pub messages: Vec<String>,
    /// Every statement found in the text
    pub attribute: Vec<Statement>,
}

impl ParseOutcome {
    pub fn parsed(statements: Vec<Statement>) -> Self {
        Self {
            success: true,
            messages: Vec::new(),
            attribute: statements,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            attribute: Vec::new(),
        }
    }
}

/// The parsing engine with its resource guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    call_limit: NonZeroUsize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_LIMIT)
    }
}

impl Engine {
    pub fn new(call_limit: NonZeroUsize) -> Self {
        Self { call_limit }
    }

    pub fn call_limit(&self) -> NonZeroUsize {
        self.call_limit
    }

    pub fn parse(&self, text: &str) -> Result<ParseOutcome> {
        let parsed = {
            let _guard = PARSE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            pest::set_call_limit(Some(self.call_limit));
            SqlParser::parse(Rule::statements, text)
        };

        let pairs = match parsed {
            Ok(pairs) => pairs,
            Err(e) => {
                if let ErrorVariant::CustomError { message } = &e.variant {
                    warn!(call_limit = %self.call_limit, "parser gave up: {}", message);
                    return Ok(ParseOutcome::rejected(format!(
                        "Statement too complex to parse: {}",
                        message
                    )));
                }

                let (line, col) = match &e.line_col {
                    LineColLocation::Pos(pos) => *pos,
                    LineColLocation::Span(start, _) => *start,
                };
                debug!(line, col, "statement text rejected");
                return Ok(ParseOutcome::rejected(
                    e.renamed_rules(describe_rule).to_string(),
                ));
            }
        };

        let depth = nesting_depth(pairs.clone());
        if depth > MAX_NESTING_DEPTH {
            debug!(depth, "statement text nested too deeply");
            return Ok(ParseOutcome::rejected(format!(
                "Statement nesting depth {} exceeds the limit of {}",
                depth, MAX_NESTING_DEPTH
            )));
        }

        let statements = build_statements(pairs)?;
        debug!(
            statements = statements.len(),
            kinds = ?statements.iter().map(Statement::kind).collect::<Vec<_>>(),
            "statement text accepted"
        );
        Ok(ParseOutcome::parsed(statements))
    }
}

/// Parse with the default engine settings
pub fn parse(text: &str) -> Result<ParseOutcome> {
    Engine::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_statement_succeeds_without_messages() {
        let outcome = parse("SELECT a FROM t").unwrap();
        assert!(outcome.success);
        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.attribute.len(), 1);
    }

    #[test]
    fn test_invalid_statement_is_not_an_error() {
        let outcome = parse("SELECT FROM WHERE").unwrap();
        assert!(!outcome.success);
        assert!(!outcome.messages.is_empty());
        assert!(outcome.attribute.is_empty());
    }

    #[test]
    fn test_rejection_message_points_at_the_input() {
        let outcome = parse("SELECT a FROM t WHERE").unwrap();
        let message = &outcome.messages[0];
        assert!(message.contains("1:22"), "unexpected message: {}", message);
    }

    #[test]
    fn test_multiple_statements_in_one_text() {
        let outcome = parse("SELECT 1; SELECT 2").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.attribute.len(), 2);
    }

    #[test]
    fn test_default_call_limit() {
        assert_eq!(Engine::default().call_limit(), DEFAULT_CALL_LIMIT);
    }

    fn values_insert(rows: usize) -> String {
        let rows: Vec<String> = (0..rows)
            .map(|i| format!("({}, 'name {}', {}.5)", i, i, i))
            .collect();
        format!("INSERT INTO t VALUES {}", rows.join(", "))
    }

    #[test]
    fn test_large_insert_fits_the_default_limit() {
        let outcome = parse(&values_insert(1000)).unwrap();
        assert!(outcome.success, "{:?}", outcome.messages);
        match &outcome.attribute[0] {
            Statement::Insert(insert) => match &insert.source {
                crate::parser::ast::InsertSource::Values(rows) => assert_eq!(rows.len(), 1000),
                other => panic!("Expected VALUES, got {:?}", other),
            },
            other => panic!("Expected INSERT, got {:?}", other),
        }
    }

    #[test]
    fn test_exhausted_call_limit_rejects_only_that_parse() {
        let tiny = Engine::new(NonZeroUsize::new(5).unwrap());
        let outcome = tiny.parse("SELECT a FROM t").unwrap();
        assert!(!outcome.success);
        assert!(outcome.messages[0].contains("call limit reached"), "{:?}", outcome.messages);

        assert!(Engine::default().parse("SELECT a FROM t").unwrap().success);
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let sql = format!("SELECT {}1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&sql).unwrap().success);
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let sql = format!("SELECT {}1{}", "(".repeat(1000), ")".repeat(1000));
        let outcome = parse(&sql).unwrap();
        assert!(!outcome.success);
        assert!(outcome.attribute.is_empty());
    }

    #[test]
    fn test_long_operator_chain_is_rejected() {
        let sql = format!("SELECT 1{}", " + 1".repeat(MAX_NESTING_DEPTH + 50));
        let outcome = parse(&sql).unwrap();
        assert!(!outcome.success);
        assert!(outcome.messages[0].contains("nesting depth"), "{:?}", outcome.messages);
    }

    #[test]
    fn test_outcome_survives_json() {
        for sql in ["SELECT a, COUNT(*) FROM t WHERE b IN (1, 2) GROUP BY a", "SELEC"] {
            let outcome = parse(sql).unwrap();
            let json = serde_json::to_string(&outcome).unwrap();
            let back: ParseOutcome = serde_json::from_str(&json).unwrap();
            assert_eq!(back, outcome);
        }
    }
}
