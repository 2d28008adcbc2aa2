//! SQL parser: grammar, syntax tree and the adapter producing parse outcomes

pub mod ast;
pub mod engine;
pub mod grammar;

pub use ast::*;
pub use engine::{parse, Engine, ParseOutcome, DEFAULT_CALL_LIMIT, MAX_NESTING_DEPTH};
