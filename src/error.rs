//! Error types for sqldump
//!
//! A statement that fails to parse is not an error: it is reported through
//! [`ParseOutcome`](crate::parser::ParseOutcome) with `success == false`.
//! The variants here abort a run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlError {
    /// The tree builders met a parse tree they cannot interpret
    #[error("{0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SqlError>;
