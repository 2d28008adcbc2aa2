//! sqldump - parse SQL statements and dump their syntax trees
//!
//! Each piece of statement text is parsed into a list of [`Statement`]s and
//! rendered in one of three styles: a box-drawn console tree, indented plain
//! text, or a LaTeX document with `forest` and TikZ trees.
//!
//! # Example
//!
//! ```
//! use sqldump::{OutputMode, Session};
//!
//! let mut session = Session::new(OutputMode::Plaintext, Vec::new(), Vec::new());
//! session.run(Some("SELECT name FROM users"), false, std::io::empty()).unwrap();
//! let (status, tree) = session.into_sinks();
//! assert!(String::from_utf8(status).unwrap().contains("Successful: yes"));
//! assert!(String::from_utf8(tree).unwrap().starts_with("statements\n"));
//! ```

pub mod cli;
pub mod error;
pub mod output;
pub mod parser;
pub mod session;
pub mod tree;

pub use cli::{Args, Config};
pub use error::{Result, SqlError};
pub use output::{OutputMode, Renderer};
pub use parser::{parse, Engine, ParseOutcome, Statement};
pub use session::{Session, SessionSummary};
pub use tree::{Node, ToTree};
