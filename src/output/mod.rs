//! Output formatting
//!
//! Dumpers turn a [`Node`](crate::tree::Node) tree into text in one style;
//! renderers decide which dumpers run for a parse outcome and where framing
//! goes.

pub mod console;
pub mod dumper;
pub mod forest;
pub mod formatter;
pub mod latex;
pub mod plaintext;
pub mod tikz;

pub use dumper::Dumper;
pub use formatter::{
    ConsoleRenderer, DocumentRenderer, OutputMode, PlaintextRenderer, Renderer, StatusRenderer,
};
