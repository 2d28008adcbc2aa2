//! Command line surface

pub mod args;
pub mod config;
pub mod setup;

pub use args::Args;
pub use config::Config;
pub use setup::init_tracing;
