//! Lectern CLI library.
//!
//! This library provides the core functionality for the `lectern` command-line
//! interface: configuration management, the per-item pipeline, command
//! execution, the chat loop and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use pipeline::Pipeline;
