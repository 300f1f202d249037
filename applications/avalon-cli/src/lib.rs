/// Avalon CLI - command-line tools for Avalon collections and supplemental files
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod progress;

pub use commands::Session;
pub use config::CliConfig;
pub use error::{CliError, Result};
