//! CLI command implementations

pub mod download;
pub mod error;

pub use download::{Cli, Commands, DownloadArgs, OutputFormat};
pub use error::CliError;
