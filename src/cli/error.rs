//! CLI error types and conversions

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::sp_api::ReportError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    /// Report workflow error, shown as-is
    #[error(transparent)]
    ReportError(#[from] ReportError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),
}
