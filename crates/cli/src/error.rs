//! CLI error types.

use std::fmt;

use error_stack::Report;
use mor_checkout_common::error::{CallbackError, CheckoutError};

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// Checkout API error
    Api(String),
    /// Callback validation error
    Callback(String),
    /// IO error
    Io(std::io::Error),
    /// JSON parsing error
    Json(String),
    /// Invalid command-line input
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Api(msg) => write!(f, "API error: {}", msg),
            CliError::Callback(msg) => write!(f, "Callback rejected: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::Usage(msg) => write!(f, "Invalid arguments: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err.to_string())
    }
}

// The full report goes to the debug log; the user sees the top-level context.
impl From<Report<CheckoutError>> for CliError {
    fn from(report: Report<CheckoutError>) -> Self {
        log::debug!("{report:?}");
        match report.current_context() {
            CheckoutError::Configuration { message } => CliError::Config(message.clone()),
            other => CliError::Api(other.to_string()),
        }
    }
}

impl From<Report<CallbackError>> for CliError {
    fn from(report: Report<CallbackError>) -> Self {
        log::debug!("{report:?}");
        CliError::Callback(report.current_context().to_string())
    }
}
