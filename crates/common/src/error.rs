//! Error types for the checkout client.
//!
//! Errors are carried as [`error_stack::Report`] contexts so callers get the
//! full chain of attachments when something fails deep inside a dispatch.

use derive_more::Display;

/// Errors raised while building, sending or interpreting an API call.
#[derive(Debug, Display)]
pub enum CheckoutError {
    /// Connection, TLS, timeout or I/O failure before a response was read.
    #[display("Transport error: {message}")]
    Transport { message: String },

    /// The upstream answered with a body that is not valid JSON.
    #[display("Malformed response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    /// The request body could not be serialized.
    #[display("Serialization error: {message}")]
    Serialization { message: String },

    /// The caller supplied an argument the API cannot accept.
    #[display("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Settings are missing, unparseable or fail validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },
}

impl core::error::Error for CheckoutError {}

impl CheckoutError {
    /// Whether repeating the same call could succeed.
    ///
    /// Only transport failures qualify; everything else is terminal for the
    /// request that produced it.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Reasons a redirect-return callback is rejected.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum CallbackError {
    #[display("Missing required callback parameter: {name}")]
    MissingParameter { name: String },

    #[display("Return URL could not be parsed: {message}")]
    InvalidReturnUrl { message: String },

    #[display("Callback timestamp expired ({age_secs}s old), possible replay")]
    ExpiredTimestamp { age_secs: i64 },

    #[display("Callback timestamp is {skew_secs}s in the future")]
    TimestampInFuture { skew_secs: i64 },

    #[display("Unparseable callback timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[display("Callback nonce does not match")]
    InvalidSignature,
}

impl core::error::Error for CallbackError {}
