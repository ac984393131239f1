//! Request signing utilities for the checkout API.
//!
//! This module provides HMAC-SHA256 signing of outgoing requests, the clock
//! used to timestamp them, and validation of the signed redirect callback.

pub mod callback;
pub mod signing;
pub mod timestamp;

pub use callback::*;
pub use signing::*;
pub use timestamp::*;
