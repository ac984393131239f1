//! Signed request client for the Merchant of Record checkout API.
//!
//! This crate provides everything a partner site needs to talk to the checkout
//! API: HMAC request signing, a dispatcher that surfaces redirects instead of
//! following them, typed helpers for each endpoint, and validation of the
//! signed redirect that returns the shopper after payment.
//!
//! # Modules
//!
//! - [`client`]: Endpoint helpers built on the dispatcher
//! - [`constants`]: Header names, paths and protocol defaults
//! - [`dispatch`]: Request signing, sending and response interpretation
//! - [`error`]: Error types and error handling utilities
//! - [`models`]: Cart and order-status bodies
//! - [`request_signing`]: HMAC signing, timestamps and callback validation
//! - [`settings`]: Configuration management and validation
//! - [`test_support`]: Testing utilities and mocks
//! - [`transport`]: HTTP transport abstraction and the `ureq` implementation

pub mod client;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod request_signing;
pub mod settings;
pub mod test_support;
pub mod transport;
