//! HTTP transport abstraction.
//!
//! The dispatcher builds fully signed [`HttpRequest`]s and hands them to a
//! [`Transport`]. Transports only move bytes: they never follow redirects and
//! never interpret status codes, so a 3xx or 4xx comes back as an ordinary
//! [`HttpResponse`]. Only failures to complete the exchange are errors.

use std::time::Duration;

use error_stack::Report;
use http::header::{HeaderName, LOCATION};
use http::Method;

use crate::error::CheckoutError;

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(HeaderName, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Returns the first value for `name`, if present.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back over the wire, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

/// Sends a request and returns the raw response.
pub trait Transport {
    /// # Errors
    ///
    /// Returns [`CheckoutError::Transport`] when no response could be read.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Report<CheckoutError>>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// Certificate verification uses the agent's default TLS configuration and
/// cannot be turned off.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Builds a transport that surfaces redirects and non-2xx statuses as
    /// responses. `timeout` bounds the whole exchange when set.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .max_redirects(0)
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

fn transport_error(request: &HttpRequest, err: &ureq::Error) -> Report<CheckoutError> {
    Report::new(CheckoutError::Transport {
        message: format!("{} {} failed: {}", request.method, request.url, err),
    })
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Report<CheckoutError>> {
        let result = if request.method == Method::GET {
            let mut builder = self.agent.get(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        } else if request.method == Method::POST {
            let mut builder = self.agent.post(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send(request.body.as_deref().unwrap_or_default())
        } else {
            return Err(Report::new(CheckoutError::InvalidRequest {
                message: format!("Unsupported HTTP method: {}", request.method),
            }));
        };

        let response = result.map_err(|e| transport_error(request, &e))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| transport_error(request, &e))?;

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}
