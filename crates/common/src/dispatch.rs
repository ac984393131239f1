//! Signs requests, sends them and interprets what comes back.

use error_stack::{Report, ResultExt};
use http::header::CONTENT_TYPE;
use http::Method;
use serde::de::DeserializeOwned;

use crate::constants::{
    CONTENT_TYPE_JSON, HEADER_SPT_MOR_DOMAIN, HEADER_SPT_MOR_SIGNATURE, HEADER_SPT_MOR_TIMESTAMP,
    MAX_ERROR_BODY_CHARS,
};
use crate::error::CheckoutError;
use crate::request_signing::{format_timestamp, Clock, RequestSigner, SignedRequest, SigningPayload};
use crate::transport::{HttpRequest, Transport};

/// Outcome of a round trip that produced an HTTP response.
///
/// Non-2xx statuses with a JSON body are application-level answers, not
/// errors, and arrive as [`ApiResponse::Json`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// A 3xx answer. `location` is the `Location` header verbatim.
    Redirect {
        status: u16,
        location: Option<String>,
    },
    /// Any other status with its parsed JSON body.
    Json {
        status: u16,
        data: serde_json::Value,
    },
}

impl ApiResponse {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Redirect { status, .. } | Self::Json { status, .. } => *status,
        }
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => location.as_deref(),
            Self::Json { .. } => None,
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json { data, .. } => Some(data),
            Self::Redirect { .. } => None,
        }
    }

    /// Deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedResponse`] for redirects or bodies
    /// that do not match `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, Report<CheckoutError>> {
        match self {
            Self::Json { status, data } => {
                serde_json::from_value(data.clone()).change_context(CheckoutError::MalformedResponse {
                    status: *status,
                    message: format!(
                        "Body does not match {}",
                        std::any::type_name::<T>()
                    ),
                })
            }
            Self::Redirect { status, .. } => Err(Report::new(CheckoutError::MalformedResponse {
                status: *status,
                message: "Redirect responses carry no JSON body".into(),
            })),
        }
    }
}

fn is_redirect_status(status: u16) -> bool {
    (300..400).contains(&status)
}

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn body_preview(body: &str) -> String {
    format!("({} chars): {}", body.chars().count(), truncate_body(body))
}

/// Sends signed requests on behalf of one partner domain.
#[derive(Debug)]
pub struct Dispatcher<T, C> {
    signer: RequestSigner,
    domain: String,
    transport: T,
    clock: C,
}

impl<T: Transport, C: Clock> Dispatcher<T, C> {
    pub fn new(signer: RequestSigner, domain: impl Into<String>, transport: T, clock: C) -> Self {
        Self {
            signer,
            domain: domain.into(),
            transport,
            clock,
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Signs `payload` with the current time and builds the HTTP request.
    #[must_use]
    pub fn prepare(&self, method: Method, url: &str, payload: SigningPayload) -> HttpRequest {
        let timestamp = format_timestamp(self.clock.now());
        let SignedRequest {
            payload,
            timestamp,
            signature,
        } = self.signer.sign(payload, &timestamp);

        let body = if method == Method::GET {
            None
        } else {
            payload.http_body().map(String::from)
        };

        HttpRequest {
            method,
            url: url.to_string(),
            headers: vec![
                (CONTENT_TYPE, CONTENT_TYPE_JSON.to_string()),
                (HEADER_SPT_MOR_SIGNATURE, signature),
                (HEADER_SPT_MOR_DOMAIN, self.domain.clone()),
                (HEADER_SPT_MOR_TIMESTAMP, timestamp),
            ],
            body,
        }
    }

    /// Signs, sends and interprets one request.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Transport`] if no response was received
    /// - [`CheckoutError::MalformedResponse`] if a non-redirect body is not JSON
    pub fn dispatch(
        &self,
        method: Method,
        url: &str,
        payload: SigningPayload,
    ) -> Result<ApiResponse, Report<CheckoutError>> {
        let request = self.prepare(method, url, payload);
        log::debug!(
            "{} {} (timestamp {})",
            request.method,
            request.url,
            request.header(&HEADER_SPT_MOR_TIMESTAMP).unwrap_or_default()
        );

        let response = self.transport.execute(&request)?;
        log::debug!("{} {} -> HTTP {}", request.method, request.url, response.status);

        if is_redirect_status(response.status) {
            log::info!(
                "Received redirect (HTTP {}) to {}",
                response.status,
                response.location.as_deref().unwrap_or("<no location>")
            );
            return Ok(ApiResponse::Redirect {
                status: response.status,
                location: response.location,
            });
        }

        log::debug!("Response body {}", body_preview(&response.body));
        let data: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            Report::new(CheckoutError::MalformedResponse {
                status: response.status,
                message: e.to_string(),
            })
            .attach(format!("Raw response was: {}", truncate_body(&response.body)))
        })?;

        Ok(ApiResponse::Json {
            status: response.status,
            data,
        })
    }
}
