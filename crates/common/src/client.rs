//! Typed entry points for each checkout API endpoint.
//!
//! These helpers only build URLs and payloads; signing, sending and response
//! interpretation are delegated to the [`Dispatcher`].

use error_stack::Report;
use http::Method;

use crate::constants::{CHECKOUT_PATH, CHECKOUT_STATUS_PATH, PARAM_EXTERNAL_ORDER_ID, TAX_ESTIMATE_PATH};
use crate::dispatch::{ApiResponse, Dispatcher};
use crate::error::CheckoutError;
use crate::models::CheckoutRequest;
use crate::request_signing::{Clock, RequestSigner, SigningPayload, SystemClock};
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug)]
pub struct CheckoutClient<T = UreqTransport, C = SystemClock> {
    base_url: String,
    dispatcher: Dispatcher<T, C>,
}

impl CheckoutClient {
    /// Builds a client that talks to the configured API over HTTPS.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_transport(
            settings,
            UreqTransport::new(settings.api.timeout()),
            SystemClock,
        )
    }
}

impl<T: Transport, C: Clock> CheckoutClient<T, C> {
    pub fn with_transport(settings: &Settings, transport: T, clock: C) -> Self {
        let dispatcher = Dispatcher::new(
            RequestSigner::new(&settings.api.signing_key),
            settings.api.partner_domain.clone(),
            transport,
            clock,
        );
        Self {
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            dispatcher,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<T, C> {
        &self.dispatcher
    }

    #[must_use]
    pub fn checkout_url(&self) -> String {
        format!("{}{}", self.base_url, CHECKOUT_PATH)
    }

    #[must_use]
    pub fn checkout_status_url(&self, mor_order_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            CHECKOUT_STATUS_PATH,
            urlencoding::encode(mor_order_id)
        )
    }

    #[must_use]
    pub fn checkout_status_by_external_id_url(&self, external_order_id: &str) -> String {
        format!(
            "{}{}?{}={}",
            self.base_url,
            CHECKOUT_STATUS_PATH,
            PARAM_EXTERNAL_ORDER_ID,
            urlencoding::encode(external_order_id)
        )
    }

    #[must_use]
    pub fn tax_estimate_url(&self) -> String {
        format!("{}{}", self.base_url, TAX_ESTIMATE_PATH)
    }

    /// Submits a cart. Success is normally a redirect to the hosted payment
    /// page.
    ///
    /// # Errors
    ///
    /// Propagates serialization, transport and malformed-response errors.
    pub fn checkout(&self, request: &CheckoutRequest) -> Result<ApiResponse, Report<CheckoutError>> {
        let payload = SigningPayload::json(request)?;
        self.dispatcher
            .dispatch(Method::POST, &self.checkout_url(), payload)
    }

    /// Looks up an order by the identifier the MOR assigned to it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidRequest`] for an empty ID, otherwise
    /// propagates transport and malformed-response errors.
    pub fn checkout_status(&self, mor_order_id: &str) -> Result<ApiResponse, Report<CheckoutError>> {
        require_identifier(mor_order_id, "MOR order ID")?;
        self.dispatcher.dispatch(
            Method::GET,
            &self.checkout_status_url(mor_order_id),
            SigningPayload::raw(mor_order_id),
        )
    }

    /// Looks up an order by the partner's own order identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidRequest`] for an empty ID, otherwise
    /// propagates transport and malformed-response errors.
    pub fn checkout_status_by_external_id(
        &self,
        external_order_id: &str,
    ) -> Result<ApiResponse, Report<CheckoutError>> {
        require_identifier(external_order_id, "external order ID")?;
        self.dispatcher.dispatch(
            Method::GET,
            &self.checkout_status_by_external_id_url(external_order_id),
            SigningPayload::raw(external_order_id),
        )
    }

    /// Asks the API to compute tax for a cart without creating an order.
    ///
    /// # Errors
    ///
    /// Propagates serialization, transport and malformed-response errors.
    pub fn calculate_tax_estimate(
        &self,
        request: &CheckoutRequest,
    ) -> Result<ApiResponse, Report<CheckoutError>> {
        let payload = SigningPayload::json(request)?;
        self.dispatcher
            .dispatch(Method::POST, &self.tax_estimate_url(), payload)
    }
}

fn require_identifier(value: &str, what: &str) -> Result<(), Report<CheckoutError>> {
    if value.trim().is_empty() {
        return Err(Report::new(CheckoutError::InvalidRequest {
            message: format!("{what} must not be empty"),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HEADER_SPT_MOR_SIGNATURE, HEADER_SPT_MOR_TIMESTAMP};
    use crate::models::{sample_checkout_request, CheckoutStatus};
    use crate::request_signing::sign;
    use crate::test_support::tests::{create_test_settings, FixedClock, MockTransport};
    use crate::transport::HttpResponse;

    fn client(transport: MockTransport) -> CheckoutClient<MockTransport, FixedClock> {
        CheckoutClient::with_transport(
            &create_test_settings(),
            transport,
            FixedClock::at("2024-01-01T00:00:00Z"),
        )
    }

    fn sent(client: &CheckoutClient<MockTransport, FixedClock>) -> crate::transport::HttpRequest {
        client
            .dispatcher()
            .transport()
            .last_request()
            .expect("a request was sent")
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let c = client(MockTransport::default());
        assert_eq!(c.base_url(), "https://mor.test/api/v1");
        assert_eq!(c.checkout_url(), "https://mor.test/api/v1/checkout");
        assert_eq!(
            c.tax_estimate_url(),
            "https://mor.test/api/v1/calculate-tax-estimate"
        );
    }

    #[test]
    fn test_status_urls_encode_identifiers() {
        let c = client(MockTransport::default());
        assert_eq!(
            c.checkout_status_url("MOR-123456"),
            "https://mor.test/api/v1/checkout-status/MOR-123456"
        );
        assert_eq!(
            c.checkout_status_url("a/b c"),
            "https://mor.test/api/v1/checkout-status/a%2Fb%20c"
        );
        assert_eq!(
            c.checkout_status_by_external_id_url("ORD-2024&x=1"),
            "https://mor.test/api/v1/checkout-status?external_order_id=ORD-2024%26x%3D1"
        );
    }

    #[test]
    fn test_checkout_posts_signed_cart_and_returns_redirect() {
        let c = client(MockTransport::with_response(HttpResponse {
            status: 302,
            location: Some("https://pay.mor.test/session/abc".into()),
            body: String::new(),
        }));
        let cart = sample_checkout_request();
        let response = c.checkout(&cart).unwrap();
        assert_eq!(response.redirect_url(), Some("https://pay.mor.test/session/abc"));

        let request = sent(&c);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://mor.test/api/v1/checkout");
        let body = request.body.clone().unwrap();
        assert_eq!(body, serde_json::to_string(&cart).unwrap());
        assert_eq!(
            request.header(&HEADER_SPT_MOR_SIGNATURE),
            Some(sign(&body, "2024-01-01T00:00:00Z", b"secret").as_str())
        );
    }

    #[test]
    fn test_status_by_mor_id_signs_identifier() {
        let c = client(MockTransport::with_response(HttpResponse {
            status: 200,
            location: None,
            body: r#"{"status":{"message":"Paid"},"merchantOfRecord":{"orderId":"MOR-123456"}}"#
                .into(),
        }));
        let response = c.checkout_status("MOR-123456").unwrap();
        let status: CheckoutStatus = response.json_as().unwrap();
        assert_eq!(status.status.unwrap().message.as_deref(), Some("Paid"));

        let request = sent(&c);
        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert_eq!(
            request.header(&HEADER_SPT_MOR_SIGNATURE),
            Some("23f52e0ac7e54bd5ac54184b5dc341ca6f32f1e8be9949f90351aad40fe59885")
        );
        assert_eq!(
            request.header(&HEADER_SPT_MOR_TIMESTAMP),
            Some("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_status_by_external_id() {
        let c = client(MockTransport::with_response(HttpResponse {
            status: 404,
            location: None,
            body: r#"{"error":"Order not found"}"#.into(),
        }));
        let response = c.checkout_status_by_external_id("ORD-1").unwrap();
        assert_eq!(response.status(), 404);

        let request = sent(&c);
        assert_eq!(
            request.url,
            "https://mor.test/api/v1/checkout-status?external_order_id=ORD-1"
        );
        assert_eq!(
            request.header(&HEADER_SPT_MOR_SIGNATURE),
            Some("899369b39afd382e09224ebd6c77b9b1e268154e71cbacfa6788dd0e149ac309")
        );
    }

    #[test]
    fn test_tax_estimate_posts_cart() {
        let c = client(MockTransport::with_response(HttpResponse {
            status: 200,
            location: None,
            body: r#"{"financials":{"totalAmount":58.98,"totalTax":4.87}}"#.into(),
        }));
        let response = c.calculate_tax_estimate(&sample_checkout_request()).unwrap();
        let status: CheckoutStatus = response.json_as().unwrap();
        assert_eq!(status.financials.unwrap().total_tax, Some(4.87));

        let request = sent(&c);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://mor.test/api/v1/calculate-tax-estimate");
    }

    #[test]
    fn test_empty_identifiers_rejected_without_sending() {
        let c = client(MockTransport::default());
        for result in [c.checkout_status(""), c.checkout_status_by_external_id("  ")] {
            let err = result.unwrap_err();
            assert!(matches!(
                err.current_context(),
                CheckoutError::InvalidRequest { .. }
            ));
        }
        assert!(c.dispatcher().transport().requests().is_empty());
    }
}
