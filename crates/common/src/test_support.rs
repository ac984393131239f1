#[cfg(test)]
pub mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use chrono::{DateTime, Utc};
    use error_stack::Report;

    use crate::error::CheckoutError;
    use crate::request_signing::{parse_timestamp, Clock};
    use crate::settings::Settings;
    use crate::transport::{HttpRequest, HttpResponse, Transport};

    pub fn crate_test_settings_str() -> String {
        r#"
            [api]
            base_url = "https://mor.test/api/v1/"
            signing_key = "secret"
            partner_domain = "partner.test"

            [callback]
            max_age_secs = 300
            max_future_skew_secs = 300
            "#
        .to_string()
    }

    /// Every `MOR_CHECKOUT__*` variable that can override the test settings.
    pub const SETTINGS_ENV_OVERRIDES: [&str; 6] = [
        "MOR_CHECKOUT__API__BASE_URL",
        "MOR_CHECKOUT__API__SIGNING_KEY",
        "MOR_CHECKOUT__API__PARTNER_DOMAIN",
        "MOR_CHECKOUT__API__TIMEOUT_SECS",
        "MOR_CHECKOUT__CALLBACK__MAX_AGE_SECS",
        "MOR_CHECKOUT__CALLBACK__MAX_FUTURE_SKEW_SECS",
    ];

    /// Parses `toml_str` with overrides cleared, holding temp-env's lock so a
    /// test that sets an override cannot leak into it.
    pub fn parse_settings_isolated(toml_str: &str) -> Result<Settings, Report<CheckoutError>> {
        temp_env::with_vars_unset(SETTINGS_ENV_OVERRIDES, || Settings::from_toml(toml_str))
    }

    pub fn create_test_settings() -> Settings {
        let toml_str = crate_test_settings_str();
        parse_settings_isolated(&toml_str).expect("Invalid config")
    }

    #[test]
    fn test_create_test_settings_ignores_env_overrides() {
        temp_env::with_var("MOR_CHECKOUT__API__SIGNING_KEY", Some("from-env"), || {
            let settings = create_test_settings();
            assert_eq!(settings.api.signing_key, "secret");
            assert_eq!(settings.api.partner_domain, "partner.test");
        });
    }

    /// Clock pinned to a settable instant; clones share the same instant.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        now: Rc<RefCell<DateTime<Utc>>>,
    }

    impl FixedClock {
        pub fn at(timestamp: &str) -> Self {
            Self {
                now: Rc::new(RefCell::new(
                    parse_timestamp(timestamp).expect("valid test timestamp"),
                )),
            }
        }

        pub fn set(&self, timestamp: &str) {
            *self.now.borrow_mut() = parse_timestamp(timestamp).expect("valid test timestamp");
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.borrow()
        }
    }

    /// Transport that records requests and replays queued outcomes.
    ///
    /// With nothing queued it answers `200 {}`.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl MockTransport {
        pub fn with_response(response: HttpResponse) -> Self {
            let transport = Self::default();
            transport.push(Ok(response));
            transport
        }

        pub fn failing(message: &str) -> Self {
            let transport = Self::default();
            transport.push(Err(message.to_string()));
            transport
        }

        pub fn push(&self, outcome: Result<HttpResponse, String>) {
            self.responses.borrow_mut().push_back(outcome);
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Report<CheckoutError>> {
            self.requests.borrow_mut().push(request.clone());
            match self.responses.borrow_mut().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(Report::new(CheckoutError::Transport { message })),
                None => Ok(HttpResponse {
                    status: 200,
                    location: None,
                    body: "{}".to_string(),
                }),
            }
        }
    }
}
