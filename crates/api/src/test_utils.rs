//! Shared test utilities for API handler tests.
//!
//! Provides sample forms, a multipart body encoder and a `TestStateBuilder`
//! for constructing `AppState` instances with only the mocks each test needs.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::TestStateBuilder;
//!
//! let mut mailer = MockMailer::new();
//! mailer.expect_send().times(1).returning(|_| Ok(()));
//!
//! let state = TestStateBuilder::new()
//!     .with_mailer(mailer)
//!     .build();
//! ```

use std::sync::Arc;

use axum::{body::Bytes, response::Response};
use http_body_util::BodyExt;

use crate::config::Config;
use crate::models::{ContactForm, JoinForm, ProofOfPayment};
use crate::services::{Dispatcher, MockMailer};
use crate::state::AppState;
use crate::stores::{InMemoryRateLimiter, RateLimitPolicy, RateLimiter, Stores};

/// Creates a test configuration without mail settings.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        env: "test".to_string(),
        sentry_dsn: None,
        resend_api_key: None,
        contact_recipient: None,
        contact_from: "APTM Contact Form <onboarding@resend.dev>".to_string(),
        join_from: "APTM Join Form <onboarding@resend.dev>".to_string(),
        rate_limit_window_secs: 60,
        rate_limit_max_requests: 1,
        rate_limit_sweep_secs: 300,
    }
}

pub fn valid_contact() -> ContactForm {
    ContactForm {
        name: "Ana Costa".to_string(),
        email: "ana.costa@example.com".to_string(),
        message: "Gostaria de saber mais sobre as formações.".to_string(),
    }
}

pub fn valid_join() -> JoinForm {
    JoinForm {
        name: "Maria Silva".to_string(),
        email: "maria.silva@example.com".to_string(),
        phone: Some("912345678".to_string()),
        profession: "Terapeuta da Mão".to_string(),
        registration_number: Some("C-12345".to_string()),
        district: "Lisboa".to_string(),
        institution: Some("Hospital de Santa Maria".to_string()),
        message: Some("Gostaria de me tornar sócia.".to_string()),
        plan: "anual".to_string(),
    }
}

pub fn valid_proof() -> ProofOfPayment {
    ProofOfPayment {
        filename: "comprovativo.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: Bytes::from_static(b"%PDF-1.4 test"),
    }
}

/// Reads a JSON response body.
pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Encodes text fields and an optional `comprovativo` file as
/// `multipart/form-data`. Returns the content type header and the body.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "aptm-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content_type, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"comprovativo\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Limiters default to fresh in-memory stores with the production policy and
/// delivery defaults to mock mode. Setting a mailer switches to live mode.
pub struct TestStateBuilder {
    contact_limiter: Option<Arc<dyn RateLimiter>>,
    join_limiter: Option<Arc<dyn RateLimiter>>,
    mailer: Option<MockMailer>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            contact_limiter: None,
            join_limiter: None,
            mailer: None,
        }
    }

    pub fn with_contact_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.contact_limiter = Some(Arc::new(limiter));
        self
    }

    #[allow(dead_code)]
    pub fn with_join_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.join_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_mailer(mut self, mailer: MockMailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn build(self) -> AppState {
        let mut config = test_config();
        let default_limiter =
            || Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::default())) as Arc<dyn RateLimiter>;

        let stores = Stores {
            contact_limiter: self.contact_limiter.unwrap_or_else(default_limiter),
            join_limiter: self.join_limiter.unwrap_or_else(default_limiter),
        };

        let dispatcher = match self.mailer {
            Some(mailer) => {
                config.resend_api_key = Some("re_test".to_string());
                config.contact_recipient = Some("geral@aptm.pt".to_string());
                Dispatcher::Live {
                    mailer: Arc::new(mailer),
                    recipient: "geral@aptm.pt".to_string(),
                }
            }
            None => Dispatcher::Mock,
        };

        AppState {
            config,
            stores,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
