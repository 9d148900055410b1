use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{services::DeliveryMode, stores::RateLimitPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
    /// Resend API key. Without it submissions are only logged.
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Staff mailbox that receives every submission.
    #[serde(default)]
    pub contact_recipient: Option<String>,
    #[serde(default = "default_contact_from")]
    pub contact_from: String,
    #[serde(default = "default_join_from")]
    pub join_from: String,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    /// How often expired rate limit entries are swept from memory.
    #[serde(default = "default_rate_limit_sweep_secs")]
    pub rate_limit_sweep_secs: u64,
}

fn default_contact_from() -> String {
    "APTM Contact Form <onboarding@resend.dev>".to_owned()
}

fn default_join_from() -> String {
    "APTM Join Form <onboarding@resend.dev>".to_owned()
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_rate_limit_max_requests() -> u32 {
    1
}

fn default_rate_limit_sweep_secs() -> u64 {
    300
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        DeliveryMode::resolve(
            self.resend_api_key.as_deref(),
            self.contact_recipient.as_deref(),
        )
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs.max(1))
    }
}
