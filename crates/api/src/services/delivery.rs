//! Delivery of form submissions to the association's mailbox.
//!
//! With both a Resend API key and a recipient configured, submissions are
//! emailed. Otherwise they are written to the log and reported as delivered
//! in mock mode, so the forms keep working in environments without mail
//! credentials (e.g. local development).

use std::sync::Arc;

use serde::Serialize;

use super::{Mailer, OutgoingEmail, ResendMailer};
use crate::config::Config;

/// A submission that can be emailed to staff or logged instead.
pub trait Notification: Send + Sync {
    fn compose(&self, from: &str, to: &str) -> OutgoingEmail;

    /// Log every field of the submission. File contents are never logged.
    fn log_mocked(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Live,
    Mock,
}

impl DeliveryMode {
    /// Live only when both settings are present and non-empty.
    pub fn resolve(api_key: Option<&str>, recipient: Option<&str>) -> Self {
        match live_settings(api_key, recipient) {
            Some(_) => Self::Live,
            None => Self::Mock,
        }
    }
}

fn live_settings<'a>(
    api_key: Option<&'a str>,
    recipient: Option<&'a str>,
) -> Option<(&'a str, &'a str)> {
    let api_key = api_key.filter(|k| !k.is_empty())?;
    let recipient = recipient.filter(|r| !r.is_empty())?;
    Some((api_key, recipient))
}

/// Successful outcome of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Mocked,
}

impl Delivery {
    pub fn is_mocked(self) -> bool {
        self == Self::Mocked
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The provider answered with an error.
    #[error("email provider rejected the message: {0}")]
    Rejected(String),
    /// The provider could not be reached.
    #[error("email provider unavailable: {0}")]
    Unavailable(String),
}

pub enum Dispatcher {
    Live {
        mailer: Arc<dyn Mailer>,
        recipient: String,
    },
    Mock,
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Self {
        match live_settings(
            config.resend_api_key.as_deref(),
            config.contact_recipient.as_deref(),
        ) {
            Some((api_key, recipient)) => Self::Live {
                mailer: Arc::new(ResendMailer::new(api_key)),
                recipient: recipient.to_owned(),
            },
            None => Self::Mock,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        match self {
            Self::Live { .. } => DeliveryMode::Live,
            Self::Mock => DeliveryMode::Mock,
        }
    }

    pub async fn dispatch<N: Notification>(
        &self,
        from: &str,
        notification: &N,
    ) -> Result<Delivery, DeliveryError> {
        match self {
            Self::Mock => {
                notification.log_mocked();
                Ok(Delivery::Mocked)
            }
            Self::Live { mailer, recipient } => {
                mailer.send(notification.compose(from, recipient)).await?;
                Ok(Delivery::Sent)
            }
        }
    }
}
