//! HTTP handlers, one module per route group.

pub mod contact;
pub mod health;
pub mod join;

use serde::Serialize;

use crate::services::Delivery;

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub mocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SubmissionResponse {
    /// `sent` is shown when the email went out, `mocked` when it was only logged.
    pub fn new(delivery: Delivery, sent: Option<&'static str>, mocked: &'static str) -> Self {
        match delivery {
            Delivery::Sent => Self {
                ok: true,
                mocked: false,
                message: sent,
            },
            Delivery::Mocked => Self {
                ok: true,
                mocked: true,
                message: Some(mocked),
            },
        }
    }
}
