//! Email sending abstraction backed by Resend.

use async_trait::async_trait;
use resend_rs::types::{Attachment, CreateEmailBaseOptions};

use super::DeliveryError;

/// A fully addressed email ready to hand to the provider.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Submitter's address so staff can answer directly.
    pub reply_to: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Email sender trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email. Failures are reported, never retried.
    async fn send(&self, email: OutgoingEmail) -> Result<(), DeliveryError>;
}

/// Resend API sender.
pub struct ResendMailer {
    client: resend_rs::Resend,
}

impl ResendMailer {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: resend_rs::Resend::new(api_key),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DeliveryError> {
        let mut options = CreateEmailBaseOptions::new(&email.from, [&email.to], &email.subject)
            .with_html(&email.html)
            .with_reply(&email.reply_to);

        for attachment in email.attachments {
            options = options.with_attachment(
                Attachment::from_content(attachment.content)
                    .with_filename(&attachment.filename)
                    .with_content_type(&attachment.content_type),
            );
        }

        match self.client.emails.send(options).await {
            Ok(response) => {
                tracing::info!(email_id = ?response.id, "email sent");
                Ok(())
            }
            // Transport failures mean the provider could not be reached
            Err(resend_rs::Error::Http(err)) => Err(DeliveryError::Unavailable(err.to_string())),
            Err(err) => Err(DeliveryError::Rejected(err.to_string())),
        }
    }
}
