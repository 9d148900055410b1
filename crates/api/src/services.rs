//! External service abstractions.
//!
//! Each service is abstracted behind a trait to enable mocking in tests.
//!
//! ## Services
//!
//! - **email** - Transactional email via Resend
//! - **delivery** - Chooses live email or log-only delivery from configuration
//! - **notifications** - Staff emails composed from each form
//!
//! ## Usage in Handlers
//!
//! The dispatcher is accessed via `AppState`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let delivery = state.dispatcher.dispatch(&state.config.contact_from, &notification).await?;
//! }
//! ```

mod delivery;
mod email;
mod notifications;

pub use delivery::{Delivery, DeliveryError, DeliveryMode, Dispatcher, Notification};
pub use email::{EmailAttachment, Mailer, OutgoingEmail, ResendMailer};
pub use notifications::{ContactNotification, JoinNotification};

#[cfg(test)]
pub use email::MockMailer;
