//! Contact form endpoint.
//!
//! POST /contact with a JSON object body `{name, email, message}`. One
//! message per client per rate limit window; every field error is returned
//! at once, including fields that are not strings.

use axum::{
    Json, Router, body::Bytes, debug_handler, extract::State, http::StatusCode,
    response::IntoResponse, routing::post,
};
use tower_http::limit::RequestBodyLimitLayer;

use super::SubmissionResponse;
use crate::{
    error::AppError,
    middleware::client_key::ClientKey,
    models::{CONTACT_FIELDS, ContactForm},
    services::ContactNotification,
    state::AppState,
    validation::{self, JsonText},
};

const BODY_LIMIT: usize = 64 * 1024;

const MOCKED_MESSAGE: &str = "Message logged (development mode)";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_contact))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

#[debug_handler]
async fn submit_contact(
    State(state): State<AppState>,
    client: ClientKey,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let delivery = state
        .contact_gateway()
        .submit(&client, async move {
            let mut body = JsonText::parse(&body).map_err(|err| {
                tracing::debug!(error = %err, "malformed contact body");
                AppError::External(StatusCode::BAD_REQUEST, "Invalid request body")
            })?;
            let form = ContactForm::from_json(&mut body);

            validation::check_with(&form, CONTACT_FIELDS, body.into_issues())
                .map_err(AppError::Validation)?;

            Ok(ContactNotification { form })
        })
        .await?;

    Ok(Json(SubmissionResponse::new(delivery, None, MOCKED_MESSAGE)))
}
