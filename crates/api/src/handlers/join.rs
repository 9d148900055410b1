//! Membership application endpoint.
//!
//! POST /join with a multipart body: the text fields `nome`, `email`,
//! `telemovel`, `profissao`, `numCedula`, `distrito`, `instituicao`,
//! `mensagem`, `plano`, and the proof of payment file `comprovativo`.
//!
//! The file is checked before the text fields. A missing, oversized or
//! wrongly typed file is reported on its own.

use axum::{
    Json, Router,
    debug_handler,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    response::IntoResponse,
    routing::post,
};
use tower_http::limit::RequestBodyLimitLayer;

use super::SubmissionResponse;
use crate::{
    error::AppError,
    middleware::client_key::ClientKey,
    models::{JOIN_FIELDS, JoinForm, PROOF_FIELD, ProofOfPayment},
    services::JoinNotification,
    state::AppState,
    validation::{self, MAX_PROOF_BYTES},
};

/// Room for the proof of payment plus the text fields and multipart framing.
const BODY_LIMIT: usize = MAX_PROOF_BYTES + 1024 * 1024;

const SENT_MESSAGE: &str = "Candidatura submetida com sucesso! Entraremos em contacto brevemente.";
const MOCKED_MESSAGE: &str = "Candidatura submetida com sucesso! (Modo de desenvolvimento)";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_join))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

#[debug_handler]
async fn submit_join(
    State(state): State<AppState>,
    client: ClientKey,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let delivery = state
        .join_gateway()
        .submit(&client, async move {
            let (form, proof) = read_application(multipart).await?;

            let proof = validation::check_proof(proof).map_err(AppError::Validation)?;
            validation::check(&form, JOIN_FIELDS).map_err(AppError::Validation)?;

            Ok(JoinNotification { form, proof })
        })
        .await?;

    Ok(Json(SubmissionResponse::new(
        delivery,
        Some(SENT_MESSAGE),
        MOCKED_MESSAGE,
    )))
}

/// Collect the text fields and the proof of payment. The file is read fully
/// into memory; the body limit bounds its size.
async fn read_application(
    mut multipart: Multipart,
) -> Result<(JoinForm, Option<ProofOfPayment>), AppError> {
    let mut form = JoinForm::default();
    let mut proof = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == PROOF_FIELD {
            let filename = field.file_name().unwrap_or(PROOF_FIELD).to_owned();
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let bytes = field.bytes().await.map_err(malformed)?;

            proof = Some(ProofOfPayment {
                filename,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(malformed)?;
            form.set(&name, value);
        }
    }

    Ok((form, proof))
}

fn malformed(err: MultipartError) -> AppError {
    tracing::debug!(error = %err, "malformed join form body");
    AppError::External(err.status(), "Invalid form data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockMailer;
    use crate::test_utils::{TestStateBuilder, multipart_body, response_json};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use tower::ServiceExt;

    const FIELDS: &[(&str, &str)] = &[
        ("nome", "Maria Silva"),
        ("email", "maria.silva@example.com"),
        ("telemovel", "912345678"),
        ("profissao", "Terapeuta Ocupacional"),
        ("numCedula", ""),
        ("distrito", "Porto"),
        ("instituicao", "Hospital de Santo António"),
        ("mensagem", "Linha um\nLinha dois"),
        ("plano", "semestral"),
    ];

    fn request(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
        let (content_type, body) = multipart_body(fields, file);

        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(body))
            .unwrap()
    }

    fn pdf() -> Option<(&'static str, &'static str, &'static [u8])> {
        Some(("comprovativo.pdf", "application/pdf", b"%PDF-1.4 proof"))
    }

    #[tokio::test]
    async fn valid_application_is_mocked_without_mail_settings() {
        let app = router().with_state(TestStateBuilder::new().build());

        let response = app.oneshot(request(FIELDS, pdf())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            json!({ "ok": true, "mocked": true, "message": MOCKED_MESSAGE })
        );
    }

    #[tokio::test]
    async fn valid_application_is_emailed_with_attachment() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| {
                email.reply_to == "maria.silva@example.com"
                    && email.subject == "Nova candidatura de sócio: Maria Silva"
                    && email.attachments.len() == 1
                    && email.attachments[0].content == b"%PDF-1.4 proof"
                    && email.html.contains("(€85)")
            })
            .times(1)
            .returning(|_| Ok(()));
        let app = router().with_state(TestStateBuilder::new().with_mailer(mailer).build());

        let response = app.oneshot(request(FIELDS, pdf())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            json!({ "ok": true, "message": SENT_MESSAGE })
        );
    }

    #[tokio::test]
    async fn missing_proof_stops_before_field_validation() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();
        let app = router().with_state(TestStateBuilder::new().with_mailer(mailer).build());

        // Text fields are invalid too, but only the file is reported
        let response = app
            .oneshot(request(&[("nome", "A"), ("plano", "mensal")], None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["details"].as_array().unwrap().len(), 1);
        assert_eq!(body["details"][0]["field"], "comprovativo");
    }

    #[tokio::test]
    async fn text_proof_is_rejected() {
        let app = router().with_state(TestStateBuilder::new().build());

        let response = app
            .oneshot(request(FIELDS, Some(("notas.txt", "text/plain", b"hello"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_json(response).await["details"][0]["field"],
            "comprovativo"
        );
    }

    #[tokio::test]
    async fn field_errors_use_form_field_names() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();
        let app = router().with_state(TestStateBuilder::new().with_mailer(mailer).build());

        let fields = [
            ("nome", "Maria Silva"),
            ("email", "maria.silva@example.com"),
            ("telemovel", "812345678"),
            ("profissao", "Terapeuta Ocupacional"),
            ("distrito", "Porto"),
            ("plano", "mensal"),
        ];
        let response = app.oneshot(request(&fields, pdf())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        let fields: Vec<_> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|issue| issue["field"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(fields, vec!["telemovel", "plano"]);
    }

    #[tokio::test]
    async fn oversized_proof_reaches_validation() {
        let app = router().with_state(TestStateBuilder::new().build());
        let large = vec![0u8; MAX_PROOF_BYTES + 1];

        let response = app
            .oneshot(request(
                FIELDS,
                Some(("comprovativo.pdf", "application/pdf", &large)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["details"][0]["field"], "comprovativo");
        assert!(
            body["details"][0]["message"]
                .as_str()
                .unwrap()
                .contains("5MB")
        );
    }

    #[tokio::test]
    async fn second_application_in_window_is_rate_limited() {
        let app = router().with_state(TestStateBuilder::new().build());

        let first = app.clone().oneshot(request(FIELDS, pdf())).await.unwrap();
        let second = app.oneshot(request(FIELDS, pdf())).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
