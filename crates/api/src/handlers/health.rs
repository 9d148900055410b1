//! Health check endpoint for load balancers and monitoring.
//!
//! The service has no backing stores to probe, so it reports 200 OK whenever
//! it can answer, along with the delivery mode it started in.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::{services::DeliveryMode, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    delivery: DeliveryMode,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        delivery: state.dispatcher.mode(),
    })
}
