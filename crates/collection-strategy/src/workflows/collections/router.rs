use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::ClassifiedRecord;
use super::report::views::ExclusionSummaryView;
use super::service::{deserialize_optional_as_of, CollectionService, ReportOptions};
use crate::workflows::ledger::LedgerRow;

/// Router builder exposing the policy and batch classification endpoints.
pub fn collections_router(service: Arc<CollectionService>) -> Router {
    Router::new()
        .route("/api/v1/collections/policy", get(policy_handler))
        .route("/api/v1/collections/classify", post(classify_handler))
        .route("/api/v1/collections/report", post(report_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub records: Vec<LedgerRow>,
    #[serde(default, deserialize_with = "deserialize_optional_as_of")]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub records: Vec<LedgerRow>,
    #[serde(default, deserialize_with = "deserialize_optional_as_of")]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub options: ReportOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub as_of: DateTime<Utc>,
    pub policy_version: String,
    pub records: Vec<ClassifiedRecord>,
    pub exclusions: ExclusionSummaryView,
}

pub(crate) async fn policy_handler(State(service): State<Arc<CollectionService>>) -> Response {
    (StatusCode::OK, axum::Json(service.policy_document())).into_response()
}

pub(crate) async fn classify_handler(
    State(service): State<Arc<CollectionService>>,
    axum::Json(request): axum::Json<ClassifyRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let worker = Arc::clone(&service);
    let outcome =
        tokio::task::spawn_blocking(move || worker.classify(request.records, as_of)).await;

    match outcome {
        Ok(Ok(run)) => {
            let body = ClassifyResponse {
                as_of: run.as_of,
                policy_version: service.pipeline().classifier().policy().version().to_string(),
                exclusions: run.tally.to_view(),
                records: run.records,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Ok(Err(error)) => internal_error(error.to_string()),
        Err(error) => internal_error(error.to_string()),
    }
}

pub(crate) async fn report_handler(
    State(service): State<Arc<CollectionService>>,
    axum::Json(request): axum::Json<ReportRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let outcome = tokio::task::spawn_blocking(move || {
        service.report(request.records, as_of, &request.options)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(error)) => internal_error(error.to_string()),
        Err(error) => internal_error(error.to_string()),
    }
}

fn internal_error(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
