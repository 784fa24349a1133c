use super::common::*;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::collections::router::{
    classify_handler, policy_handler, ClassifyRequest,
};
use crate::workflows::collections::{collections_router, CollectionService};

fn post_json(uri: &str, payload: &Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request builds")
}

fn sample_records() -> Value {
    json!([
        {
            "debtor_id": "std-1",
            "name": "Luis",
            "surname": "Rey",
            "segment": "standard",
            "days_past_due": 45,
            "current_amount": 1000,
            "status": "PAST_DUE"
        },
        {
            "debtor_id": "prem-1",
            "name": "Ana",
            "surname": "Diaz",
            "segment": "PREMIUM",
            "days_past_due": "90",
            "current_amount": "6000000",
            "status": "past_due"
        },
        {
            "debtor_id": "paid-1",
            "segment": "PREMIUM",
            "days_past_due": 90,
            "current_amount": 10,
            "status": "PAID"
        },
        {
            "debtor_id": "bad-1",
            "segment": "BASIC",
            "days_past_due": "soon",
            "current_amount": 10,
            "status": "PAST_DUE"
        }
    ])
}

#[tokio::test]
async fn policy_handler_returns_active_table() {
    let service = Arc::new(CollectionService::default());

    let response = policy_handler(State(service)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["version"], "standard-v1");
    assert_eq!(payload["segments"][0]["segment"], "PREMIUM");
    assert_eq!(payload["segments"][0]["tiers"][0]["max_days"], 30);
    assert_eq!(
        payload["segments"][0]["tiers"][0]["strategy"],
        "COURTEOUS CALL"
    );
    assert_eq!(payload["default"]["segment"], "BASIC");
    assert_eq!(payload["default"]["tiers"][1]["max_days"], Value::Null);
}

#[tokio::test]
async fn classify_handler_returns_ordered_records_and_exclusions() {
    let service = Arc::new(CollectionService::default());
    let request: ClassifyRequest = serde_json::from_value(json!({
        "records": sample_records(),
        "as_of": "2025-01-31"
    }))
    .expect("request decodes");

    let response = classify_handler(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["as_of"], "2025-01-31T00:00:00Z");
    assert_eq!(payload["policy_version"], "standard-v1");

    let records = payload["records"].as_array().expect("records array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["debtor_id"], "prem-1");
    assert_eq!(records[0]["collection_strategy"], "SENIOR EXECUTIVE VISIT");
    assert_eq!(records[0]["executor"], "Account manager");
    assert_eq!(records[0]["status"], "PAST_DUE");
    assert_eq!(records[1]["collection_strategy"], "STANDARD CALL");
    assert_eq!(records[1]["segment"], "STANDARD");
    assert_eq!(records[1]["assignment_timestamp"], "2025-01-31T00:00:00Z");

    assert_eq!(payload["exclusions"]["out_of_scope"], 1);
    assert_eq!(payload["exclusions"]["malformed"], 1);
    assert_eq!(
        payload["exclusions"]["malformed_rows"][0]["debtor_id"],
        "bad-1"
    );
}

#[tokio::test]
async fn classify_route_accepts_empty_batches() {
    let router = collections_router(Arc::new(CollectionService::default()));

    let response = router
        .oneshot(post_json(
            "/api/v1/collections/classify",
            &json!({ "records": [] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["records"], json!([]));
    assert_eq!(payload["exclusions"]["out_of_scope"], 0);
    assert!(payload["exclusions"].get("malformed_rows").is_none());
}

#[tokio::test]
async fn classify_route_rejects_invalid_as_of() {
    let router = collections_router(Arc::new(CollectionService::default()));

    let response = router
        .oneshot(post_json(
            "/api/v1/collections/classify",
            &json!({ "records": [], "as_of": "next tuesday" }),
        ))
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn report_route_applies_overrides() {
    let router = collections_router(Arc::new(CollectionService::default()));

    let response = router
        .oneshot(post_json(
            "/api/v1/collections/report",
            &json!({
                "records": sample_records(),
                "as_of": "2025-01-31T09:00:00Z",
                "top_n": 1,
                "critical": { "min_amount": 1000000 }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_records"], 2);
    assert_eq!(payload["critical_filter_segment"], "PREMIUM");
    assert_eq!(payload["strategy_counts"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["strategy_counts"][0]["percentage"], 50.0);
    assert_eq!(
        payload["strategy_totals"][0]["strategy"],
        "SENIOR EXECUTIVE VISIT"
    );
    assert_eq!(payload["top_debts"].as_array().map(Vec::len), Some(2));

    let alerts = payload["critical_alerts"].as_array().expect("alerts");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["debtor_id"], "prem-1");
    assert_eq!(alerts[0]["display_name"], "Ana Diaz");
    assert_eq!(alerts[0]["executor_label"], "Account manager");

    assert_eq!(payload["exclusions"]["malformed"], 1);
}

#[tokio::test]
async fn report_route_uses_configured_defaults() {
    let router = collections_router(Arc::new(CollectionService::default()));

    let response = router
        .oneshot(post_json(
            "/api/v1/collections/report",
            &json!({ "records": sample_records() }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["critical_alerts"].as_array().map(Vec::len),
        Some(1),
        "6,000,000 is above the default 5,000,000 threshold"
    );
}
