use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::create_router;
use crate::models::{
    ArbiterOutcome, LocalLabel, LocalPrediction, RemoteLabel, RemoteVerdict, ScanRecord,
    ScanStatus,
};
use crate::store::ScanStore;
use crate::testing::{memory_store, state_with, FailingStore, StubArbiter, StubClassifier};
use crate::AppState;

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_scan(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn safe_verdict() -> ArbiterOutcome {
    ArbiterOutcome::Verdict(RemoteVerdict {
        verdict: RemoteLabel::Safe,
        confidence: 0.88,
        reasoning: "Looks like a normal e-commerce domain.".to_string(),
        technique: None,
    })
}

fn record(url: &str, status: ScanStatus, age_secs: i64) -> ScanRecord {
    ScanRecord {
        url: url.to_string(),
        status,
        confidence: 0.5,
        analysis: "1. Result: x\n2. Confidence Score: 0.50\n3. Reasoning: y".to_string(),
        timestamp: Utc::now() - Duration::seconds(age_secs),
    }
}

#[tokio::test]
async fn test_scan_returns_record() {
    let state = state_with(
        StubClassifier::new(LocalPrediction::new(LocalLabel::Safe, 0.91)),
        StubArbiter::new(safe_verdict()),
        memory_store(),
    );

    let (status, body) = send(state, post_scan(r#"{"url": "https://shop.example.com"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://shop.example.com");
    assert_eq!(body["status"], "Safe");
    assert_eq!(body["confidence"], 0.88);
    assert!(body["analysis"].as_str().unwrap().starts_with("1. Result: Safe\n"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_scan_succeeds_when_store_fails() {
    let state = state_with(
        StubClassifier::new(LocalPrediction::new(LocalLabel::Malicious, 0.6)),
        StubArbiter::new(ArbiterOutcome::MalformedResponse("bad".to_string())),
        Arc::new(FailingStore),
    );

    let (status, body) = send(state, post_scan(r#"{"url": "http://evil.example"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Malicious");
    assert_eq!(body["confidence"], 0.6);
}

#[tokio::test]
async fn test_empty_url_is_rejected_before_any_work() {
    for payload in [r#"{"url": ""}"#, r#"{"url": "   "}"#, "{}", "not json"] {
        let classifier = StubClassifier::new(LocalPrediction::new(LocalLabel::Safe, 0.9));
        let arbiter = StubArbiter::new(safe_verdict());
        let state = state_with(classifier.clone(), arbiter.clone(), memory_store());

        let (status, body) = send(state, post_scan(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["status"], 400);
        assert_eq!(classifier.calls(), 0);
        assert_eq!(arbiter.calls(), 0);
    }
}

#[tokio::test]
async fn test_overlong_url_is_rejected() {
    let classifier = StubClassifier::new(LocalPrediction::new(LocalLabel::Safe, 0.9));
    let arbiter = StubArbiter::new(safe_verdict());
    let state = state_with(classifier.clone(), arbiter.clone(), memory_store());

    let payload = serde_json::json!({ "url": format!("http://{}", "a".repeat(3000)) }).to_string();
    let (status, body) = send(state, post_scan(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is too long");
    assert_eq!(classifier.calls(), 0);
    assert_eq!(arbiter.calls(), 0);
}

#[tokio::test]
async fn test_history_newest_first_with_default_limit() {
    let store = memory_store();
    for i in 0..12 {
        store.append(&record(&format!("http://{}.example", i), ScanStatus::Safe, 100 - i)).await.unwrap();
    }
    let state = state_with(
        StubClassifier::new(LocalPrediction::unknown()),
        StubArbiter::new(safe_verdict()),
        store,
    );

    let (status, body) = send(state, get("/history")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["url"], "http://11.example");
    assert_eq!(items[9]["url"], "http://2.example");
}

#[tokio::test]
async fn test_history_limit_validation() {
    let store = memory_store();
    for i in 0..3 {
        store.append(&record(&format!("http://{}.example", i), ScanStatus::Safe, i)).await.unwrap();
    }
    let state = state_with(
        StubClassifier::new(LocalPrediction::unknown()),
        StubArbiter::new(safe_verdict()),
        store,
    );

    let (status, body) = send(state.clone(), get("/history?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(state.clone(), get("/history?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(state, get("/history?limit=-5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_and_stats_fail_with_store() {
    let state = state_with(
        StubClassifier::new(LocalPrediction::unknown()),
        StubArbiter::new(safe_verdict()),
        Arc::new(FailingStore),
    );

    let (status, body) = send(state.clone(), get("/history")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error occurred");

    let (status, _) = send(state, get("/stats")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_stats_after_scans() {
    let store = memory_store();
    let state = state_with(
        StubClassifier::new(LocalPrediction::new(LocalLabel::Safe, 0.9)),
        StubArbiter::new(safe_verdict()),
        store.clone(),
    );

    for _ in 0..2 {
        let (status, _) = send(state.clone(), post_scan(r#"{"url": "https://shop.example.com"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }
    store.append(&record("http://bad.example", ScanStatus::Malicious, 0)).await.unwrap();
    store.append(&record("http://odd.example", ScanStatus::Adversarial, 0)).await.unwrap();

    let (status, body) = send(state, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["safe_count"], 2);
    assert_eq!(body["malicious_count"], 1);
}

#[tokio::test]
async fn test_health_reports_collaborators() {
    let state = state_with(
        StubClassifier::new(LocalPrediction::unknown()),
        StubArbiter::new(ArbiterOutcome::Unconfigured("no key".to_string())),
        memory_store(),
    );

    let (status, body) = send(state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["arbiter_configured"], false);
}

#[test]
fn test_validate_limit() {
    use super::history::validate_limit;

    assert_eq!(validate_limit(None, 100).unwrap(), 10);
    assert_eq!(validate_limit(Some(500), 100).unwrap(), 100);
    assert_eq!(validate_limit(Some(1), 100).unwrap(), 1);
    assert!(validate_limit(Some(0), 100).is_err());
}
