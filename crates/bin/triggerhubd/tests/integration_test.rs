//! End-to-end smoke tests for the full triggerhubd stack.
//!
//! Each test spins up the complete application (real engine with its
//! listener running, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`; no TCP port is bound.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use triggerhub_adapter_http_axum::router;
use triggerhub_adapter_http_axum::state::AppState;
use triggerhub_app::action_handler::handler_fn;
use triggerhub_app::automation_engine::{AutomationEngine, EngineConfig};
use triggerhub_domain::automation::ActionParams;
use triggerhub_domain::error::ActionError;
use triggerhub_domain::event::Payload;

/// Build a started engine and the router serving it.
async fn app() -> (AutomationEngine, axum::Router) {
    let engine = AutomationEngine::new(EngineConfig::default().history_capacity(10));
    engine
        .register_action_handler(
            "reject",
            handler_fn(|params: ActionParams, _payload: Payload| async move {
                Err::<(), _>(ActionError::failed(
                    params.get_str("reason").unwrap_or("rejected").to_string(),
                ))
            }),
        )
        .await
        .unwrap();
    engine.start().await;
    let router = router::build(AppState::new(engine.clone()));
    (engine, router)
}

async fn call(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn wait_for_history(router: &axum::Router, count: usize) -> Vec<Value> {
    for _ in 0..200 {
        let (_, body) = call(router, "GET", "/api/history", None).await;
        let entries = body.as_array().cloned().unwrap_or_default();
        if entries.len() >= count {
            return entries;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("history never reached {count} entries");
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let (engine, router) = app().await;
    let (status, body) = call(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
    engine.shutdown().await;
}

// ---------------------------------------------------------------------------
// Event flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_execute_trigger_when_event_published() {
    let (engine, router) = app().await;
    let (status, _) = call(
        &router,
        "POST",
        "/api/triggers",
        Some(json!({
            "id": "login-audit",
            "event": "user.login",
            "actions": [
                {"type": "log", "params": {"message": "user logged in"}},
                {"type": "notify", "params": {"title": "Login"},
                 "condition": {"type": "field_equals", "path": "/user/role", "value": "admin"}},
                {"type": "reject", "params": {"reason": "audit sink offline"}}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &router,
        "POST",
        "/api/events/user.login",
        Some(json!({"user": {"name": "alice", "role": "guest"}})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let history = wait_for_history(&router, 1).await;
    let entry = &history[0];
    assert_eq!(entry["trigger_id"], "login-audit");
    assert_eq!(entry["event"], "user.login");
    assert_eq!(entry["actions_executed"], 1);
    assert_eq!(entry["actions_skipped"], 1);
    assert_eq!(entry["actions_failed"], 1);
    assert_eq!(entry["errors"], json!(["audit sink offline"]));

    let (_, trigger) = call(&router, "GET", "/api/triggers/login-audit", None).await;
    assert_eq!(trigger["trigger_count"], 1);
    assert!(trigger["last_triggered"].is_string());

    let (_, stats) = call(&router, "GET", "/api/stats", None).await;
    assert_eq!(stats["total_executions"], 1);
    assert_eq!(stats["total_errors"], 1);
    assert_eq!(stats["action_handlers"], 5);

    engine.shutdown().await;
}

#[tokio::test]
async fn should_ignore_disabled_trigger_until_enabled() {
    let (engine, router) = app().await;
    call(
        &router,
        "POST",
        "/api/triggers",
        Some(json!({"id": "t", "event": "file.saved", "enabled": false,
                    "actions": [{"type": "log"}]})),
    )
    .await;

    let (_, results) = call(&router, "POST", "/api/events/file.saved/dispatch", None).await;
    assert_eq!(results, json!([]));

    let (status, _) = call(
        &router,
        "PUT",
        "/api/triggers/t/enabled",
        Some(json!({"enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, results) = call(&router, "POST", "/api/events/file.saved/dispatch", None).await;
    assert_eq!(results.as_array().unwrap().len(), 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn should_bound_history_to_configured_capacity() {
    let (engine, router) = app().await;
    call(
        &router,
        "POST",
        "/api/triggers",
        Some(json!({"event": "tick", "actions": [{"type": "log"}]})),
    )
    .await;

    for n in 0..15 {
        call(&router, "POST", "/api/events/tick/dispatch", Some(json!({"n": n}))).await;
    }

    let (_, history) = call(&router, "GET", "/api/history?limit=100", None).await;
    assert_eq!(history.as_array().unwrap().len(), 10);

    let (status, _) = call(&router, "DELETE", "/api/history", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, history) = call(&router, "GET", "/api/history", None).await;
    assert_eq!(history, json!([]));
    engine.shutdown().await;
}

#[tokio::test]
async fn should_bound_history_when_events_published_faster_than_processed() {
    let (engine, router) = app().await;
    call(
        &router,
        "POST",
        "/api/triggers",
        Some(json!({"id": "tick", "event": "tick", "actions": [{"type": "log"}]})),
    )
    .await;

    for n in 0..300 {
        let (status, _) = call(&router, "POST", "/api/events/tick", Some(json!({"n": n}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let mut fired = Value::Null;
    for _ in 0..400 {
        let (_, trigger) = call(&router, "GET", "/api/triggers/tick", None).await;
        fired = trigger["trigger_count"].clone();
        if fired == json!(300) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(fired, json!(300));
    // Shutdown lets the last event finish recording.
    engine.shutdown().await;

    let (_, history) = call(&router, "GET", "/api/history?limit=100", None).await;
    assert_eq!(history.as_array().unwrap().len(), 10);
    let (_, stats) = call(&router, "GET", "/api/stats", None).await;
    assert_eq!(stats["total_executions"], 10);
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_validate_workflow_definition() {
    let (engine, router) = app().await;
    let (status, body) = call(
        &router,
        "POST",
        "/api/workflows/validate",
        Some(json!({
            "name": "release",
            "category": "ci",
            "steps": [
                {"id": "build", "action": "shell", "params": {"cmd": "make"}},
                {"id": "publish", "action": "upload", "dependencies": ["build"]}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "ci");
    assert_eq!(body["steps"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &router,
        "POST",
        "/api/workflows/validate",
        Some(json!({
            "name": "broken",
            "steps": [
                {"id": "a", "action": "x"},
                {"id": "a", "action": "y"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate step ids: a");
    engine.shutdown().await;
}
