mod common;

use std::sync::Arc;
use axum::body::Body;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use crmbot::api::{build_router, AppState};
use crmbot::dispatch::messages;

const TOKEN: &str = "s3cret-token";

fn create_test_state(api_token: Option<&str>) -> AppState {
    AppState {
        dispatcher: Arc::new(common::dispatcher()),
        api_token: api_token.map(String::from),
    }
}

fn authed_state() -> AppState {
    create_test_state(Some(TOKEN))
}

fn app(state: &AppState) -> axum::Router {
    build_router(state.clone())
}

fn make_request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", TOKEN));

    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn command(caller_id: i64, text: &str) -> axum::http::Request<Body> {
    make_request("POST", "/api/commands", Some(json!({ "caller_id": caller_id, "text": text })))
}

async fn response_bytes(response: axum::http::Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn response_json(response: axum::http::Response<Body>) -> Value {
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        panic!("Empty response body. Status: {}, Headers: {:?}", parts.status, parts.headers);
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

#[tokio::test]
async fn test_index() {
    let state = authed_state();
    let response = app(&state).oneshot(make_request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_bytes(response).await, b"Bot is running!");
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = authed_state();
    let response = app(&state).oneshot(make_request("GET", "/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "crmbot");
    assert_eq!(body["backup_strategy"], "in_process");
    assert!(body["build"]["git_hash"].is_string());
}

#[tokio::test]
async fn test_list_reports() {
    let state = authed_state();
    let response = app(&state).oneshot(make_request("GET", "/api/reports", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[0]["report_type"], "sales");
    assert_eq!(reports[0]["title"], "Sales Report");
    assert_eq!(reports[4]["command"], "/proposals_report");
}

#[tokio::test]
async fn test_unauthorized_caller_gets_denial_text() {
    let state = authed_state();
    for text in ["/sales_report", "/backup", "/start"] {
        let response = app(&state).oneshot(command(common::STRANGER, text)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["text"], messages::UNAUTHORIZED);
        assert!(body.get("keyboard").is_none());
    }
}

#[tokio::test]
async fn test_start_returns_keyboard() {
    let state = authed_state();
    let response = app(&state).oneshot(command(common::AUTHORIZED, "/start")).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["text"], messages::WELCOME);
    assert_eq!(body["keyboard"][0], json!(["/sales_report", "/payments_report"]));
    assert_eq!(body["keyboard"][2][1], "/backup");
}

#[tokio::test]
async fn test_help_and_fallback() {
    let state = authed_state();
    let response = app(&state).oneshot(command(common::AUTHORIZED, "/help")).await.unwrap();
    let body = response_json(response).await;
    assert!(body["text"].as_str().unwrap().contains("/invoices_report"));

    let response = app(&state).oneshot(command(common::AUTHORIZED, "good morning")).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["text"], messages::FALLBACK);
}

#[tokio::test]
async fn test_report_command_returns_workbook() {
    let state = authed_state();
    let response = app(&state).oneshot(command(common::AUTHORIZED, "/invoices_report")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(
        headers["content-type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = headers["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"invoices_invoices_report_"));
    assert!(disposition.ends_with(".xlsx\""));
    assert_eq!(headers["x-caption"], "Invoices report generated successfully!");

    let bytes = response_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_backup_command_returns_sql() {
    let state = authed_state();
    let response = app(&state).oneshot(command(common::AUTHORIZED, "/backup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/sql");
    assert_eq!(response.headers()["x-caption"], messages::BACKUP_SUCCESS);

    let body = String::from_utf8(response_bytes(response).await).unwrap();
    assert!(body.starts_with("-- Database backup of perfex\n-- Generated on "));
    assert!(body.contains("INSERT INTO \"tblclients\""));
}

#[tokio::test]
async fn test_malformed_command_body_is_rejected() {
    let state = authed_state();
    let req = make_request("POST", "/api/commands", Some(json!({ "text": "/backup" })));
    let response = app(&state).oneshot(req).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_api_token_required_when_configured() {
    let state = authed_state();

    let mut req = command(common::AUTHORIZED, "/start");
    req.headers_mut().remove("Authorization");
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut req = command(common::AUTHORIZED, "/start");
    req.headers_mut().insert("Authorization", "Bearer wrong".parse().unwrap());
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&state).oneshot(command(common::AUTHORIZED, "/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // health stays open
    let mut req = make_request("GET", "/api/health", None);
    req.headers_mut().remove("Authorization");
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_commands_refused_without_configured_token() {
    let state = create_test_state(None);

    let response = app(&state).oneshot(command(common::AUTHORIZED, "/backup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("CRMBOT_API_TOKEN"));

    let mut req = command(common::AUTHORIZED, "/invoices_report");
    req.headers_mut().remove("Authorization");
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app(&state).oneshot(make_request("GET", "/api/reports", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app(&state).oneshot(make_request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
