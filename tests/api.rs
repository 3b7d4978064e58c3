mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::offline_state;
use ledgerly::api;

fn app() -> Router {
    api::router(offline_state(&[]))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_tenant_header_is_unauthenticated() {
    let request = Request::builder().uri("/api/customers").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn malformed_tenant_header_is_unauthenticated() {
    for value in ["abc", "0", "-4"] {
        let request = Request::builder()
            .uri("/api/invoices")
            .header("x-user-id", value)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {value}");
    }
}

#[tokio::test]
async fn invoice_without_items_fails_validation() {
    let request = json_request(
        "POST",
        "/api/invoices",
        Some("1"),
        json!({
            "customer_id": 1,
            "issue_date": "2024-05-10",
            "due_date": "2024-05-01",
            "discount": {"kind": "percentage", "value": 150},
            "items": []
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("items"));
    assert!(message.contains("due_date"));
    assert!(message.contains("discount"));
}

#[tokio::test]
async fn customer_with_bad_email_fails_validation() {
    let request = json_request(
        "POST",
        "/api/customers",
        Some("1"),
        json!({"name": "Acme", "email": "not-an-email"}),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn malformed_json_is_invalid_input() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header("x-user-id", "1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn unknown_status_is_invalid_input() {
    let request = json_request("PUT", "/api/invoices/3/status", Some("1"), json!({"status": "void"}));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn totals_preview_matches_worked_example() {
    let request = json_request(
        "POST",
        "/api/totals/preview",
        None,
        json!({
            "items": [
                {"quantity": 2, "unit_price": 10},
                {"quantity": 1, "unit_price": 5}
            ],
            "discount": {"kind": "percentage", "value": 10},
            "tax": {"kind": "percentage", "value": 5}
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal"], 25.0);
    assert_eq!(body["discount_amount"], 2.5);
    assert_eq!(body["taxable_amount"], 22.5);
    assert_eq!(body["tax_amount"], 1.125);
    assert_eq!(body["total"], 23.625);
}

#[tokio::test]
async fn totals_preview_rejects_percentage_over_100() {
    let request = json_request(
        "POST",
        "/api/totals/preview",
        None,
        json!({
            "items": [{"quantity": 1, "unit_price": 10}],
            "tax": {"kind": "percentage", "value": 120}
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn milestone_generation_needs_an_api_key() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/submissions/5/milestones/generate")
        .header("x-user-id", "1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn emailing_an_invoice_needs_an_smtp_relay() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/invoices/3/email")
        .header("x-user-id", "1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIG_ERROR");
}

fn multipart_request(uri: &str, field: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "ledgerly-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"cover\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", "1")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn cover_upload_rejects_non_images() {
    let request = multipart_request("/api/blogs/1/cover", "image", "application/pdf", b"%PDF-1.4");
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FILE_TYPE");
}

#[tokio::test]
async fn cover_upload_enforces_size_limit() {
    let request = multipart_request("/api/blogs/1/cover", "image", "image/png", &[0u8; 2048]);
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn cover_upload_requires_image_field() {
    let request = multipart_request("/api/blogs/1/cover", "file", "image/png", b"\x89PNG");
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
