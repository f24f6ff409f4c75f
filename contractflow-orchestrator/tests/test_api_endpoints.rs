//! HTTP-level tests driving the router with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use contractflow_core::domain::directory::UserId;
use contractflow_orchestrator::presentation::{USER_ID_HEADER, create_router};

use common::TestEnv;

fn app(env: &TestEnv) -> Router {
    create_router(env.state.clone())
}

fn request(method: &str, uri: &str, user: Option<&UserId>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn contract_body() -> Value {
    json!({
        "title": "Cloud Hosting Agreement",
        "counterparty": "Nimbus Ltd",
        "contract_type": "services",
        "department": "Operations",
        "amount_cents": 4_500_000,
        "start_date": "2026-01-01",
        "end_date": "2026-12-31"
    })
}

fn workflow_body() -> Value {
    json!({
        "name": "Standard approval",
        "is_default": true,
        "steps": [
            {
                "step_order": 1,
                "name": "Legal review",
                "approvers": [{ "type": "role", "role": "legal" }]
            },
            {
                "step_order": 2,
                "name": "Finance sign-off",
                "mode": "any",
                "approvers": [{ "type": "role", "role": "finance" }]
            }
        ]
    })
}

#[tokio::test]
async fn test_health_reports_storage_backend() {
    let env = TestEnv::new().await;

    let (status, body) = send(app(&env), request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["storage_ok"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let env = TestEnv::new().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app(&env).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_api_requires_caller_identity() {
    let env = TestEnv::new().await;

    let (status, body) = send(app(&env), request("GET", "/api/v1/contracts", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let unknown = UserId::generate();
    let (status, _) = send(
        app(&env),
        request("GET", "/api/v1/contracts", Some(&unknown), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_get_and_list_contracts() {
    let env = TestEnv::new().await;

    let (status, created) = send(
        app(&env),
        request(
            "POST",
            "/api/v1/contracts",
            Some(&env.creator.id),
            Some(contract_body()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["currency"], "USD");
    assert!(
        created["contract_number"]
            .as_str()
            .unwrap()
            .starts_with("CT-")
    );

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(
        app(&env),
        request(
            "GET",
            &format!("/api/v1/contracts/{id}"),
            Some(&env.legal.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Cloud Hosting Agreement");

    let (status, list) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/contracts?status=draft&search=nimbus",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["contracts"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_invalid_contract_input_is_rejected() {
    let env = TestEnv::new().await;
    let mut body = contract_body();
    body["end_date"] = json!("2025-06-01");

    let (status, error) = send(
        app(&env),
        request("POST", "/api/v1/contracts", Some(&env.creator.id), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_status_filter_is_bad_request() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/contracts?status=archived",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_and_approve_over_http() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        app(&env),
        request(
            "POST",
            "/api/v1/workflows",
            Some(&env.legal.id),
            Some(workflow_body()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, created) = send(
        app(&env),
        request(
            "POST",
            "/api/v1/contracts",
            Some(&env.creator.id),
            Some(contract_body()),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, submitted) = send(
        app(&env),
        request(
            "POST",
            &format!("/api/v1/contracts/{id}/submit"),
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "pending_approval");

    let (status, pending) = send(
        app(&env),
        request("GET", "/api/v1/approvals/pending", Some(&env.legal.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let approval_id = pending[0]["id"].as_str().unwrap().to_string();

    // Approving without a body is allowed
    let (status, decision) = send(
        app(&env),
        request(
            "POST",
            &format!("/api/v1/approvals/{approval_id}/approve"),
            Some(&env.legal.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["outcome"], "in_progress");
    assert_eq!(decision["step"], 2);
    assert_eq!(decision["approval"]["status"], "approved");

    let (_, pending) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/approvals/pending",
            Some(&env.finance_b.id),
            None,
        ),
    )
    .await;
    let finance_id = pending[0]["id"].as_str().unwrap().to_string();

    let (status, decision) = send(
        app(&env),
        request(
            "POST",
            &format!("/api/v1/approvals/{finance_id}/approve"),
            Some(&env.finance_b.id),
            Some(json!({ "comment": "Within budget" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["outcome"], "approved");
    assert_eq!(decision["contract_status"], "approved");

    let (status, unread) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/notifications/unread-count",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unread["unread"], 1);
}

#[tokio::test]
async fn test_reject_without_comment_fails() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(250_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();
    let approval = env
        .state
        .workflow
        .pending_for(&env.legal.id)
        .await
        .unwrap()
        .remove(0);

    let (status, error) = send(
        app(&env),
        request(
            "POST",
            &format!("/api/v1/approvals/{}/reject", approval.id),
            Some(&env.legal.id),
            Some(json!({})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_decision_by_other_user_is_forbidden() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(250_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();
    let approval = env
        .state
        .workflow
        .pending_for(&env.legal.id)
        .await
        .unwrap()
        .remove(0);

    let (status, _) = send(
        app(&env),
        request(
            "POST",
            &format!("/api/v1/approvals/{}/approve", approval.id),
            Some(&env.finance_a.id),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_report_window_must_be_ordered() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/reports/contracts?from=2026-02-01T00:00:00Z&to=2026-01-01T00:00:00Z",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = send(
        app(&env),
        request("GET", "/api/v1/reports/contracts", Some(&env.creator.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_contracts"], 0);
}

#[tokio::test]
async fn test_expiring_report_caps_window() {
    let env = TestEnv::new().await;

    let (status, error) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/reports/expiring?within_days=100000",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_REQUEST");

    let (status, report) = send(
        app(&env),
        request(
            "GET",
            "/api/v1/reports/expiring?within_days=365",
            Some(&env.creator.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["within_days"], 365);
}
