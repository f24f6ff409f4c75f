//! Route definitions and server setup

use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    middleware,
    routing::{get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use contractflow_core::config::Config;

use crate::presentation::controllers::{
    AppState, approvals, comments, contracts, documents, health, notifications, reports,
    workflows,
};
use crate::presentation::extractors::USER_ID_HEADER;
use crate::presentation::middleware::{
    REQUEST_ID_HEADER, logging_middleware, security_headers_middleware,
};
use crate::presentation::models::*;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::contracts::create_contract,
        crate::presentation::controllers::contracts::list_contracts,
        crate::presentation::controllers::contracts::get_contract,
        crate::presentation::controllers::contracts::update_contract,
        crate::presentation::controllers::contracts::delete_contract,
        crate::presentation::controllers::contracts::submit_contract,
        crate::presentation::controllers::contracts::withdraw_contract,
        crate::presentation::controllers::contracts::revise_contract,
        crate::presentation::controllers::contracts::activate_contract,
        crate::presentation::controllers::contracts::terminate_contract,
        crate::presentation::controllers::contracts::get_contract_history,
        crate::presentation::controllers::approvals::list_contract_approvals,
        crate::presentation::controllers::approvals::list_pending_approvals,
        crate::presentation::controllers::approvals::approve,
        crate::presentation::controllers::approvals::reject,
        crate::presentation::controllers::workflows::create_workflow,
        crate::presentation::controllers::workflows::list_workflows,
        crate::presentation::controllers::workflows::get_workflow,
        crate::presentation::controllers::workflows::update_workflow,
        crate::presentation::controllers::workflows::delete_workflow,
        crate::presentation::controllers::workflows::preview_workflow,
        crate::presentation::controllers::documents::add_document,
        crate::presentation::controllers::documents::list_documents,
        crate::presentation::controllers::documents::get_document_version,
        crate::presentation::controllers::comments::add_comment,
        crate::presentation::controllers::comments::list_comments,
        crate::presentation::controllers::comments::edit_comment,
        crate::presentation::controllers::comments::delete_comment,
        crate::presentation::controllers::notifications::list_notifications,
        crate::presentation::controllers::notifications::unread_count,
        crate::presentation::controllers::notifications::mark_notification_read,
        crate::presentation::controllers::notifications::mark_all_notifications_read,
        crate::presentation::controllers::reports::contract_summary_report,
        crate::presentation::controllers::reports::approval_report,
        crate::presentation::controllers::reports::expiring_report,
        crate::presentation::controllers::health::health_check,
    ),
    components(
        schemas(
            CreateContractRequest,
            UpdateContractRequest,
            TerminateContractRequest,
            ContractResponse,
            ContractListResponse,
            HistoryEntryResponse,
            DecisionRequest,
            ApprovalResponse,
            DecisionResponse,
            ApproverSpecDto,
            StepConditionDto,
            WorkflowStepDto,
            WorkflowRequest,
            WorkflowResponse,
            WorkflowPreviewRequest,
            PlannedStageDto,
            ApprovalPlanResponse,
            AddDocumentRequest,
            DocumentResponse,
            AddCommentRequest,
            EditCommentRequest,
            CommentResponse,
            NotificationResponse,
            UnreadCountResponse,
            MarkAllReadResponse,
            GroupStatDto,
            ContractSummaryResponse,
            ApproverLoadDto,
            OverdueApprovalDto,
            ApprovalReportResponse,
            ExpiringReportResponse,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "contracts", description = "Contract records and lifecycle transitions"),
        (name = "approvals", description = "Approver decisions and pending work"),
        (name = "workflows", description = "Approval templates and routing preview"),
        (name = "documents", description = "Versioned contract document metadata"),
        (name = "comments", description = "Threaded contract discussion"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "reports", description = "Portfolio and approval reporting"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "ContractFlow API",
        version = "0.3.0",
        description = "Contract lifecycle management with multi-step approval routing. Every /api/v1 call identifies its caller with the X-User-Id header.",
        license(
            name = "AGPL-3.0",
            url = "https://www.gnu.org/licenses/agpl-3.0.html"
        )
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = if config.server.allowed_origins.len() == 1 && config.server.allowed_origins[0] == "*"
    {
        CorsLayer::new().allow_origin(AllowOrigin::mirror_request())
    } else {
        let mut layer = CorsLayer::new();
        for origin in &config.server.allowed_origins {
            match axum::http::HeaderValue::from_str(origin) {
                Ok(origin_header) => {
                    layer = layer.allow_origin(origin_header);
                }
                Err(_) => {
                    tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                }
            }
        }
        layer
    };

    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600))
}

/// Build the application router
pub fn create_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    let contract_routes = Router::new()
        .route(
            "/contracts",
            post(contracts::create_contract).get(contracts::list_contracts),
        )
        .route(
            "/contracts/{id}",
            get(contracts::get_contract)
                .put(contracts::update_contract)
                .delete(contracts::delete_contract),
        )
        .route("/contracts/{id}/submit", post(contracts::submit_contract))
        .route("/contracts/{id}/withdraw", post(contracts::withdraw_contract))
        .route("/contracts/{id}/revise", post(contracts::revise_contract))
        .route("/contracts/{id}/activate", post(contracts::activate_contract))
        .route("/contracts/{id}/terminate", post(contracts::terminate_contract))
        .route("/contracts/{id}/history", get(contracts::get_contract_history))
        .route(
            "/contracts/{id}/approvals",
            get(approvals::list_contract_approvals),
        )
        .route(
            "/contracts/{id}/documents",
            post(documents::add_document).get(documents::list_documents),
        )
        .route(
            "/contracts/{id}/documents/{version}",
            get(documents::get_document_version),
        )
        .route(
            "/contracts/{id}/comments",
            post(comments::add_comment).get(comments::list_comments),
        );

    let api_routes = Router::new()
        .merge(contract_routes)
        .route("/approvals/pending", get(approvals::list_pending_approvals))
        .route("/approvals/{id}/approve", post(approvals::approve))
        .route("/approvals/{id}/reject", post(approvals::reject))
        .route(
            "/workflows",
            post(workflows::create_workflow).get(workflows::list_workflows),
        )
        .route("/workflows/preview", post(workflows::preview_workflow))
        .route(
            "/workflows/{id}",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/comments/{id}",
            put(comments::edit_comment).delete(comments::delete_comment),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/notifications/read-all",
            post(notifications::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            post(notifications::mark_notification_read),
        )
        .route("/reports/contracts", get(reports::contract_summary_report))
        .route("/reports/approvals", get(reports::approval_report))
        .route("/reports/expiring", get(reports::expiring_report));

    let health_routes = Router::new().route("/health", get(health::health_check));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes);

    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_seconds),
        ))
        .layer(middleware::from_fn(logging_middleware));

    if config.server.security.enable_security_headers {
        router = router.layer(middleware::from_fn(security_headers_middleware));
    }

    router.layer(service_builder).with_state(app_state)
}
