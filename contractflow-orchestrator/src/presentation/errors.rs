//! Domain error to HTTP response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use contractflow_core::domain::contract::ContractError;
use contractflow_core::domain::directory::DirectoryError;
use contractflow_core::domain::notification::NotificationError;
use contractflow_core::domain::workflow::WorkflowError;

use crate::presentation::models::ErrorResponse;

/// Build the JSON error body every endpoint returns
pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = Json(ErrorResponse {
        code: code.to_string(),
        message: message.to_string(),
        details: None,
        request_id: Uuid::new_v4(),
        timestamp: chrono::Utc::now(),
    });

    (status, body).into_response()
}

/// 400 for malformed query or path input
pub fn bad_request(message: impl AsRef<str>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message.as_ref())
}

fn internal_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error",
    )
}

pub fn map_contract_error(error: ContractError) -> Response {
    let error = match error {
        ContractError::Workflow(e) => return map_workflow_error(e),
        ContractError::Directory(e) => return map_directory_error(e),
        ContractError::Notification(e) => return map_notification_error(e),
        other => other,
    };

    let (status, code, message) = match &error {
        ContractError::NotFound { id } => (
            StatusCode::NOT_FOUND,
            "CONTRACT_NOT_FOUND",
            format!("Contract {} not found", id),
        ),
        ContractError::DuplicateNumber { number } => (
            StatusCode::CONFLICT,
            "DUPLICATE_CONTRACT_NUMBER",
            format!("Contract number '{}' already exists", number),
        ),
        ContractError::Validation { .. } => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            error.to_string(),
        ),
        ContractError::InvalidTransition { .. } => (
            StatusCode::CONFLICT,
            "INVALID_TRANSITION",
            error.to_string(),
        ),
        ContractError::NotEditable { .. } => {
            (StatusCode::CONFLICT, "NOT_EDITABLE", error.to_string())
        }
        ContractError::PermissionDenied { .. } => (
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            error.to_string(),
        ),
        ContractError::ApprovalNotFound { id } => (
            StatusCode::NOT_FOUND,
            "APPROVAL_NOT_FOUND",
            format!("Approval {} not found", id),
        ),
        ContractError::ApprovalNotActionable { .. } => (
            StatusCode::CONFLICT,
            "APPROVAL_NOT_ACTIONABLE",
            error.to_string(),
        ),
        ContractError::DocumentNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "DOCUMENT_NOT_FOUND",
            error.to_string(),
        ),
        ContractError::CommentNotFound { id } => (
            StatusCode::NOT_FOUND,
            "COMMENT_NOT_FOUND",
            format!("Comment {} not found", id),
        ),
        ContractError::CommentHasReplies { .. } => (
            StatusCode::CONFLICT,
            "COMMENT_HAS_REPLIES",
            error.to_string(),
        ),
        _ => return internal_error(),
    };

    error_response(status, code, &message)
}

pub fn map_workflow_error(error: WorkflowError) -> Response {
    let error = match error {
        WorkflowError::Directory(e) => return map_directory_error(e),
        other => other,
    };

    let (status, code, message) = match &error {
        WorkflowError::NotFound { id } => (
            StatusCode::NOT_FOUND,
            "WORKFLOW_NOT_FOUND",
            format!("Workflow {} not found", id),
        ),
        WorkflowError::InvalidDefinition { reason } => {
            (StatusCode::BAD_REQUEST, "INVALID_WORKFLOW", reason.clone())
        }
        WorkflowError::NameAlreadyExists { name } => (
            StatusCode::CONFLICT,
            "NAME_EXISTS",
            format!("Workflow name '{}' already exists", name),
        ),
        WorkflowError::InUse { .. } => {
            (StatusCode::CONFLICT, "WORKFLOW_IN_USE", error.to_string())
        }
        WorkflowError::NoApplicableWorkflow { .. } => (
            StatusCode::CONFLICT,
            "NO_APPLICABLE_WORKFLOW",
            error.to_string(),
        ),
        WorkflowError::UnresolvableStep { .. } => (
            StatusCode::CONFLICT,
            "UNRESOLVABLE_STEP",
            error.to_string(),
        ),
        _ => return internal_error(),
    };

    error_response(status, code, &message)
}

pub fn map_directory_error(error: DirectoryError) -> Response {
    let (status, code, message) = match &error {
        DirectoryError::UserNotFound { id } => (
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            format!("User {} not found", id),
        ),
        DirectoryError::UserInactive { .. } => {
            (StatusCode::CONFLICT, "USER_INACTIVE", error.to_string())
        }
        DirectoryError::EmailAlreadyExists { .. } | DirectoryError::ReferenceAlreadyExists { .. } => {
            (StatusCode::CONFLICT, "ALREADY_EXISTS", error.to_string())
        }
        DirectoryError::DatabaseError { .. } => return internal_error(),
    };

    error_response(status, code, &message)
}

pub fn map_notification_error(error: NotificationError) -> Response {
    let (status, code, message) = match &error {
        NotificationError::NotFound { id } => (
            StatusCode::NOT_FOUND,
            "NOTIFICATION_NOT_FOUND",
            format!("Notification {} not found", id),
        ),
        NotificationError::PermissionDenied { .. } => (
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            error.to_string(),
        ),
        NotificationError::DatabaseError { .. } => return internal_error(),
    };

    error_response(status, code, &message)
}
