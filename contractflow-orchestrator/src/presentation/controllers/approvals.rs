//! Approval decision API controllers

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{Json, Response},
};
use tracing::{error, instrument};
use uuid::Uuid;

use contractflow_core::domain::approval::{ApprovalId, Decision};
use contractflow_core::domain::contract::ContractId;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::{bad_request, map_contract_error};
use crate::presentation::extractors::Actor;
use crate::presentation::models::{ApprovalResponse, DecisionRequest, DecisionResponse};

/// GET /api/v1/contracts/{id}/approvals - Every approval record of a contract
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/approvals",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Approval records, all rounds", body = Vec<ApprovalResponse>),
        (status = 404, description = "Contract not found")
    ),
    tag = "approvals"
)]
pub async fn list_contract_approvals(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApprovalResponse>>, Response> {
    let approvals = state
        .workflow
        .list_for_contract(&ContractId::new(id))
        .await
        .map_err(map_contract_error)?;

    Ok(Json(approvals.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/approvals/pending - Approvals waiting on the caller
#[utoipa::path(
    get,
    path = "/api/v1/approvals/pending",
    responses(
        (status = 200, description = "Pending approvals, oldest first", body = Vec<ApprovalResponse>),
        (status = 401, description = "Missing or unknown X-User-Id")
    ),
    tag = "approvals"
)]
pub async fn list_pending_approvals(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<ApprovalResponse>>, Response> {
    let approvals = state
        .workflow
        .pending_for(&actor.id())
        .await
        .map_err(map_contract_error)?;

    Ok(Json(approvals.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/approvals/{id}/approve - Approve a step
#[utoipa::path(
    post,
    path = "/api/v1/approvals/{id}/approve",
    params(("id" = Uuid, Path, description = "Approval ID")),
    request_body(content = DecisionRequest, description = "Optional comment"),
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 403, description = "Approval assigned to another user"),
        (status = 404, description = "Approval not found"),
        (status = 409, description = "Approval is not pending")
    ),
    tag = "approvals"
)]
pub async fn approve(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<DecisionResponse>, Response> {
    // The body is optional when approving
    let comment = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<DecisionRequest>(&body)
            .map_err(|e| bad_request(format!("Invalid request body: {}", e)))?
            .comment
    };
    decide(state, actor, id, Decision::Approve, comment).await
}

/// POST /api/v1/approvals/{id}/reject - Reject a step; a comment is required
#[utoipa::path(
    post,
    path = "/api/v1/approvals/{id}/reject",
    params(("id" = Uuid, Path, description = "Approval ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 400, description = "Missing rejection comment"),
        (status = 403, description = "Approval assigned to another user"),
        (status = 404, description = "Approval not found"),
        (status = 409, description = "Approval is not pending")
    ),
    tag = "approvals"
)]
pub async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, Response> {
    decide(state, actor, id, Decision::Reject, request.comment).await
}

#[instrument(skip(state, actor, comment), fields(user_id = %actor.id(), approval_id = %id))]
async fn decide(
    state: AppState,
    actor: Actor,
    id: Uuid,
    decision: Decision,
    comment: Option<String>,
) -> Result<Json<DecisionResponse>, Response> {
    let result = state
        .workflow
        .decide(&ApprovalId::new(id), actor.id(), decision, comment)
        .await
        .map_err(|e| {
            error!(error = %e, ?decision, "Failed to record approval decision");
            map_contract_error(e)
        })?;

    Ok(Json(result.into()))
}
