//! Workflow template API controllers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use contractflow_core::application::{PreviewRequest, WorkflowDefinition};
use contractflow_core::domain::workflow::WorkflowId;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::{bad_request, map_workflow_error};
use crate::presentation::extractors::Actor;
use crate::presentation::models::{
    ApprovalPlanResponse, WorkflowListQuery, WorkflowPreviewRequest, WorkflowRequest,
    WorkflowResponse,
};

impl WorkflowRequest {
    fn into_definition(self) -> Result<WorkflowDefinition, String> {
        let steps = self
            .steps
            .into_iter()
            .map(|step| step.into_step())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkflowDefinition {
            name: self.name,
            description: self.description,
            contract_type: self.contract_type,
            is_default: self.is_default,
            active: self.active.unwrap_or(true),
            steps,
        })
    }
}

/// POST /api/v1/workflows - Create an approval template
#[utoipa::path(
    post,
    path = "/api/v1/workflows",
    request_body = WorkflowRequest,
    responses(
        (status = 201, description = "Workflow created", body = WorkflowResponse),
        (status = 400, description = "Invalid workflow definition"),
        (status = 409, description = "Workflow name already exists")
    ),
    tag = "workflows"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id()))]
pub async fn create_workflow(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<WorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowResponse>), Response> {
    let definition = request.into_definition().map_err(bad_request)?;

    let workflow = state
        .services
        .workflows
        .create(definition)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create workflow");
            map_workflow_error(e)
        })?;

    info!(workflow_id = %workflow.id, "Workflow created via API");
    Ok((StatusCode::CREATED, Json(workflow.into())))
}

/// GET /api/v1/workflows - List approval templates
#[utoipa::path(
    get,
    path = "/api/v1/workflows",
    params(WorkflowListQuery),
    responses(
        (status = 200, description = "Workflows", body = Vec<WorkflowResponse>)
    ),
    tag = "workflows"
)]
pub async fn list_workflows(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<WorkflowListQuery>,
) -> Result<Json<Vec<WorkflowResponse>>, Response> {
    let workflows = state
        .services
        .workflows
        .list(query.active_only)
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(workflows.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/workflows/{id} - Get an approval template
#[utoipa::path(
    get,
    path = "/api/v1/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow found", body = WorkflowResponse),
        (status = 404, description = "Workflow not found")
    ),
    tag = "workflows"
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowResponse>, Response> {
    let workflow = state
        .services
        .workflows
        .get(&WorkflowId::new(id))
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(workflow.into()))
}

/// PUT /api/v1/workflows/{id} - Replace an approval template
#[utoipa::path(
    put,
    path = "/api/v1/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Workflow updated", body = WorkflowResponse),
        (status = 400, description = "Invalid workflow definition"),
        (status = 404, description = "Workflow not found"),
        (status = 409, description = "Workflow name already exists")
    ),
    tag = "workflows"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), workflow_id = %id))]
pub async fn update_workflow(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<WorkflowRequest>,
) -> Result<Json<WorkflowResponse>, Response> {
    let definition = request.into_definition().map_err(bad_request)?;

    let workflow = state
        .services
        .workflows
        .update(&WorkflowId::new(id), definition)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update workflow");
            map_workflow_error(e)
        })?;

    Ok(Json(workflow.into()))
}

/// DELETE /api/v1/workflows/{id} - Delete an unused approval template
#[utoipa::path(
    delete,
    path = "/api/v1/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 204, description = "Workflow deleted"),
        (status = 404, description = "Workflow not found"),
        (status = 409, description = "Contracts pending approval still use it")
    ),
    tag = "workflows"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), workflow_id = %id))]
pub async fn delete_workflow(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    state
        .services
        .workflows
        .delete(&WorkflowId::new(id))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete workflow");
            map_workflow_error(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/workflows/preview - Show the routing a contract would get
#[utoipa::path(
    post,
    path = "/api/v1/workflows/preview",
    request_body = WorkflowPreviewRequest,
    responses(
        (status = 200, description = "Resolved approval plan", body = ApprovalPlanResponse),
        (status = 409, description = "No applicable workflow or unresolvable step")
    ),
    tag = "workflows"
)]
pub async fn preview_workflow(
    State(state): State<AppState>,
    _actor: Actor,
    Json(request): Json<WorkflowPreviewRequest>,
) -> Result<Json<ApprovalPlanResponse>, Response> {
    let plan = state
        .services
        .workflows
        .preview(&PreviewRequest {
            contract_type: request.contract_type,
            amount_cents: request.amount_cents,
            department: request.department,
        })
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(plan.into()))
}
