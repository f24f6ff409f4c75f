//! Contract comment API controllers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
};
use tracing::{error, instrument};
use uuid::Uuid;

use contractflow_core::domain::comment::CommentId;
use contractflow_core::domain::contract::ContractId;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::map_contract_error;
use crate::presentation::extractors::Actor;
use crate::presentation::models::{AddCommentRequest, CommentResponse, EditCommentRequest};

/// POST /api/v1/contracts/{id}/comments - Comment on a contract
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/comments",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = CommentResponse),
        (status = 400, description = "Empty body or foreign parent"),
        (status = 404, description = "Contract or parent comment not found")
    ),
    tag = "comments"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn add_comment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), Response> {
    let comment = state
        .services
        .comments
        .add(
            &ContractId::new(id),
            actor.id(),
            &request.body,
            request.parent_id.map(CommentId::new),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to add comment");
            map_contract_error(e)
        })?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// GET /api/v1/contracts/{id}/comments - Comment thread
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/comments",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Contract not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, Response> {
    let comments = state
        .services
        .comments
        .list(&ContractId::new(id))
        .await
        .map_err(map_contract_error)?;

    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// PUT /api/v1/comments/{id} - Edit one's own comment
#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = EditCommentRequest,
    responses(
        (status = 200, description = "Comment edited", body = CommentResponse),
        (status = 400, description = "Empty body"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), comment_id = %id))]
pub async fn edit_comment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<EditCommentRequest>,
) -> Result<Json<CommentResponse>, Response> {
    let comment = state
        .services
        .comments
        .edit(&CommentId::new(id), actor.id(), &request.body)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to edit comment");
            map_contract_error(e)
        })?;

    Ok(Json(comment.into()))
}

/// DELETE /api/v1/comments/{id} - Delete one's own comment
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Comment has replies")
    ),
    tag = "comments"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), comment_id = %id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    state
        .services
        .comments
        .delete(&CommentId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete comment");
            map_contract_error(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}
