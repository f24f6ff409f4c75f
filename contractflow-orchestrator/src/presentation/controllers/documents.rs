//! Contract document API controllers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
};
use tracing::{error, instrument};
use uuid::Uuid;

use contractflow_core::domain::contract::ContractId;
use contractflow_core::domain::document::DocumentMetadata;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::map_contract_error;
use crate::presentation::extractors::Actor;
use crate::presentation::models::{AddDocumentRequest, DocumentResponse};

/// POST /api/v1/contracts/{id}/documents - Register a new document version
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/documents",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = AddDocumentRequest,
    responses(
        (status = 201, description = "Document version added", body = DocumentResponse),
        (status = 400, description = "Invalid metadata"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract no longer accepts documents")
    ),
    tag = "documents"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn add_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), Response> {
    let metadata = DocumentMetadata {
        file_name: request.file_name,
        content_type: request.content_type,
        size_bytes: request.size_bytes,
        checksum: request.checksum,
        storage_uri: request.storage_uri,
        note: request.note,
    };

    let document = state
        .services
        .documents
        .add_version(&ContractId::new(id), metadata, actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to add document version");
            map_contract_error(e)
        })?;

    Ok((StatusCode::CREATED, Json(document.into())))
}

/// GET /api/v1/contracts/{id}/documents - Every document version
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/documents",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Versions, newest first", body = Vec<DocumentResponse>),
        (status = 404, description = "Contract not found")
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentResponse>>, Response> {
    let documents = state
        .services
        .documents
        .list(&ContractId::new(id))
        .await
        .map_err(map_contract_error)?;

    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/contracts/{id}/documents/{version} - One document version
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/documents/{version}",
    params(
        ("id" = Uuid, Path, description = "Contract ID"),
        ("version" = u32, Path, description = "Version number, starting at 1")
    ),
    responses(
        (status = 200, description = "Document version", body = DocumentResponse),
        (status = 404, description = "Version not found")
    ),
    tag = "documents"
)]
pub async fn get_document_version(
    State(state): State<AppState>,
    _actor: Actor,
    Path((id, version)): Path<(Uuid, u32)>,
) -> Result<Json<DocumentResponse>, Response> {
    let document = state
        .services
        .documents
        .get_version(&ContractId::new(id), version)
        .await
        .map_err(map_contract_error)?;

    Ok(Json(document.into()))
}
