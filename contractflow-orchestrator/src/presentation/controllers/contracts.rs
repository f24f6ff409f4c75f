//! Contract lifecycle API controllers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use contractflow_core::application::{ContractPatch, CreateContractCommand};
use contractflow_core::domain::contract::{
    ContractFilter, ContractId, ContractSort, ContractStatus, SortDirection,
};
use contractflow_core::domain::directory::UserId;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::{bad_request, map_contract_error};
use crate::presentation::extractors::Actor;
use crate::presentation::models::{
    ContractListQuery, ContractListResponse, ContractResponse, CreateContractRequest,
    HistoryEntryResponse, TerminateContractRequest, UpdateContractRequest,
};

impl ContractListQuery {
    fn into_filter(self) -> Result<ContractFilter, String> {
        Ok(ContractFilter {
            status: self
                .status
                .as_deref()
                .map(str::parse::<ContractStatus>)
                .transpose()?,
            counterparty: self.counterparty,
            contract_type: self.contract_type,
            department: self.department,
            created_by: self.created_by.map(UserId::new),
            search: self.search,
            expiring_before: self.expiring_before,
            sort: self
                .sort
                .as_deref()
                .map(str::parse::<ContractSort>)
                .transpose()?
                .unwrap_or_default(),
            direction: self
                .direction
                .as_deref()
                .map(str::parse::<SortDirection>)
                .transpose()?
                .unwrap_or_default(),
            offset: self.offset.unwrap_or(0),
            limit: self.limit.unwrap_or(0),
        })
    }
}

/// POST /api/v1/contracts - Create a draft contract
#[utoipa::path(
    post,
    path = "/api/v1/contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created", body = ContractResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or unknown X-User-Id"),
        (status = 409, description = "Contract number already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id()))]
pub async fn create_contract(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractResponse>), Response> {
    let command = CreateContractCommand {
        contract_number: request.contract_number,
        title: request.title,
        description: request.description,
        counterparty: request.counterparty,
        contract_type: request.contract_type,
        department: request.department,
        amount_cents: request.amount_cents,
        currency: request.currency,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let contract = state
        .services
        .contracts
        .create(command, actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create contract");
            map_contract_error(e)
        })?;

    info!(contract_id = %contract.id, "Contract created via API");
    Ok((StatusCode::CREATED, Json(contract.into())))
}

/// GET /api/v1/contracts - List contracts
#[utoipa::path(
    get,
    path = "/api/v1/contracts",
    params(ContractListQuery),
    responses(
        (status = 200, description = "Contracts page", body = ContractListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Missing or unknown X-User-Id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ContractListQuery>,
) -> Result<Json<ContractListResponse>, Response> {
    let filter = query.into_filter().map_err(bad_request)?;

    let page = state.services.contracts.list(filter).await.map_err(|e| {
        error!(error = %e, "Failed to list contracts");
        map_contract_error(e)
    })?;

    Ok(Json(page.into()))
}

/// GET /api/v1/contracts/{id} - Get a contract
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract found", body = ContractResponse),
        (status = 401, description = "Missing or unknown X-User-Id"),
        (status = 404, description = "Contract not found")
    ),
    tag = "contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .services
        .contracts
        .get(&ContractId::new(id))
        .await
        .map_err(map_contract_error)?;

    Ok(Json(contract.into()))
}

/// PUT /api/v1/contracts/{id} - Edit a draft or rejected contract
#[utoipa::path(
    put,
    path = "/api/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = ContractResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not editable")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn update_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContractRequest>,
) -> Result<Json<ContractResponse>, Response> {
    let patch = ContractPatch {
        title: request.title,
        description: request.description,
        counterparty: request.counterparty,
        contract_type: request.contract_type,
        department: request.department,
        amount_cents: request.amount_cents,
        currency: request.currency,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let contract = state
        .services
        .contracts
        .update(&ContractId::new(id), patch, actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// DELETE /api/v1/contracts/{id} - Delete a draft contract
#[utoipa::path(
    delete,
    path = "/api/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not a draft")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn delete_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    state
        .services
        .contracts
        .delete(&ContractId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete contract");
            map_contract_error(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/contracts/{id}/submit - Route a draft into approval
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/submit",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract submitted", body = ContractResponse),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Invalid transition or no applicable workflow")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn submit_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .workflow
        .submit(&ContractId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to submit contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// POST /api/v1/contracts/{id}/withdraw - Pull a contract out of approval
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract back in draft", body = ContractResponse),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not pending approval")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn withdraw_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .workflow
        .withdraw(&ContractId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to withdraw contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// POST /api/v1/contracts/{id}/revise - Reopen a rejected contract
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/revise",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract back in draft", body = ContractResponse),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not rejected")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn revise_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .services
        .contracts
        .revise(&ContractId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to revise contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// POST /api/v1/contracts/{id}/activate - Put an approved contract into force
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/activate",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract active", body = ContractResponse),
        (status = 400, description = "End date already passed"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not approved")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn activate_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .services
        .contracts
        .activate(&ContractId::new(id), actor.id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to activate contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// POST /api/v1/contracts/{id}/terminate - End an active contract early
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/terminate",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = TerminateContractRequest,
    responses(
        (status = 200, description = "Contract terminated", body = ContractResponse),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not active")
    ),
    tag = "contracts"
)]
#[instrument(skip(state, actor, request), fields(user_id = %actor.id(), contract_id = %id))]
pub async fn terminate_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<TerminateContractRequest>,
) -> Result<Json<ContractResponse>, Response> {
    let contract = state
        .services
        .contracts
        .terminate(&ContractId::new(id), actor.id(), &request.reason)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to terminate contract");
            map_contract_error(e)
        })?;

    Ok(Json(contract.into()))
}

/// GET /api/v1/contracts/{id}/history - Audit trail
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/history",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "History, oldest first", body = Vec<HistoryEntryResponse>),
        (status = 404, description = "Contract not found")
    ),
    tag = "contracts"
)]
pub async fn get_contract_history(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntryResponse>>, Response> {
    let history = state
        .services
        .contracts
        .history(&ContractId::new(id))
        .await
        .map_err(map_contract_error)?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_parses_filters() {
        let query = ContractListQuery {
            status: Some("pending_approval".to_string()),
            sort: Some("amount".to_string()),
            direction: Some("asc".to_string()),
            limit: Some(10),
            ..Default::default()
        };

        let filter = query.into_filter().expect("valid query");
        assert_eq!(filter.status, Some(ContractStatus::PendingApproval));
        assert_eq!(filter.sort, ContractSort::Amount);
        assert_eq!(filter.direction, SortDirection::Asc);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_list_query_rejects_unknown_values() {
        let bad_status = ContractListQuery {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(bad_status.into_filter().is_err());

        let bad_sort = ContractListQuery {
            sort: Some("color".to_string()),
            ..Default::default()
        };
        assert!(bad_sort.into_filter().is_err());
    }
}
