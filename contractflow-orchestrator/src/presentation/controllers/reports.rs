//! Reporting API controllers

use axum::{
    extract::{Query, State},
    response::{Json, Response},
};
use chrono::{DateTime, Utc};

use contractflow_core::application::reporting::ReportWindow;
use contractflow_core::config::MAX_EXPIRING_WITHIN_DAYS;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::{bad_request, map_contract_error};
use crate::presentation::extractors::Actor;
use crate::presentation::models::{
    ApprovalReportResponse, ContractSummaryResponse, ExpiringReportQuery, ExpiringReportResponse,
    ReportQuery,
};

fn window(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<ReportWindow, Response> {
    if let (Some(from), Some(to)) = (from, to) {
        if from >= to {
            return Err(bad_request("'from' must be before 'to'"));
        }
    }
    Ok(ReportWindow { from, to })
}

/// GET /api/v1/reports/contracts - Portfolio summary
#[utoipa::path(
    get,
    path = "/api/v1/reports/contracts",
    params(ReportQuery),
    responses(
        (status = 200, description = "Contract summary", body = ContractSummaryResponse),
        (status = 400, description = "Invalid window")
    ),
    tag = "reports"
)]
pub async fn contract_summary_report(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ContractSummaryResponse>, Response> {
    let window = window(query.from, query.to)?;

    let report = state
        .services
        .reports
        .contract_summary(window, query.top)
        .await
        .map_err(map_contract_error)?;

    Ok(Json(report.into()))
}

/// GET /api/v1/reports/approvals - Decision throughput and backlog
#[utoipa::path(
    get,
    path = "/api/v1/reports/approvals",
    params(ReportQuery),
    responses(
        (status = 200, description = "Approval report", body = ApprovalReportResponse),
        (status = 400, description = "Invalid window")
    ),
    tag = "reports"
)]
pub async fn approval_report(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApprovalReportResponse>, Response> {
    let window = window(query.from, query.to)?;

    let report = state
        .services
        .reports
        .approval_report(window)
        .await
        .map_err(map_contract_error)?;

    Ok(Json(report.into()))
}

/// GET /api/v1/reports/expiring - Active contracts nearing their end date
#[utoipa::path(
    get,
    path = "/api/v1/reports/expiring",
    params(ExpiringReportQuery),
    responses(
        (status = 200, description = "Expiring contracts, soonest first", body = ExpiringReportResponse),
        (status = 400, description = "Invalid window")
    ),
    tag = "reports"
)]
pub async fn expiring_report(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ExpiringReportQuery>,
) -> Result<Json<ExpiringReportResponse>, Response> {
    let window = window(query.from, query.to)?;
    let within_days = query
        .within_days
        .unwrap_or(state.config.lifecycle.expiring_within_days);
    if within_days > MAX_EXPIRING_WITHIN_DAYS {
        return Err(bad_request(format!(
            "'within_days' cannot exceed {MAX_EXPIRING_WITHIN_DAYS}"
        )));
    }

    let report = state
        .services
        .reports
        .expiring(Utc::now().date_naive(), within_days, window)
        .await
        .map_err(map_contract_error)?;

    Ok(Json(report.into()))
}
