//! Report data models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::approval::ApprovalId;
use crate::domain::contract::{Contract, ContractId};
use crate::domain::directory::UserId;

/// Optional `[from, to)` window on `created_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Aggregate for one department, contract type or counterparty
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupStat {
    pub key: String,
    pub count: u64,
    pub total_value_cents: i64,
    pub average_value_cents: i64,
    /// Share of all contracts in the report, 0-100 with two decimals
    pub percentage: f64,
}

/// Portfolio overview
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContractSummaryReport {
    pub window: ReportWindow,
    pub total_contracts: u64,
    pub by_status: BTreeMap<String, u64>,
    pub total_value_cents: i64,
    pub average_value_cents: i64,
    pub by_department: Vec<GroupStat>,
    pub by_type: Vec<GroupStat>,
    /// Largest counterparties by contract count
    pub by_counterparty: Vec<GroupStat>,
    pub generated_at: DateTime<Utc>,
}

/// Pending workload of one approver
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApproverLoad {
    pub approver_id: UserId,
    /// Display name when the approver is still in the directory
    pub approver_name: Option<String>,
    pub pending: u64,
    pub oldest_pending_at: DateTime<Utc>,
}

/// A pending approval older than the configured threshold
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverdueApproval {
    pub approval_id: ApprovalId,
    pub contract_id: ContractId,
    pub step_name: String,
    pub approver_id: UserId,
    pub pending_since: DateTime<Utc>,
    pub days_waiting: i64,
}

/// Approval throughput and backlog
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApprovalReport {
    pub window: ReportWindow,
    pub total_decisions: u64,
    pub approved: u64,
    pub rejected: u64,
    /// Approved share of decisions, 0-100 with two decimals
    pub approval_rate: f64,
    pub average_decision_hours: f64,
    pub pending_by_approver: Vec<ApproverLoad>,
    pub overdue: Vec<OverdueApproval>,
    pub overdue_after_days: u32,
    pub generated_at: DateTime<Utc>,
}

/// Active contracts approaching their end date
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExpiringReport {
    pub as_of: NaiveDate,
    pub within_days: u32,
    pub contracts: Vec<Contract>,
    pub generated_at: DateTime<Utc>,
}
