//! API request and response models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use contractflow_core::application::reporting::{
    ApprovalReport, ApproverLoad, ContractSummaryReport, ExpiringReport, GroupStat,
    OverdueApproval,
};
use contractflow_core::domain::approval::{Approval, ApprovalOutcome};
use contractflow_core::domain::comment::Comment;
use contractflow_core::domain::contract::{Contract, ContractHistoryEntry, Page};
use contractflow_core::domain::directory::UserId;
use contractflow_core::domain::document::ContractDocument;
use contractflow_core::domain::notification::Notification;
use contractflow_core::domain::workflow::{
    ApprovalPlan, ApproverSpec, PlannedStage, StepCondition, Workflow, WorkflowStep,
};

use crate::application::DecisionResult;

// ── Contracts ────────────────────────────────────────────────────────

/// Request model for creating a contract
#[derive(Deserialize, ToSchema)]
pub struct CreateContractRequest {
    /// Contract number; generated as `CT-YYYYMMDD-XXXXXX` when omitted
    #[schema(example = "MSA-2025-001")]
    pub contract_number: Option<String>,

    #[schema(example = "Master Services Agreement")]
    pub title: String,

    pub description: Option<String>,

    #[schema(example = "Acme Corp")]
    pub counterparty: String,

    #[schema(example = "services")]
    pub contract_type: String,

    #[schema(example = "Operations")]
    pub department: Option<String>,

    /// Contract value in minor units
    #[schema(example = 12500000)]
    pub amount_cents: i64,

    /// ISO 4217 code; the configured default when omitted
    #[schema(example = "USD")]
    pub currency: Option<String>,

    #[schema(example = "2025-01-01")]
    pub start_date: NaiveDate,

    #[schema(example = "2025-12-31")]
    pub end_date: NaiveDate,
}

/// Partial update of a draft or rejected contract
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateContractRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub department: Option<String>,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Request model for early termination
#[derive(Deserialize, ToSchema)]
pub struct TerminateContractRequest {
    #[schema(example = "Counterparty breached clause 7")]
    pub reason: String,
}

/// Query parameters for contract listings
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ContractListQuery {
    /// Lifecycle status, e.g. `pending_approval`
    pub status: Option<String>,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub department: Option<String>,
    pub created_by: Option<Uuid>,
    /// Matches title, number or counterparty
    pub search: Option<String>,
    /// Only contracts ending on or before this date
    pub expiring_before: Option<NaiveDate>,
    /// One of `created_at`, `updated_at`, `title`, `amount`, `end_date`, `contract_number`
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// Contract representation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ContractResponse {
    pub id: Uuid,
    pub contract_number: String,
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub contract_type: String,
    pub department: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(example = "draft")]
    pub status: String,
    pub workflow_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id.as_uuid(),
            contract_number: contract.contract_number.into_string(),
            title: contract.title,
            description: contract.description,
            counterparty: contract.counterparty,
            contract_type: contract.contract_type,
            department: contract.department,
            amount_cents: contract.value.amount_cents,
            currency: contract.value.currency,
            start_date: contract.start_date,
            end_date: contract.end_date,
            status: contract.status.as_str().to_string(),
            workflow_id: contract.workflow_id.map(|id| id.as_uuid()),
            created_by: contract.created_by.as_uuid(),
            created_at: contract.created_at,
            updated_at: contract.updated_at,
        }
    }
}

/// Paged contract listing
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ContractListResponse {
    pub contracts: Vec<ContractResponse>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

impl From<Page<Contract>> for ContractListResponse {
    fn from(page: Page<Contract>) -> Self {
        Self {
            contracts: page.items.into_iter().map(ContractResponse::from).collect(),
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// Audit trail entry
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    #[schema(example = "submitted")]
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ContractHistoryEntry> for HistoryEntryResponse {
    fn from(entry: ContractHistoryEntry) -> Self {
        Self {
            id: entry.id.as_uuid(),
            action: entry.action.as_str().to_string(),
            from_status: entry.from_status.map(|s| s.as_str().to_string()),
            to_status: entry.to_status.map(|s| s.as_str().to_string()),
            actor_id: entry.actor_id.map(|id| id.as_uuid()),
            note: entry.note,
            created_at: entry.created_at,
        }
    }
}

// ── Approvals ────────────────────────────────────────────────────────

/// Request model for approving or rejecting
#[derive(Deserialize, ToSchema, Default)]
pub struct DecisionRequest {
    /// Required when rejecting
    #[schema(example = "Liability cap too low")]
    pub comment: Option<String>,
}

/// One approver's record
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub workflow_id: Uuid,
    pub round: u32,
    pub step_order: u32,
    pub step_name: String,
    #[schema(example = "all")]
    pub mode: String,
    pub approver_id: Uuid,
    #[schema(example = "pending")]
    pub status: String,
    pub comment: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    /// When the approver's turn began; null while the stage is waiting
    pub opened_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Approval> for ApprovalResponse {
    fn from(approval: Approval) -> Self {
        Self {
            id: approval.id.as_uuid(),
            contract_id: approval.contract_id.as_uuid(),
            workflow_id: approval.workflow_id.as_uuid(),
            round: approval.round,
            step_order: approval.step_order,
            step_name: approval.step_name,
            mode: approval.mode.as_str().to_string(),
            approver_id: approval.approver_id.as_uuid(),
            status: approval.status.as_str().to_string(),
            comment: approval.comment,
            decided_at: approval.decided_at,
            opened_at: approval.opened_at,
            created_at: approval.created_at,
        }
    }
}

/// Result of a decision
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    pub approval: ApprovalResponse,
    /// `in_progress`, `approved` or `rejected`
    #[schema(example = "in_progress")]
    pub outcome: String,
    /// Step currently awaiting decisions, or the step that rejected
    pub step: Option<u32>,
    pub contract_status: String,
}

impl From<DecisionResult> for DecisionResponse {
    fn from(result: DecisionResult) -> Self {
        let (outcome, step) = match result.outcome {
            ApprovalOutcome::InProgress { current_step } => ("in_progress", Some(current_step)),
            ApprovalOutcome::Approved => ("approved", None),
            ApprovalOutcome::Rejected { step } => ("rejected", Some(step)),
        };
        Self {
            approval: result.approval.into(),
            outcome: outcome.to_string(),
            step,
            contract_status: result.contract_status.as_str().to_string(),
        }
    }
}

// ── Workflows ────────────────────────────────────────────────────────

/// Approver selector of a workflow step
#[derive(Serialize, Deserialize, ToSchema, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApproverSpecDto {
    /// A named user
    User { user_id: Uuid },
    /// Every active user holding the role
    Role { role: String },
    /// Head of the contract's department
    DepartmentHead,
}

impl From<ApproverSpecDto> for ApproverSpec {
    fn from(dto: ApproverSpecDto) -> Self {
        match dto {
            ApproverSpecDto::User { user_id } => ApproverSpec::User {
                user_id: UserId::new(user_id),
            },
            ApproverSpecDto::Role { role } => ApproverSpec::Role { role },
            ApproverSpecDto::DepartmentHead => ApproverSpec::DepartmentHead,
        }
    }
}

impl From<ApproverSpec> for ApproverSpecDto {
    fn from(spec: ApproverSpec) -> Self {
        match spec {
            ApproverSpec::User { user_id } => ApproverSpecDto::User {
                user_id: user_id.as_uuid(),
            },
            ApproverSpec::Role { role } => ApproverSpecDto::Role { role },
            ApproverSpec::DepartmentHead => ApproverSpecDto::DepartmentHead,
        }
    }
}

/// Amount and type gate of a step; the amount range is `[min, max)`
#[derive(Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct StepConditionDto {
    pub min_amount_cents: Option<i64>,
    pub max_amount_cents: Option<i64>,
    #[serde(default)]
    pub contract_types: Vec<String>,
}

/// One workflow step
#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct WorkflowStepDto {
    #[schema(example = 1)]
    pub step_order: u32,
    #[schema(example = "Legal review")]
    pub name: String,
    pub approvers: Vec<ApproverSpecDto>,
    /// `all` (default) or `any`
    #[schema(example = "all")]
    pub mode: Option<String>,
    pub condition: Option<StepConditionDto>,
}

impl WorkflowStepDto {
    pub fn into_step(self) -> Result<WorkflowStep, String> {
        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => Default::default(),
        };
        Ok(WorkflowStep {
            step_order: self.step_order,
            name: self.name,
            approvers: self.approvers.into_iter().map(Into::into).collect(),
            mode,
            condition: self.condition.map(|c| StepCondition {
                min_amount_cents: c.min_amount_cents,
                max_amount_cents: c.max_amount_cents,
                contract_types: c.contract_types,
            }),
        })
    }
}

impl From<WorkflowStep> for WorkflowStepDto {
    fn from(step: WorkflowStep) -> Self {
        Self {
            step_order: step.step_order,
            name: step.name,
            approvers: step.approvers.into_iter().map(Into::into).collect(),
            mode: Some(step.mode.as_str().to_string()),
            condition: step.condition.map(|c| StepConditionDto {
                min_amount_cents: c.min_amount_cents,
                max_amount_cents: c.max_amount_cents,
                contract_types: c.contract_types,
            }),
        }
    }
}

/// Create or replace a workflow template
#[derive(Deserialize, ToSchema)]
pub struct WorkflowRequest {
    #[schema(example = "Standard approval")]
    pub name: String,
    pub description: Option<String>,
    /// Contract type this template is dedicated to
    pub contract_type: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    /// Defaults to true
    pub active: Option<bool>,
    pub steps: Vec<WorkflowStepDto>,
}

/// Workflow template representation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct WorkflowResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub contract_type: Option<String>,
    pub is_default: bool,
    pub active: bool,
    pub steps: Vec<WorkflowStepDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Workflow> for WorkflowResponse {
    fn from(workflow: Workflow) -> Self {
        Self {
            id: workflow.id.as_uuid(),
            name: workflow.name,
            description: workflow.description,
            contract_type: workflow.contract_type,
            is_default: workflow.is_default,
            active: workflow.active,
            steps: workflow.steps.into_iter().map(Into::into).collect(),
            created_at: workflow.created_at,
            updated_at: workflow.updated_at,
        }
    }
}

/// Query parameters for workflow listings
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct WorkflowListQuery {
    /// Only active templates
    #[serde(default)]
    pub active_only: bool,
}

/// Hypothetical contract for a routing preview
#[derive(Deserialize, ToSchema)]
pub struct WorkflowPreviewRequest {
    #[schema(example = "services")]
    pub contract_type: String,
    #[schema(example = 5000000)]
    pub amount_cents: i64,
    pub department: Option<String>,
}

/// Stage of a resolved plan
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PlannedStageDto {
    pub step_order: u32,
    pub name: String,
    pub mode: String,
    pub approvers: Vec<Uuid>,
}

impl From<PlannedStage> for PlannedStageDto {
    fn from(stage: PlannedStage) -> Self {
        Self {
            step_order: stage.step_order,
            name: stage.name,
            mode: stage.mode.as_str().to_string(),
            approvers: stage.approvers.into_iter().map(|id| id.as_uuid()).collect(),
        }
    }
}

/// Routing a contract would receive
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApprovalPlanResponse {
    pub workflow_id: Uuid,
    pub workflow_name: String,
    pub stages: Vec<PlannedStageDto>,
}

impl From<ApprovalPlan> for ApprovalPlanResponse {
    fn from(plan: ApprovalPlan) -> Self {
        Self {
            workflow_id: plan.workflow_id.as_uuid(),
            workflow_name: plan.workflow_name,
            stages: plan.stages.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Documents ────────────────────────────────────────────────────────

/// Register a new document version
#[derive(Deserialize, ToSchema)]
pub struct AddDocumentRequest {
    #[schema(example = "msa-signed.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    #[schema(example = 482133)]
    pub size_bytes: u64,
    pub checksum: Option<String>,
    #[schema(example = "s3://contracts/msa-signed.pdf")]
    pub storage_uri: String,
    pub note: Option<String>,
}

/// Document version representation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub version: u32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub checksum: Option<String>,
    pub storage_uri: String,
    pub note: Option<String>,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ContractDocument> for DocumentResponse {
    fn from(document: ContractDocument) -> Self {
        Self {
            id: document.id.as_uuid(),
            contract_id: document.contract_id.as_uuid(),
            version: document.version,
            file_name: document.file_name,
            content_type: document.content_type,
            size_bytes: document.size_bytes,
            checksum: document.checksum,
            storage_uri: document.storage_uri,
            note: document.note,
            uploaded_by: document.uploaded_by.as_uuid(),
            uploaded_at: document.uploaded_at,
        }
    }
}

// ── Comments ─────────────────────────────────────────────────────────

/// Post a comment
#[derive(Deserialize, ToSchema)]
pub struct AddCommentRequest {
    #[schema(example = "Please double-check the indemnity clause.")]
    pub body: String,
    /// Comment being replied to
    pub parent_id: Option<Uuid>,
}

/// Edit a comment
#[derive(Deserialize, ToSchema)]
pub struct EditCommentRequest {
    pub body: String,
}

/// Comment representation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.as_uuid(),
            contract_id: comment.contract_id.as_uuid(),
            author_id: comment.author_id.as_uuid(),
            body: comment.body,
            parent_id: comment.parent_id.map(|id| id.as_uuid()),
            created_at: comment.created_at,
            edited_at: comment.edited_at,
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

/// Query parameters for the notification inbox
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
    /// 1-200, default 50
    pub limit: Option<u32>,
}

/// Notification representation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[schema(example = "approval_requested")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub contract_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.as_uuid(),
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            contract_id: notification.contract_id.map(|id| id.as_uuid()),
            read_at: notification.read_at,
            created_at: notification.created_at,
        }
    }
}

/// Unread notification count
#[derive(Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

/// Result of marking every notification read
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

// ── Reports ──────────────────────────────────────────────────────────

/// Optional `[from, to)` creation window
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Counterparties in the contract summary (default 10)
    pub top: Option<usize>,
}

/// Query parameters for the expiring contracts report
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ExpiringReportQuery {
    /// Horizon in days, at most 365; the configured reminder window when omitted
    pub within_days: Option<u32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Aggregate of one group
#[derive(Serialize, Deserialize, ToSchema)]
pub struct GroupStatDto {
    pub key: String,
    pub count: u64,
    pub total_value_cents: i64,
    pub average_value_cents: i64,
    #[schema(example = 42.86)]
    pub percentage: f64,
}

impl From<GroupStat> for GroupStatDto {
    fn from(stat: GroupStat) -> Self {
        Self {
            key: stat.key,
            count: stat.count,
            total_value_cents: stat.total_value_cents,
            average_value_cents: stat.average_value_cents,
            percentage: stat.percentage,
        }
    }
}

/// Portfolio summary report
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ContractSummaryResponse {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub total_contracts: u64,
    pub by_status: BTreeMap<String, u64>,
    pub total_value_cents: i64,
    pub average_value_cents: i64,
    pub by_department: Vec<GroupStatDto>,
    pub by_type: Vec<GroupStatDto>,
    pub by_counterparty: Vec<GroupStatDto>,
    pub generated_at: DateTime<Utc>,
}

impl From<ContractSummaryReport> for ContractSummaryResponse {
    fn from(report: ContractSummaryReport) -> Self {
        let groups = |stats: Vec<GroupStat>| stats.into_iter().map(GroupStatDto::from).collect();
        Self {
            from: report.window.from,
            to: report.window.to,
            total_contracts: report.total_contracts,
            by_status: report.by_status,
            total_value_cents: report.total_value_cents,
            average_value_cents: report.average_value_cents,
            by_department: groups(report.by_department),
            by_type: groups(report.by_type),
            by_counterparty: groups(report.by_counterparty),
            generated_at: report.generated_at,
        }
    }
}

/// Pending workload of one approver
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApproverLoadDto {
    pub approver_id: Uuid,
    pub approver_name: Option<String>,
    pub pending: u64,
    pub oldest_pending_at: DateTime<Utc>,
}

impl From<ApproverLoad> for ApproverLoadDto {
    fn from(load: ApproverLoad) -> Self {
        Self {
            approver_id: load.approver_id.as_uuid(),
            approver_name: load.approver_name,
            pending: load.pending,
            oldest_pending_at: load.oldest_pending_at,
        }
    }
}

/// Pending approval past the overdue threshold
#[derive(Serialize, Deserialize, ToSchema)]
pub struct OverdueApprovalDto {
    pub approval_id: Uuid,
    pub contract_id: Uuid,
    pub step_name: String,
    pub approver_id: Uuid,
    pub pending_since: DateTime<Utc>,
    pub days_waiting: i64,
}

impl From<OverdueApproval> for OverdueApprovalDto {
    fn from(overdue: OverdueApproval) -> Self {
        Self {
            approval_id: overdue.approval_id.as_uuid(),
            contract_id: overdue.contract_id.as_uuid(),
            step_name: overdue.step_name,
            approver_id: overdue.approver_id.as_uuid(),
            pending_since: overdue.pending_since,
            days_waiting: overdue.days_waiting,
        }
    }
}

/// Approval throughput report
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApprovalReportResponse {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub total_decisions: u64,
    pub approved: u64,
    pub rejected: u64,
    pub approval_rate: f64,
    pub average_decision_hours: f64,
    pub pending_by_approver: Vec<ApproverLoadDto>,
    pub overdue: Vec<OverdueApprovalDto>,
    pub overdue_after_days: u32,
    pub generated_at: DateTime<Utc>,
}

impl From<ApprovalReport> for ApprovalReportResponse {
    fn from(report: ApprovalReport) -> Self {
        Self {
            from: report.window.from,
            to: report.window.to,
            total_decisions: report.total_decisions,
            approved: report.approved,
            rejected: report.rejected,
            approval_rate: report.approval_rate,
            average_decision_hours: report.average_decision_hours,
            pending_by_approver: report
                .pending_by_approver
                .into_iter()
                .map(Into::into)
                .collect(),
            overdue: report.overdue.into_iter().map(Into::into).collect(),
            overdue_after_days: report.overdue_after_days,
            generated_at: report.generated_at,
        }
    }
}

/// Contracts approaching their end date
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ExpiringReportResponse {
    pub as_of: NaiveDate,
    pub within_days: u32,
    pub contracts: Vec<ContractResponse>,
    pub generated_at: DateTime<Utc>,
}

impl From<ExpiringReport> for ExpiringReportResponse {
    fn from(report: ExpiringReport) -> Self {
        Self {
            as_of: report.as_of,
            within_days: report.within_days,
            contracts: report.contracts.into_iter().map(Into::into).collect(),
            generated_at: report.generated_at,
        }
    }
}

// ── System ───────────────────────────────────────────────────────────

/// Error response model
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "INVALID_TRANSITION")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "Invalid contract transition from draft to approved")]
    pub message: String,

    /// Additional error context
    #[schema(example = r#"{"field": "end_date"}"#)]
    pub details: Option<serde_json::Value>,

    /// Unique request identifier for tracking and support
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub request_id: Uuid,

    /// Error occurrence timestamp
    #[schema(example = "2025-01-15T10:30:00Z")]
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service health status
    #[schema(example = "healthy")]
    pub status: String,

    /// Service version
    #[schema(example = "0.3.0")]
    pub version: String,

    /// Active storage backend
    #[schema(example = "postgres")]
    pub storage: String,

    /// Whether the storage backend answered
    pub storage_ok: bool,

    pub timestamp: DateTime<Utc>,
}
