//! Report generation over contracts and approvals

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, instrument};

use crate::config::ApprovalsConfig;
use crate::domain::approval::{Approval, ApprovalStatus, IApprovalRepository};
use crate::domain::contract::{Contract, ContractError, IContractRepository};
use crate::domain::directory::{IUserRepository, UserId};

use super::models::{
    ApprovalReport, ApproverLoad, ContractSummaryReport, ExpiringReport, GroupStat,
    OverdueApproval, ReportWindow,
};

/// Counterparties listed in a summary when the caller does not say
pub const DEFAULT_TOP_COUNTERPARTIES: usize = 10;

/// Round to two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, zero for an empty whole
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn average(total: i64, count: u64) -> i64 {
    match i64::try_from(count) {
        Ok(count) if count > 0 => total / count,
        _ => 0,
    }
}

/// Group contracts by `key`, sorted by count (desc) then key
fn group_by<F>(contracts: &[Contract], key: F) -> Vec<GroupStat>
where
    F: Fn(&Contract) -> String,
{
    let mut groups: HashMap<String, (u64, i64)> = HashMap::new();
    for contract in contracts {
        let entry = groups.entry(key(contract)).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(contract.value.amount_cents);
    }

    let total = contracts.len() as u64;
    let mut stats = groups
        .into_iter()
        .map(|(key, (count, value))| GroupStat {
            key,
            count,
            total_value_cents: value,
            average_value_cents: average(value, count),
            percentage: percentage(count, total),
        })
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    stats
}

/// Build the portfolio summary from already-windowed contracts
pub fn summarize_contracts(
    contracts: &[Contract],
    window: ReportWindow,
    top_counterparties: usize,
) -> ContractSummaryReport {
    let total_contracts = contracts.len() as u64;

    let mut by_status = BTreeMap::new();
    for contract in contracts {
        *by_status
            .entry(contract.status.as_str().to_string())
            .or_insert(0u64) += 1;
    }

    let total_value_cents = contracts
        .iter()
        .fold(0i64, |acc, c| acc.saturating_add(c.value.amount_cents));

    let mut by_counterparty = group_by(contracts, |c| c.counterparty.clone());
    by_counterparty.truncate(top_counterparties);

    ContractSummaryReport {
        window,
        total_contracts,
        by_status,
        total_value_cents,
        average_value_cents: average(total_value_cents, total_contracts),
        by_department: group_by(contracts, |c| {
            c.department
                .clone()
                .unwrap_or_else(|| "unassigned".to_string())
        }),
        by_type: group_by(contracts, |c| c.contract_type.clone()),
        by_counterparty,
        generated_at: Utc::now(),
    }
}

/// Build the approval report from already-windowed approvals
pub fn summarize_approvals(
    approvals: &[Approval],
    names: &HashMap<UserId, String>,
    window: ReportWindow,
    overdue_after_days: u32,
    now: DateTime<Utc>,
) -> ApprovalReport {
    let approved = approvals
        .iter()
        .filter(|a| a.status == ApprovalStatus::Approved)
        .count() as u64;
    let rejected = approvals
        .iter()
        .filter(|a| a.status == ApprovalStatus::Rejected)
        .count() as u64;
    let total_decisions = approved + rejected;

    let decision_hours = approvals
        .iter()
        .filter(|a| a.status.is_decided())
        .filter_map(Approval::decision_hours)
        .collect::<Vec<_>>();
    let average_decision_hours = if decision_hours.is_empty() {
        0.0
    } else {
        round2(decision_hours.iter().sum::<f64>() / decision_hours.len() as f64)
    };

    let pending = approvals
        .iter()
        .filter(|a| a.status == ApprovalStatus::Pending)
        .collect::<Vec<_>>();

    let mut loads: HashMap<UserId, ApproverLoad> = HashMap::new();
    for approval in &pending {
        loads
            .entry(approval.approver_id)
            .and_modify(|load| {
                load.pending += 1;
                load.oldest_pending_at = load.oldest_pending_at.min(approval.pending_since());
            })
            .or_insert_with(|| ApproverLoad {
                approver_id: approval.approver_id,
                approver_name: names.get(&approval.approver_id).cloned(),
                pending: 1,
                oldest_pending_at: approval.pending_since(),
            });
    }
    let mut pending_by_approver = loads.into_values().collect::<Vec<_>>();
    pending_by_approver.sort_by(|a, b| {
        b.pending
            .cmp(&a.pending)
            .then(a.oldest_pending_at.cmp(&b.oldest_pending_at))
            .then(a.approver_id.cmp(&b.approver_id))
    });

    let threshold = now - Duration::days(i64::from(overdue_after_days));
    let mut overdue = pending
        .iter()
        .filter(|a| a.pending_since() < threshold)
        .map(|a| OverdueApproval {
            approval_id: a.id,
            contract_id: a.contract_id,
            step_name: a.step_name.clone(),
            approver_id: a.approver_id,
            pending_since: a.pending_since(),
            days_waiting: (now - a.pending_since()).num_days(),
        })
        .collect::<Vec<_>>();
    overdue.sort_by(|a, b| {
        a.pending_since
            .cmp(&b.pending_since)
            .then(a.approval_id.cmp(&b.approval_id))
    });

    ApprovalReport {
        window,
        total_decisions,
        approved,
        rejected,
        approval_rate: percentage(approved, total_decisions),
        average_decision_hours,
        pending_by_approver,
        overdue,
        overdue_after_days,
        generated_at: now,
    }
}

/// Report generation backed by the repositories
#[derive(Clone)]
pub struct ReportService {
    contracts: Arc<dyn IContractRepository>,
    approvals: Arc<dyn IApprovalRepository>,
    users: Arc<dyn IUserRepository>,
    config: ApprovalsConfig,
}

impl ReportService {
    pub fn new(
        contracts: Arc<dyn IContractRepository>,
        approvals: Arc<dyn IApprovalRepository>,
        users: Arc<dyn IUserRepository>,
        config: ApprovalsConfig,
    ) -> Self {
        Self {
            contracts,
            approvals,
            users,
            config,
        }
    }

    #[instrument(skip(self))]
    pub async fn contract_summary(
        &self,
        window: ReportWindow,
        top_counterparties: Option<usize>,
    ) -> Result<ContractSummaryReport, ContractError> {
        let contracts = self
            .contracts
            .list_created_between(window.from, window.to)
            .await?;
        let report = summarize_contracts(
            &contracts,
            window,
            top_counterparties.unwrap_or(DEFAULT_TOP_COUNTERPARTIES),
        );

        info!(
            total_contracts = report.total_contracts,
            "Generated contract summary report"
        );
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn approval_report(&self, window: ReportWindow) -> Result<ApprovalReport, ContractError> {
        let approvals = self
            .approvals
            .list_created_between(window.from, window.to)
            .await?;
        let names = self
            .users
            .list_active()
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect::<HashMap<_, _>>();

        let report = summarize_approvals(
            &approvals,
            &names,
            window,
            self.config.overdue_after_days,
            Utc::now(),
        );

        info!(
            decisions = report.total_decisions,
            overdue = report.overdue.len(),
            "Generated approval report"
        );
        Ok(report)
    }

    /// Active contracts ending in `[today, today + within_days]`, soonest first
    #[instrument(skip(self))]
    pub async fn expiring(
        &self,
        today: NaiveDate,
        within_days: u32,
        window: ReportWindow,
    ) -> Result<ExpiringReport, ContractError> {
        let horizon = today
            .checked_add_signed(Duration::days(i64::from(within_days)))
            .ok_or_else(|| ContractError::validation("within_days", "window ends past the calendar"))?;
        let contracts = self
            .contracts
            .find_active_ending_between(today, horizon)
            .await?
            .into_iter()
            .filter(|c| window.from.is_none_or(|from| c.created_at >= from))
            .filter(|c| window.to.is_none_or(|to| c.created_at < to))
            .collect();

        Ok(ExpiringReport {
            as_of: today,
            within_days,
            contracts,
            generated_at: Utc::now(),
        })
    }
}
