//! Contract domain entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::directory::UserId;
use crate::domain::workflow::WorkflowId;

use super::errors::ContractError;
use super::value_objects::{
    ContractId, ContractNumber, ContractSort, ContractStatus, HistoryAction, HistoryEntryId,
    Money, SortDirection,
};

/// Maximum title length
pub const TITLE_MAX_LENGTH: usize = 200;

/// Contract aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub contract_number: ContractNumber,
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub contract_type: String,
    pub department: Option<String>,
    pub value: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    /// Workflow the contract was last routed through
    pub workflow_id: Option<WorkflowId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable contract terms
#[derive(Debug, Clone, PartialEq)]
pub struct ContractTerms {
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub contract_type: String,
    pub department: Option<String>,
    pub value: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ContractTerms {
    /// Validate and normalize the terms
    pub fn validated(mut self) -> Result<Self, ContractError> {
        self.title = self.title.trim().to_string();
        self.counterparty = self.counterparty.trim().to_string();
        self.contract_type = self.contract_type.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.department = self
            .department
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        if self.title.is_empty() {
            return Err(ContractError::validation("title", "cannot be empty"));
        }
        if self.title.chars().count() > TITLE_MAX_LENGTH {
            return Err(ContractError::validation(
                "title",
                format!("cannot exceed {} characters", TITLE_MAX_LENGTH),
            ));
        }
        if self.counterparty.is_empty() {
            return Err(ContractError::validation("counterparty", "cannot be empty"));
        }
        if self.contract_type.is_empty() {
            return Err(ContractError::validation("contract_type", "cannot be empty"));
        }
        if self.end_date < self.start_date {
            return Err(ContractError::validation(
                "end_date",
                "must not be before start_date",
            ));
        }

        Ok(self)
    }
}

impl Contract {
    /// Create a new draft contract from validated terms
    pub fn new(contract_number: ContractNumber, terms: ContractTerms, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ContractId::generate(),
            contract_number,
            title: terms.title,
            description: terms.description,
            counterparty: terms.counterparty,
            contract_type: terms.contract_type,
            department: terms.department,
            value: terms.value,
            start_date: terms.start_date,
            end_date: terms.end_date,
            status: ContractStatus::Draft,
            workflow_id: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current terms of the contract
    pub fn terms(&self) -> ContractTerms {
        ContractTerms {
            title: self.title.clone(),
            description: self.description.clone(),
            counterparty: self.counterparty.clone(),
            contract_type: self.contract_type.clone(),
            department: self.department.clone(),
            value: self.value.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn is_creator(&self, user_id: &UserId) -> bool {
        self.created_by == *user_id
    }

    /// Replace the terms; only allowed while the contract is editable
    pub fn apply_terms(&mut self, terms: ContractTerms) -> Result<(), ContractError> {
        if !self.status.is_editable() {
            return Err(ContractError::NotEditable {
                status: self.status,
            });
        }

        self.title = terms.title;
        self.description = terms.description;
        self.counterparty = terms.counterparty;
        self.contract_type = terms.contract_type;
        self.department = terms.department;
        self.value = terms.value;
        self.start_date = terms.start_date;
        self.end_date = terms.end_date;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to `target`, returning the audit entry describing the change.
    pub fn transition(
        &mut self,
        target: ContractStatus,
        action: HistoryAction,
        actor_id: Option<UserId>,
        note: Option<String>,
    ) -> Result<ContractHistoryEntry, ContractError> {
        if !self.status.can_transition_to(&target) {
            return Err(ContractError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        let from = self.status;
        self.status = target;
        self.updated_at = Utc::now();

        Ok(ContractHistoryEntry::new(
            self.id,
            action,
            Some(from),
            Some(target),
            actor_id,
            note,
        ))
    }

    /// Audit entry for an event that does not change status
    pub fn record(
        &self,
        action: HistoryAction,
        actor_id: Option<UserId>,
        note: Option<String>,
    ) -> ContractHistoryEntry {
        ContractHistoryEntry::new(self.id, action, None, None, actor_id, note)
    }

    /// Days from `today` until the end date (negative when already past)
    pub fn days_until_end(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }
}

/// Audit trail entry for a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractHistoryEntry {
    pub id: HistoryEntryId,
    pub contract_id: ContractId,
    pub action: HistoryAction,
    pub from_status: Option<ContractStatus>,
    pub to_status: Option<ContractStatus>,
    /// `None` for system actions such as expiry
    pub actor_id: Option<UserId>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContractHistoryEntry {
    pub fn new(
        contract_id: ContractId,
        action: HistoryAction,
        from_status: Option<ContractStatus>,
        to_status: Option<ContractStatus>,
        actor_id: Option<UserId>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: HistoryEntryId::generate(),
            contract_id,
            action,
            from_status,
            to_status,
            actor_id,
            note,
            created_at: Utc::now(),
        }
    }
}

/// Listing filter for contracts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub department: Option<String>,
    pub created_by: Option<UserId>,
    /// Case-insensitive match on title, number or counterparty
    pub search: Option<String>,
    /// Only contracts ending on or before this date
    pub expiring_before: Option<NaiveDate>,
    pub sort: ContractSort,
    pub direction: SortDirection,
    pub offset: u32,
    pub limit: u32,
}

impl ContractFilter {
    /// Whether a contract satisfies every predicate of this filter
    pub fn matches(&self, contract: &Contract) -> bool {
        if self.status.is_some_and(|s| s != contract.status) {
            return false;
        }
        if let Some(counterparty) = &self.counterparty {
            if !contract.counterparty.eq_ignore_ascii_case(counterparty) {
                return false;
            }
        }
        if let Some(contract_type) = &self.contract_type {
            if !contract.contract_type.eq_ignore_ascii_case(contract_type) {
                return false;
            }
        }
        if let Some(department) = &self.department {
            if !contract
                .department
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(department))
            {
                return false;
            }
        }
        if self.created_by.is_some_and(|u| u != contract.created_by) {
            return false;
        }
        if self.expiring_before.is_some_and(|d| contract.end_date > d) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = contract.title.to_lowercase().contains(&needle)
                || contract
                    .contract_number
                    .as_str()
                    .to_lowercase()
                    .contains(&needle)
                || contract.counterparty.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Order two contracts according to the filter's sort settings
    pub fn compare(&self, a: &Contract, b: &Contract) -> std::cmp::Ordering {
        let ordering = match self.sort {
            ContractSort::CreatedAt => a.created_at.cmp(&b.created_at),
            ContractSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            ContractSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            ContractSort::Amount => a.value.amount_cents.cmp(&b.value.amount_cents),
            ContractSort::EndDate => a.end_date.cmp(&b.end_date),
            ContractSort::ContractNumber => a
                .contract_number
                .as_str()
                .cmp(b.contract_number.as_str()),
        }
        .then_with(|| a.id.cmp(&b.id));

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A page of results with the total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> ContractTerms {
        ContractTerms {
            title: "  Master Services Agreement ".to_string(),
            description: Some("   ".to_string()),
            counterparty: "Acme Corp".to_string(),
            contract_type: "services".to_string(),
            department: Some("Legal".to_string()),
            value: Money::new(5_000_000, "USD").unwrap(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        }
    }

    fn contract() -> Contract {
        Contract::new(
            ContractNumber::new("MSA-001").unwrap(),
            terms().validated().unwrap(),
            UserId::generate(),
        )
    }

    #[test]
    fn test_terms_are_normalized() {
        let t = terms().validated().unwrap();
        assert_eq!(t.title, "Master Services Agreement");
        assert_eq!(t.description, None);
    }

    #[test]
    fn test_terms_reject_inverted_dates() {
        let mut t = terms();
        t.end_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let err = t.validated().unwrap_err();
        assert!(matches!(err, ContractError::Validation { field, .. } if field == "end_date"));
    }

    #[test]
    fn test_new_contract_is_draft() {
        let c = contract();
        assert_eq!(c.status, ContractStatus::Draft);
        assert!(c.workflow_id.is_none());
    }

    #[test]
    fn test_transition_records_history() {
        let mut c = contract();
        let actor = c.created_by;
        let entry = c
            .transition(
                ContractStatus::PendingApproval,
                HistoryAction::Submitted,
                Some(actor),
                None,
            )
            .unwrap();
        assert_eq!(c.status, ContractStatus::PendingApproval);
        assert_eq!(entry.from_status, Some(ContractStatus::Draft));
        assert_eq!(entry.to_status, Some(ContractStatus::PendingApproval));
        assert_eq!(entry.action, HistoryAction::Submitted);
    }

    #[test]
    fn test_invalid_transition_leaves_status() {
        let mut c = contract();
        let err = c
            .transition(ContractStatus::Active, HistoryAction::Activated, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::InvalidTransition {
                from: ContractStatus::Draft,
                to: ContractStatus::Active
            }
        );
        assert_eq!(c.status, ContractStatus::Draft);
    }

    #[test]
    fn test_terms_frozen_outside_editable_states() {
        let mut c = contract();
        c.status = ContractStatus::PendingApproval;
        assert!(matches!(
            c.apply_terms(terms().validated().unwrap()),
            Err(ContractError::NotEditable { .. })
        ));
    }

    #[test]
    fn test_filter_matches_and_sorts() {
        let a = contract();
        let mut b = contract();
        b.title = "Another".to_string();
        b.value.amount_cents = 10;
        b.counterparty = "Globex".to_string();

        let filter = ContractFilter {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&a));
        assert!(!filter.matches(&b));

        let by_amount = ContractFilter {
            sort: ContractSort::Amount,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        let mut items = vec![a.clone(), b.clone()];
        items.sort_by(|x, y| by_amount.compare(x, y));
        assert_eq!(items[0].id, b.id);
    }
}
