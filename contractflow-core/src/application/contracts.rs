//! Contract use cases
//!
//! Creation, editing, listing and the lifecycle transitions that do not
//! involve the approval engine (revise, activate, terminate, expire).

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use crate::config::ContractsConfig;
use crate::domain::contract::{
    Contract, ContractError, ContractFilter, ContractHistoryEntry, ContractId, ContractNumber,
    ContractStatus, ContractTerms, HistoryAction, IContractRepository, Money, Page,
};
use crate::domain::directory::{IReferenceRepository, ReferenceType, UserId};
use crate::domain::notification::NotificationKind;

use super::notifications::NotificationService;

/// Input for creating a contract
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContractCommand {
    /// Generated when absent
    pub contract_number: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub contract_type: String,
    pub department: Option<String>,
    pub amount_cents: i64,
    /// Configured default when absent
    pub currency: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractPatch {
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

/// Load a contract or fail with `NotFound`
pub async fn load_contract(
    contracts: &dyn IContractRepository,
    id: &ContractId,
) -> Result<Contract, ContractError> {
    contracts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ContractError::NotFound { id: id.to_string() })
}

/// Move a contract to `target`, persist it and append the audit entry
pub async fn record_transition(
    contracts: &dyn IContractRepository,
    contract: &mut Contract,
    target: ContractStatus,
    action: HistoryAction,
    actor_id: Option<UserId>,
    note: Option<String>,
) -> Result<ContractHistoryEntry, ContractError> {
    let entry = contract.transition(target, action, actor_id, note)?;
    contracts.update(contract).await?;
    contracts.append_history(&entry).await?;

    info!(
        contract_id = %contract.id,
        from = ?entry.from_status,
        to = %target,
        action = %action,
        "Contract status changed"
    );
    Ok(entry)
}

fn ensure_creator(contract: &Contract, actor: &UserId, action: &str) -> Result<(), ContractError> {
    if contract.is_creator(actor) {
        Ok(())
    } else {
        Err(ContractError::permission_denied(format!(
            "only the contract creator can {}",
            action
        )))
    }
}

/// Contract use cases
#[derive(Clone)]
pub struct ContractService {
    contracts: Arc<dyn IContractRepository>,
    references: Arc<dyn IReferenceRepository>,
    notifications: NotificationService,
    config: ContractsConfig,
}

impl ContractService {
    pub fn new(
        contracts: Arc<dyn IContractRepository>,
        references: Arc<dyn IReferenceRepository>,
        notifications: NotificationService,
        config: ContractsConfig,
    ) -> Self {
        Self {
            contracts,
            references,
            notifications,
            config,
        }
    }

    async fn validate_contract_type(&self, contract_type: &str) -> Result<(), ContractError> {
        if !self.config.validate_references {
            return Ok(());
        }

        let known = self
            .references
            .find_by_type(&ReferenceType::ContractType)
            .await?;
        if known.is_empty() || known.iter().any(|r| r.code.eq_ignore_ascii_case(contract_type)) {
            return Ok(());
        }

        Err(ContractError::validation(
            "contract_type",
            format!("unknown contract type '{}'", contract_type),
        ))
    }

    fn money(&self, amount_cents: i64, currency: Option<String>) -> Result<Money, ContractError> {
        let currency = currency.unwrap_or_else(|| self.config.default_currency.clone());
        Money::new(amount_cents, currency).map_err(|reason| ContractError::validation("value", reason))
    }

    /// Create a draft contract
    #[instrument(skip(self, command), fields(actor = %actor, title = %command.title))]
    pub async fn create(
        &self,
        command: CreateContractCommand,
        actor: UserId,
    ) -> Result<Contract, ContractError> {
        let terms = ContractTerms {
            title: command.title,
            description: command.description,
            counterparty: command.counterparty,
            contract_type: command.contract_type,
            department: command.department,
            value: self.money(command.amount_cents, command.currency)?,
            start_date: command.start_date,
            end_date: command.end_date,
        }
        .validated()?;

        self.validate_contract_type(&terms.contract_type).await?;

        let number = match command.contract_number {
            Some(number) => ContractNumber::new(number)
                .map_err(|reason| ContractError::validation("contract_number", reason))?,
            None => ContractNumber::generate(Utc::now().date_naive()),
        };
        if self
            .contracts
            .find_by_number(number.as_str())
            .await?
            .is_some()
        {
            return Err(ContractError::DuplicateNumber {
                number: number.into_string(),
            });
        }

        let contract = Contract::new(number, terms, actor);
        self.contracts.create(&contract).await?;
        self.contracts
            .append_history(&contract.record(HistoryAction::Created, Some(actor), None))
            .await?;

        info!(
            contract_id = %contract.id,
            contract_number = %contract.contract_number,
            "Contract created"
        );
        Ok(contract)
    }

    pub async fn get(&self, id: &ContractId) -> Result<Contract, ContractError> {
        load_contract(self.contracts.as_ref(), id).await
    }

    /// List contracts; the page size is clamped to the configured maximum
    pub async fn list(&self, mut filter: ContractFilter) -> Result<Page<Contract>, ContractError> {
        filter.limit = match filter.limit {
            0 => self.config.default_page_size,
            limit => limit.min(self.config.max_page_size),
        };

        let (items, total) = self.contracts.list(&filter).await?;
        Ok(Page {
            items,
            total,
            offset: filter.offset,
            limit: filter.limit,
        })
    }

    /// Edit the terms of a draft or rejected contract
    #[instrument(skip(self, patch), fields(contract_id = %id, actor = %actor))]
    pub async fn update(
        &self,
        id: &ContractId,
        patch: ContractPatch,
        actor: UserId,
    ) -> Result<Contract, ContractError> {
        let mut contract = self.get(id).await?;
        ensure_creator(&contract, &actor, "edit it")?;
        if !contract.status.is_editable() {
            return Err(ContractError::NotEditable {
                status: contract.status,
            });
        }

        let current = contract.terms();
        let value = match (patch.amount_cents, patch.currency) {
            (None, None) => current.value,
            (amount, currency) => self.money(
                amount.unwrap_or(current.value.amount_cents),
                Some(currency.unwrap_or(current.value.currency)),
            )?,
        };
        let terms = ContractTerms {
            title: patch.title.unwrap_or(current.title),
            description: patch.description.or(current.description),
            counterparty: patch.counterparty.unwrap_or(current.counterparty),
            contract_type: patch.contract_type.unwrap_or(current.contract_type),
            department: patch.department.or(current.department),
            value,
            start_date: patch.start_date.unwrap_or(current.start_date),
            end_date: patch.end_date.unwrap_or(current.end_date),
        }
        .validated()?;

        self.validate_contract_type(&terms.contract_type).await?;

        contract.apply_terms(terms)?;
        self.contracts.update(&contract).await?;
        self.contracts
            .append_history(&contract.record(HistoryAction::Updated, Some(actor), None))
            .await?;

        Ok(contract)
    }

    /// Delete a draft contract
    #[instrument(skip(self), fields(contract_id = %id, actor = %actor))]
    pub async fn delete(&self, id: &ContractId, actor: UserId) -> Result<(), ContractError> {
        let contract = self.get(id).await?;
        ensure_creator(&contract, &actor, "delete it")?;
        if contract.status != ContractStatus::Draft {
            return Err(ContractError::NotEditable {
                status: contract.status,
            });
        }

        self.contracts.delete(id).await?;
        info!(contract_id = %id, "Contract deleted");
        Ok(())
    }

    /// Return a rejected contract to draft for rework
    #[instrument(skip(self), fields(contract_id = %id, actor = %actor))]
    pub async fn revise(&self, id: &ContractId, actor: UserId) -> Result<Contract, ContractError> {
        let mut contract = self.get(id).await?;
        ensure_creator(&contract, &actor, "revise it")?;
        record_transition(
            self.contracts.as_ref(),
            &mut contract,
            ContractStatus::Draft,
            HistoryAction::Revised,
            Some(actor),
            None,
        )
        .await?;
        Ok(contract)
    }

    /// Put an approved contract into force
    #[instrument(skip(self), fields(contract_id = %id, actor = %actor))]
    pub async fn activate(&self, id: &ContractId, actor: UserId) -> Result<Contract, ContractError> {
        let mut contract = self.get(id).await?;
        if contract.status == ContractStatus::Approved
            && contract.end_date < Utc::now().date_naive()
        {
            return Err(ContractError::validation(
                "end_date",
                "contract has already ended and cannot be activated",
            ));
        }

        record_transition(
            self.contracts.as_ref(),
            &mut contract,
            ContractStatus::Active,
            HistoryAction::Activated,
            Some(actor),
            None,
        )
        .await?;
        Ok(contract)
    }

    /// End an approved or active contract early
    #[instrument(skip(self, reason), fields(contract_id = %id, actor = %actor))]
    pub async fn terminate(
        &self,
        id: &ContractId,
        actor: UserId,
        reason: &str,
    ) -> Result<Contract, ContractError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ContractError::validation(
                "reason",
                "a termination reason is required",
            ));
        }

        let mut contract = self.get(id).await?;
        record_transition(
            self.contracts.as_ref(),
            &mut contract,
            ContractStatus::Terminated,
            HistoryAction::Terminated,
            Some(actor),
            Some(reason.to_string()),
        )
        .await?;
        Ok(contract)
    }

    /// Expire every active contract whose end date is before `today`
    #[instrument(skip(self))]
    pub async fn expire_due(&self, today: NaiveDate) -> Result<u64, ContractError> {
        let due = self.contracts.find_active_ended_before(today).await?;

        let mut expired = 0;
        for mut contract in due {
            let note = format!("End date {} passed", contract.end_date);
            record_transition(
                self.contracts.as_ref(),
                &mut contract,
                ContractStatus::Expired,
                HistoryAction::Expired,
                None,
                Some(note),
            )
            .await?;

            self.notifications
                .notify_or_warn(
                    contract.created_by,
                    NotificationKind::ContractExpired,
                    &contract,
                    format!("Contract {} expired", contract.contract_number),
                    format!(
                        "'{}' with {} ended on {}.",
                        contract.title, contract.counterparty, contract.end_date
                    ),
                )
                .await;
            expired += 1;
        }

        if expired > 0 {
            info!(expired, "Expired contracts past their end date");
        }
        Ok(expired)
    }

    /// Audit trail, oldest first
    pub async fn history(&self, id: &ContractId) -> Result<Vec<ContractHistoryEntry>, ContractError> {
        self.get(id).await?;
        self.contracts.list_history(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::Reference;
    use crate::domain::notification::INotificationRepository;
    use crate::infrastructure::Repositories;

    struct Fixture {
        repos: Repositories,
        service: ContractService,
    }

    fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let service = ContractService::new(
            repos.contracts.clone(),
            repos.references.clone(),
            NotificationService::new(repos.notifications.clone()),
            ContractsConfig::default(),
        );
        Fixture { repos, service }
    }

    fn command() -> CreateContractCommand {
        CreateContractCommand {
            contract_number: None,
            title: "Supply Agreement".to_string(),
            description: None,
            counterparty: "Acme".to_string(),
            contract_type: "supply".to_string(),
            department: Some("Ops".to_string()),
            amount_cents: 250_000,
            currency: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_generates_number_and_history() {
        let f = fixture();
        let actor = UserId::generate();
        let contract = f.service.create(command(), actor).await.unwrap();

        assert!(contract.contract_number.as_str().starts_with("CT-"));
        assert_eq!(contract.value.currency, "USD");
        let history = f.service.history(&contract.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Created);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let f = fixture();
        let actor = UserId::generate();
        let mut cmd = command();
        cmd.contract_number = Some("MSA-7".to_string());
        f.service.create(cmd.clone(), actor).await.unwrap();

        let err = f.service.create(cmd, actor).await.unwrap_err();
        assert_eq!(
            err,
            ContractError::DuplicateNumber {
                number: "MSA-7".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_contract_type_checked_against_references() {
        let f = fixture();
        f.repos
            .references
            .create(&Reference::new(ReferenceType::ContractType, "nda", "NDA"))
            .await
            .unwrap();

        let err = f
            .service
            .create(command(), UserId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Validation { field, .. } if field == "contract_type"));

        let mut cmd = command();
        cmd.contract_type = "NDA".to_string();
        assert!(f.service.create(cmd, UserId::generate()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_restricted_to_creator_and_editable_states() {
        let f = fixture();
        let owner = UserId::generate();
        let contract = f.service.create(command(), owner).await.unwrap();

        let patch = ContractPatch {
            title: Some("Renamed".to_string()),
            amount_cents: Some(10),
            ..Default::default()
        };
        let err = f
            .service
            .update(&contract.id, patch.clone(), UserId::generate())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());

        let updated = f.service.update(&contract.id, patch.clone(), owner).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.value.amount_cents, 10);
        assert_eq!(updated.value.currency, "USD");

        let mut locked = updated.clone();
        locked.status = ContractStatus::Active;
        f.repos.contracts.update(&locked).await.unwrap();
        assert!(matches!(
            f.service.update(&contract.id, patch, owner).await,
            Err(ContractError::NotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_clamps_page_size() {
        let f = fixture();
        let actor = UserId::generate();
        for _ in 0..3 {
            f.service.create(command(), actor).await.unwrap();
        }

        let page = f
            .service
            .list(ContractFilter {
                limit: 10_000,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.limit, ContractsConfig::default().max_page_size);
        assert_eq!(page.total, 3);

        let page = f
            .service
            .list(ContractFilter {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_activate_terminate_and_expire() {
        let f = fixture();
        let owner = UserId::generate();
        let mut contract = f.service.create(command(), owner).await.unwrap();
        contract.status = ContractStatus::Approved;
        f.repos.contracts.update(&contract).await.unwrap();

        let active = f.service.activate(&contract.id, owner).await.unwrap();
        assert_eq!(active.status, ContractStatus::Active);

        assert!(matches!(
            f.service.terminate(&contract.id, owner, "  ").await,
            Err(ContractError::Validation { .. })
        ));

        let far_future = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
        assert_eq!(f.service.expire_due(far_future).await.unwrap(), 1);
        let expired = f.service.get(&contract.id).await.unwrap();
        assert_eq!(expired.status, ContractStatus::Expired);

        assert!(matches!(
            f.service.terminate(&contract.id, owner, "breach").await,
            Err(ContractError::InvalidTransition { .. })
        ));

        let actions = f
            .service
            .history(&contract.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect::<Vec<_>>();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Created,
                HistoryAction::Activated,
                HistoryAction::Expired
            ]
        );
        assert_eq!(f.repos.notifications.count_unread(&owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expiry_history_names_end_date() {
        let f = fixture();
        let owner = UserId::generate();
        let mut contract = f.service.create(command(), owner).await.unwrap();
        contract.status = ContractStatus::Active;
        f.repos.contracts.update(&contract).await.unwrap();

        let far_future = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
        assert_eq!(f.service.expire_due(far_future).await.unwrap(), 1);
        assert_eq!(f.service.expire_due(far_future).await.unwrap(), 0);

        let history = f.service.history(&contract.id).await.unwrap();
        let expired = history.last().unwrap();
        assert_eq!(expired.action, HistoryAction::Expired);
        assert_eq!(expired.note.as_deref(), Some("End date 2099-01-01 passed"));
    }

    #[tokio::test]
    async fn test_activation_refused_after_end_date() {
        let f = fixture();
        let owner = UserId::generate();
        let mut cmd = command();
        cmd.end_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        cmd.start_date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let mut contract = f.service.create(cmd, owner).await.unwrap();
        contract.status = ContractStatus::Approved;
        f.repos.contracts.update(&contract).await.unwrap();

        assert!(matches!(
            f.service.activate(&contract.id, owner).await,
            Err(ContractError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_only_drafts() {
        let f = fixture();
        let owner = UserId::generate();
        let contract = f.service.create(command(), owner).await.unwrap();
        assert!(f.service.delete(&contract.id, UserId::generate()).await.is_err());
        f.service.delete(&contract.id, owner).await.unwrap();
        assert!(f.service.get(&contract.id).await.unwrap_err().is_not_found());
    }
}
