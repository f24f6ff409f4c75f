//! Tests for the contract expiry sweep on the in-memory backend

use chrono::{Duration, NaiveDate, Utc};

use contractflow::workers::{SweepReport, run_expiry_sweep};
use contractflow_core::Config;
use contractflow_core::application::{CreateContractCommand, Services};
use contractflow_core::domain::contract::{Contract, ContractStatus, HistoryAction};
use contractflow_core::domain::directory::UserId;
use contractflow_core::domain::notification::NotificationKind;
use contractflow_core::infrastructure::Repositories;

struct Fixture {
    repos: Repositories,
    services: Services,
    owner: UserId,
}

impl Fixture {
    fn new() -> Self {
        let repos = Repositories::in_memory();
        let services = Services::new(&repos, &Config::default());
        Self {
            repos,
            services,
            owner: UserId::generate(),
        }
    }

    /// Store an active contract running until `end_date`
    async fn active_contract(&self, title: &str, end_date: NaiveDate) -> Contract {
        let command = CreateContractCommand {
            contract_number: None,
            title: title.to_string(),
            description: None,
            counterparty: "Globex".to_string(),
            contract_type: "supply".to_string(),
            department: None,
            amount_cents: 75_000,
            currency: None,
            start_date: end_date - Duration::days(365),
            end_date,
        };
        let mut contract = self
            .services
            .contracts
            .create(command, self.owner)
            .await
            .unwrap();
        contract.status = ContractStatus::Active;
        self.repos.contracts.update(&contract).await.unwrap();
        contract
    }

    async fn notification_kinds(&self) -> Vec<NotificationKind> {
        self.services
            .notifications
            .list(&self.owner, false, 100)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.kind)
            .collect()
    }
}

#[tokio::test]
async fn test_sweep_expires_ended_contracts() {
    let fixture = Fixture::new();
    let today = Utc::now().date_naive();
    let ended = fixture
        .active_contract("Old supply deal", today - Duration::days(2))
        .await;
    let running = fixture
        .active_contract("Long supply deal", today + Duration::days(200))
        .await;

    let report = run_expiry_sweep(&fixture.repos, &fixture.services, today, 30)
        .await
        .unwrap();
    assert_eq!(
        report,
        SweepReport {
            expired: 1,
            reminders: 0
        }
    );

    let ended = fixture.services.contracts.get(&ended.id).await.unwrap();
    assert_eq!(ended.status, ContractStatus::Expired);
    let running = fixture.services.contracts.get(&running.id).await.unwrap();
    assert_eq!(running.status, ContractStatus::Active);

    let history = fixture.services.contracts.history(&ended.id).await.unwrap();
    assert_eq!(history.last().unwrap().action, HistoryAction::Expired);
    assert!(
        fixture
            .notification_kinds()
            .await
            .contains(&NotificationKind::ContractExpired)
    );
}

#[tokio::test]
async fn test_sweep_sends_each_reminder_once() {
    let fixture = Fixture::new();
    let today = Utc::now().date_naive();
    fixture
        .active_contract("Expiring supply deal", today + Duration::days(10))
        .await;

    let first = run_expiry_sweep(&fixture.repos, &fixture.services, today, 30)
        .await
        .unwrap();
    assert_eq!(first.reminders, 1);
    assert_eq!(first.expired, 0);

    let second = run_expiry_sweep(&fixture.repos, &fixture.services, today, 30)
        .await
        .unwrap();
    assert_eq!(second.reminders, 0);

    assert_eq!(
        fixture.notification_kinds().await,
        vec![NotificationKind::ContractExpiring]
    );
}

#[tokio::test]
async fn test_sweep_on_empty_store_is_a_no_op() {
    let fixture = Fixture::new();

    let report = run_expiry_sweep(&fixture.repos, &fixture.services, Utc::now().date_naive(), 30)
        .await
        .unwrap();

    assert_eq!(report, SweepReport::default());
}
