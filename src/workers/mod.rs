//! Background workers for the ContractFlow service
//!
//! The expiry worker moves active contracts past their end date to `expired`
//! and reminds owners about contracts that end soon.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use contractflow_core::application::Services;
use contractflow_core::config::LifecycleConfig;
use contractflow_core::domain::contract::ContractError;
use contractflow_core::infrastructure::Repositories;

/// Result of one expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: u64,
    pub reminders: u64,
}

/// Expire contracts that ended before `today` and send expiry reminders
pub async fn run_expiry_sweep(
    repositories: &Repositories,
    services: &Services,
    today: NaiveDate,
    expiring_within_days: u32,
) -> Result<SweepReport, ContractError> {
    let expired = services.contracts.expire_due(today).await?;
    let reminders = services
        .notifications
        .notify_expiring(repositories.contracts.as_ref(), today, expiring_within_days)
        .await?;

    Ok(SweepReport { expired, reminders })
}

/// Spawn the periodic contract expiry worker
pub fn spawn_expiry_worker(
    repositories: Repositories,
    services: Services,
    config: &LifecycleConfig,
    shutdown_token: CancellationToken,
) -> JoinHandle<()> {
    let interval_minutes = config.check_interval_minutes;
    let within_days = config.expiring_within_days;
    let run_on_startup = config.run_on_startup;

    tokio::spawn(async move {
        info!(
            interval_minutes = interval_minutes,
            expiring_within_days = within_days,
            "Contract expiry worker started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        // The first tick completes immediately
        if !run_on_startup {
            interval.tick().await;
        }

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let today = Utc::now().date_naive();
                    match run_expiry_sweep(&repositories, &services, today, within_days).await {
                        Ok(report) => {
                            info!(
                                expired = report.expired,
                                reminders = report.reminders,
                                "Contract expiry sweep completed"
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "Contract expiry sweep failed");
                        }
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("Contract expiry worker shutting down");
                    break;
                }
            }
        }
    })
}
