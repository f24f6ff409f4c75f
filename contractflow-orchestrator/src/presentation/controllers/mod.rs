//! ContractFlow API controllers

pub mod approvals;
pub mod comments;
pub mod contracts;
pub mod documents;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod workflows;

use std::sync::Arc;

use contractflow_core::application::Services;
use contractflow_core::config::Config;
use contractflow_core::infrastructure::Repositories;

use crate::application::ApprovalWorkflow;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub services: Services,
    pub workflow: ApprovalWorkflow,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the use-case services and the approval workflow to `repositories`
    pub fn new(repositories: Repositories, config: Config) -> Self {
        let services = Services::new(&repositories, &config);
        let workflow = ApprovalWorkflow::new(
            repositories.contracts.clone(),
            repositories.workflows.clone(),
            repositories.approvals.clone(),
            repositories.users.clone(),
            services.notifications.clone(),
        );

        Self {
            repositories,
            services,
            workflow,
            config: Arc::new(config),
        }
    }
}
