//! Application layer - use cases over the domain repositories

pub mod comments;
pub mod contracts;
pub mod documents;
pub mod notifications;
pub mod reporting;
pub mod workflows;

pub use comments::CommentService;
pub use contracts::{
    ContractPatch, ContractService, CreateContractCommand, load_contract, record_transition,
};
pub use documents::DocumentService;
pub use notifications::NotificationService;
pub use reporting::ReportService;
pub use workflows::{PreviewRequest, WorkflowDefinition, WorkflowTemplateService};

use crate::config::Config;
use crate::infrastructure::Repositories;

/// Every use-case service, wired to one set of repositories
#[derive(Clone)]
pub struct Services {
    pub contracts: ContractService,
    pub workflows: WorkflowTemplateService,
    pub documents: DocumentService,
    pub comments: CommentService,
    pub notifications: NotificationService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(repos: &Repositories, config: &Config) -> Self {
        let notifications = NotificationService::new(repos.notifications.clone());
        Self {
            contracts: ContractService::new(
                repos.contracts.clone(),
                repos.references.clone(),
                notifications.clone(),
                config.contracts.clone(),
            ),
            workflows: WorkflowTemplateService::new(
                repos.workflows.clone(),
                repos.contracts.clone(),
                repos.users.clone(),
            ),
            documents: DocumentService::new(
                repos.documents.clone(),
                repos.contracts.clone(),
                config.documents.clone(),
            ),
            comments: CommentService::new(
                repos.comments.clone(),
                repos.contracts.clone(),
                notifications.clone(),
            ),
            reports: ReportService::new(
                repos.contracts.clone(),
                repos.approvals.clone(),
                repos.users.clone(),
                config.approvals.clone(),
            ),
            notifications,
        }
    }
}
