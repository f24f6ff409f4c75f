//! Orchestrator application layer

pub mod workflow;

pub use workflow::{ApprovalWorkflow, DecisionResult};
