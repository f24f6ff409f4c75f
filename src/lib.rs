//! ContractFlow - Main application library
//!
//! This is the main binary crate that wires storage, the HTTP API and the
//! background workers together

mod app;
pub mod workers;

pub use app::{AppHandle, create_app};
pub use contractflow_core::{Config, init_tracing};
pub use contractflow_orchestrator::presentation::AppState;

// Re-export for convenience
pub use contractflow_core;
pub use contractflow_orchestrator;
