//! ContractFlow Core - Foundation crate for the ContractFlow service
//!
//! This crate holds everything below the HTTP layer:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] - Contracts, approval workflows, documents, comments, notifications
//! - [`application`] - Use-case services and reporting
//! - [`infrastructure`] - PostgreSQL and in-memory repository implementations
//! - [`logging`] - Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! contractflow-core/
//! ├── domain/           # Pure business logic
//! │   ├── contract/     # Contract aggregate, status machine, history
//! │   ├── workflow/     # Approval templates and the routing engine
//! │   ├── approval/     # Per-approver records and outcome derivation
//! │   ├── document/     # Versioned document metadata
//! │   ├── comment/      # Threaded comments
//! │   ├── notification/ # In-app notifications
//! │   └── directory/    # Users, roles, reference data
//! ├── application/      # Use cases and reporting
//! ├── infrastructure/   # Repository implementations
//! │   ├── postgres/     # sqlx-backed PostgreSQL access
//! │   └── memory/       # In-process storage for development and tests
//! └── config/           # Configuration management
//! ```
//!
//! # Configuration
//!
//! Environment variables use the `CONTRACTFLOW__` prefix with double underscore separators:
//!
//! ```bash
//! CONTRACTFLOW__SERVER__PORT=3000
//! CONTRACTFLOW__DATABASE__BACKEND=memory
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
