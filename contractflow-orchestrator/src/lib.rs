//! ContractFlow Orchestrator - Approval routing and HTTP API
//!
//! This crate drives contracts through their approval workflow and exposes
//! the whole service over HTTP.
//!
//! # Features
//!
//! - **Approval Workflow** - Centralised submit / withdraw / decide controller
//! - **HTTP API** - RESTful API with OpenAPI/Swagger documentation
//! - **Caller identity** - `X-User-Id` header resolved against the user directory
//!
//! # Architecture
//!
//! ```text
//! contractflow-orchestrator/
//! ├── application/      # Approval workflow controller
//! └── presentation/     # HTTP layer
//!     ├── controllers/  # Request handlers
//!     ├── models.rs     # DTOs with OpenAPI schemas
//!     ├── errors.rs     # Domain error to HTTP mapping
//!     └── routes.rs     # API route definitions
//! ```
//!
//! # API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/v1/contracts` | POST, GET | Create / list contracts |
//! | `/api/v1/contracts/{id}/submit` | POST | Route a draft into approval |
//! | `/api/v1/approvals/{id}/approve` | POST | Approve a step |
//! | `/api/v1/approvals/{id}/reject` | POST | Reject a step |
//! | `/api/v1/workflows` | POST, GET | Manage approval templates |
//! | `/api/v1/reports/contracts` | GET | Portfolio summary |
//! | `/health` | GET | Health check |

pub mod application;
pub mod presentation;

pub use application::{ApprovalWorkflow, DecisionResult};
pub use presentation::{AppState, create_router};
