//! Orchestrator presentation layer

pub mod controllers;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod routes;

pub use controllers::AppState;
pub use extractors::{Actor, USER_ID_HEADER};
pub use models::*;
pub use routes::{ApiDoc, create_router};
