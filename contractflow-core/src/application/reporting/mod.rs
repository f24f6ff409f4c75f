//! Reporting module for contract portfolio and approval throughput reports
//!
//! Reports are aggregated in memory over the rows of an optional
//! `[from, to)` creation window.

pub mod models;
pub mod service;

pub use models::*;
pub use service::*;
