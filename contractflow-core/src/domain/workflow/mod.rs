//! Workflow domain module
//!
//! Approval templates plus the routing engine that turns a template and a
//! contract into a concrete, ordered list of approvers.

pub mod engine;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use engine::*;
pub use entities::*;
pub use errors::*;
pub use repositories::*;
pub use value_objects::*;
