//! Approval domain module
//!
//! Per-approver decision records and the pure derivation of a contract's
//! aggregate approval outcome from them.

pub mod entities;
pub mod outcome;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use outcome::*;
pub use repositories::*;
pub use value_objects::*;
