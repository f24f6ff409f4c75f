//! Directory domain module
//!
//! Users, their roles and departments, and typed reference data
//! (counterparties, contract types, departments). The approval engine reads
//! from here to resolve who must approve; nothing here is edited over HTTP.

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use repositories::*;
pub use value_objects::*;
