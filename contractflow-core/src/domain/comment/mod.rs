//! Comment domain module

pub mod entities;
pub mod repositories;

pub use entities::*;
pub use repositories::*;
