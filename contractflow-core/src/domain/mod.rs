//! Domain layer - contracts, approval routing and collaboration
//!
//! Nothing in here touches the database or HTTP. Repository traits describe
//! the persistence the application layer needs; implementations live in
//! [`crate::infrastructure`].

/// Declares a UUID-backed identifier newtype with the conversions every
/// repository and controller needs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID
            pub fn new(id: uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use define_id;

pub mod approval;
pub mod comment;
pub mod contract;
pub mod directory;
pub mod document;
pub mod notification;
pub mod workflow;
