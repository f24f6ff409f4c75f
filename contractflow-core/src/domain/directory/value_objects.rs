//! Directory value objects

use serde::{Deserialize, Serialize};
use std::fmt;

define_id!(
    /// User ID value object
    UserId
);

define_id!(
    /// Reference row ID
    ReferenceId
);

/// Role code that marks a user as the head of their department
pub const DEPARTMENT_HEAD_ROLE: &str = "department_head";

/// Kind of a reference (lookup table) row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ReferenceType {
    Counterparty,
    ContractType,
    Department,
    Role,
    Currency,
    Other(String),
}

impl ReferenceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Counterparty => "counterparty",
            Self::ContractType => "contract_type",
            Self::Department => "department",
            Self::Role => "role",
            Self::Currency => "currency",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for ReferenceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "counterparty" => Self::Counterparty,
            "contract_type" => Self::ContractType,
            "department" => Self::Department,
            "role" => Self::Role,
            "currency" => Self::Currency,
            _ => Self::Other(value),
        }
    }
}

impl From<ReferenceType> for String {
    fn from(value: ReferenceType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_type_round_trips_known_and_custom_values() {
        assert_eq!(
            ReferenceType::from("contract_type".to_string()),
            ReferenceType::ContractType
        );
        let custom = ReferenceType::from("region".to_string());
        assert_eq!(custom, ReferenceType::Other("region".to_string()));
        assert_eq!(custom.to_string(), "region");
    }
}
