//! Contract value objects

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

define_id!(
    /// Contract ID value object
    ContractId
);

define_id!(
    /// History entry ID
    HistoryEntryId
);

/// Contract number with validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractNumber(String);

impl ContractNumber {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 40;

    /// Create a contract number with validation
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_string();

        if value.len() < Self::MIN_LENGTH || value.len() > Self::MAX_LENGTH {
            return Err(format!(
                "Contract number must be between {} and {} characters",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH
            ));
        }

        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/');

        if !valid_chars {
            return Err(
                "Contract number can only contain letters, digits, '-', '_' and '/'".to_string(),
            );
        }

        Ok(Self(value))
    }

    /// Generate a number of the form `CT-YYYYMMDD-XXXXXX`
    pub fn generate(date: NaiveDate) -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_ascii_uppercase();
        Self(format!("CT-{}-{}", date.format("%Y%m%d"), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContractNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monetary amount in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_cents: i64,
    pub currency: String,
}

impl Money {
    /// Create a money value; amounts must be non-negative and currencies 3-letter upper-case codes
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Result<Self, String> {
        let currency = currency.into().trim().to_ascii_uppercase();

        if amount_cents < 0 {
            return Err("Amount cannot be negative".to_string());
        }

        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid currency code: {}", currency));
        }

        Ok(Self {
            amount_cents,
            currency,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.amount_cents / 100,
            self.amount_cents % 100,
            self.currency
        )
    }
}

/// Contract status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Being prepared by its creator
    Draft,
    /// Routed through an approval workflow
    PendingApproval,
    /// Every approval stage signed off
    Approved,
    /// A stage rejected the contract
    Rejected,
    /// In force
    Active,
    /// Ran past its end date
    Expired,
    /// Ended early
    Terminated,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 7] = [
        Self::Draft,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::Active,
        Self::Expired,
        Self::Terminated,
    ];

    /// Returns the set of valid target states from the current state.
    ///
    /// ```text
    /// Draft ──► PendingApproval ──► Approved ──► Active ──► Expired
    ///   ▲            │    │            │           │
    ///   ├────────────┘    ▼            └──────┬────┴──► Terminated
    ///   └────────────  Rejected               │
    ///                                         ▼
    ///                                    Terminated
    /// ```
    pub fn valid_transitions(&self) -> &[ContractStatus] {
        match self {
            Self::Draft => &[Self::PendingApproval],
            Self::PendingApproval => &[Self::Approved, Self::Rejected, Self::Draft],
            Self::Rejected => &[Self::Draft],
            Self::Approved => &[Self::Active, Self::Terminated],
            Self::Active => &[Self::Expired, Self::Terminated],
            Self::Expired | Self::Terminated => &[],
        }
    }

    /// Check whether transitioning to `target` is allowed from the current state.
    pub fn can_transition_to(&self, target: &ContractStatus) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Whether this status represents a terminal (final) state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Terminated)
    }

    /// Whether the contract body may still be edited
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown contract status: {}", s))
    }
}

/// What happened to a contract (audit trail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Submitted,
    Withdrawn,
    StepApproved,
    StepRejected,
    Approved,
    Rejected,
    Revised,
    Activated,
    Expired,
    Terminated,
    DocumentAdded,
    CommentAdded,
}

impl HistoryAction {
    pub const ALL: [HistoryAction; 14] = [
        Self::Created,
        Self::Updated,
        Self::Submitted,
        Self::Withdrawn,
        Self::StepApproved,
        Self::StepRejected,
        Self::Approved,
        Self::Rejected,
        Self::Revised,
        Self::Activated,
        Self::Expired,
        Self::Terminated,
        Self::DocumentAdded,
        Self::CommentAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Submitted => "submitted",
            Self::Withdrawn => "withdrawn",
            Self::StepApproved => "step_approved",
            Self::StepRejected => "step_rejected",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Revised => "revised",
            Self::Activated => "activated",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
            Self::DocumentAdded => "document_added",
            Self::CommentAdded => "comment_added",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|action| action.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown history action: {}", s))
    }
}

/// Sort column for contract listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Amount,
    EndDate,
    ContractNumber,
}

impl ContractSort {
    /// Backing column name
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Amount => "amount_cents",
            Self::EndDate => "end_date",
            Self::ContractNumber => "contract_number",
        }
    }
}

impl FromStr for ContractSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "amount" => Ok(Self::Amount),
            "end_date" => Ok(Self::EndDate),
            "contract_number" => Ok(Self::ContractNumber),
            other => Err(format!("Unknown sort column: {}", other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}
