use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every 4xx/5xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Accounts, categories and tags: rows identified by a unique name.
pub mod named {
    use super::*;

    /// Request body for creating or renaming a named row.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NameBody {
        /// A missing name is treated like a blank one.
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NamedView {
        pub id: Uuid,
        pub name: String,
    }

    /// `GET /accounts/search?name=`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NameSearch {
        pub name: Option<String>,
    }
}

/// Query parameters shared by every `/daterange` route.
///
/// Bounds are RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
/// Both bounds are inclusive.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// Sum of the amounts booked against an account or a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct TotalView {
    pub id: Uuid,
    /// Decimal string with two fractional digits, e.g. `"3000.00"`.
    pub total: String,
}

pub mod expense {
    use super::*;

    /// Request body for `POST /expenses` and `PUT /expenses/{id}`.
    ///
    /// Ids are optional only so that a missing one is reported as a 400 with
    /// a message instead of a deserialization failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseBody {
        pub category_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        /// Decimal string, at most two fractional digits, must be > 0.
        pub amount: Option<String>,
        /// RFC3339 timestamp. Defaults to now on create.
        pub timestamp: Option<DateTime<FixedOffset>>,
        pub comment: Option<String>,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub account_id: Uuid,
        pub amount: String,
        pub timestamp: DateTime<Utc>,
        pub comment: Option<String>,
        pub tag_ids: Vec<Uuid>,
    }
}

pub mod income {
    use super::*;

    /// Request body for `POST /incomes` and `PUT /incomes/{id}`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeBody {
        pub category_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        /// Decimal string, at most two fractional digits, must be > 0.
        pub amount: Option<String>,
        /// RFC3339 timestamp. Defaults to now on create.
        pub timestamp: Option<DateTime<FixedOffset>>,
        pub comment: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub account_id: Uuid,
        pub amount: String,
        pub timestamp: DateTime<Utc>,
        pub comment: Option<String>,
    }
}

pub mod transfer {
    use super::*;

    /// Request body for `POST /transfers` and `PUT /transfers/{id}`.
    ///
    /// The two accounts must differ.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransferBody {
        pub outgoing_account_id: Option<Uuid>,
        pub incoming_account_id: Option<Uuid>,
        pub amount: Option<String>,
        pub timestamp: Option<DateTime<FixedOffset>>,
        pub comment: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub outgoing_account_id: Uuid,
        pub incoming_account_id: Uuid,
        pub amount: String,
        pub timestamp: DateTime<Utc>,
        pub comment: Option<String>,
    }
}
