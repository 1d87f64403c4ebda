//! Command structs for engine operations.
//!
//! These types group parameters for write operations (add/update), keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, TransactionKind};

/// Record a new expense or income.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    /// If `None`, the engine uses the current time.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount: MoneyCents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount,
            category: category.into(),
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Replace the editable fields of an existing transaction.
///
/// `kind` scopes the lookup: an expense id is not found through the income
/// resource and vice versa.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    /// If `None`, the stored date is kept.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(
        transaction_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id,
            kind,
            amount,
            category: category.into(),
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}
