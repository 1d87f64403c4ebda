//! Category vocabularies and monthly budget ceilings.
//!
//! Each [`TransactionKind`] has its own fixed set of category names. Budget
//! ceilings live in a [`BudgetTable`] that callers build once (usually from
//! configuration) and pass to the analytics functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine, TransactionKind};

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "food",
    "snacks",
    "groceries",
    "fuel",
    "transport",
    "taxi",
    "delivery",
    "rent",
    "electricity",
    "water",
    "internet",
    "clothing",
    "care",
    "health",
    "entertainment",
    "subscriptions",
    "travel",
    "gifts",
    "other",
];

pub const INCOME_CATEGORIES: &[&str] = &[
    "salary",
    "freelance",
    "sales",
    "investments",
    "support",
    "bonus",
    "other",
];

/// Category watched by the delivery spending alert.
pub const DELIVERY_CATEGORY: &str = "delivery";

/// Returns the category vocabulary for `kind`.
pub fn vocabulary(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Expense => EXPENSE_CATEGORIES,
        TransactionKind::Income => INCOME_CATEGORIES,
    }
}

/// Normalizes `category` and checks it belongs to the vocabulary of `kind`.
pub fn normalize_category(kind: TransactionKind, category: &str) -> ResultEngine<String> {
    let normalized = category.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(EngineError::InvalidCategory(
            "category must not be empty".to_string(),
        ));
    }
    if !vocabulary(kind).contains(&normalized.as_str()) {
        return Err(EngineError::InvalidCategory(format!(
            "'{normalized}' is not a known {} category",
            kind.as_str()
        )));
    }
    Ok(normalized)
}

/// Monthly ceilings per category, one map per kind.
///
/// Missing categories have no ceiling; utilization against a missing or zero
/// ceiling is reported as `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTable {
    pub expense: BTreeMap<String, MoneyCents>,
    pub income: BTreeMap<String, MoneyCents>,
}

impl BudgetTable {
    /// Ceiling for `category`, zero when the table has no entry.
    pub fn ceiling(&self, kind: TransactionKind, category: &str) -> MoneyCents {
        self.table(kind)
            .get(category)
            .copied()
            .unwrap_or(MoneyCents::ZERO)
    }

    pub fn table(&self, kind: TransactionKind) -> &BTreeMap<String, MoneyCents> {
        match kind {
            TransactionKind::Expense => &self.expense,
            TransactionKind::Income => &self.income,
        }
    }

    /// Replaces or inserts ceilings, keeping the remaining defaults.
    pub fn with_overrides(
        mut self,
        kind: TransactionKind,
        overrides: impl IntoIterator<Item = (String, MoneyCents)>,
    ) -> Self {
        let table = match kind {
            TransactionKind::Expense => &mut self.expense,
            TransactionKind::Income => &mut self.income,
        };
        table.extend(overrides);
        self
    }
}

impl Default for BudgetTable {
    fn default() -> Self {
        let euros = |pairs: &[(&str, i64)]| {
            pairs
                .iter()
                .map(|(name, units)| (name.to_string(), MoneyCents::new(units * 100)))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            expense: euros(&[
                ("food", 400),
                ("snacks", 100),
                ("groceries", 300),
                ("fuel", 200),
                ("transport", 100),
                ("taxi", 100),
                ("rent", 1000),
                ("electricity", 150),
                ("water", 50),
                ("internet", 60),
                ("clothing", 150),
                ("care", 100),
                ("health", 200),
                ("entertainment", 150),
                ("subscriptions", 50),
                ("travel", 300),
                ("gifts", 100),
                ("other", 100),
            ]),
            income: euros(&[
                ("salary", 2000),
                ("freelance", 1000),
                ("sales", 500),
                ("investments", 500),
                ("support", 300),
                ("bonus", 200),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_known_category_case_insensitive() {
        assert_eq!(
            normalize_category(TransactionKind::Expense, "  Food ").unwrap(),
            "food"
        );
        assert_eq!(
            normalize_category(TransactionKind::Income, "Salary").unwrap(),
            "salary"
        );
    }

    #[test]
    fn normalize_rejects_category_of_other_kind() {
        assert!(matches!(
            normalize_category(TransactionKind::Income, "food"),
            Err(EngineError::InvalidCategory(_))
        ));
        assert!(matches!(
            normalize_category(TransactionKind::Expense, ""),
            Err(EngineError::InvalidCategory(_))
        ));
    }

    #[test]
    fn default_table_has_ceilings_and_missing_is_zero() {
        let table = BudgetTable::default();
        assert_eq!(
            table.ceiling(TransactionKind::Expense, "rent"),
            MoneyCents::new(100_000)
        );
        assert_eq!(
            table.ceiling(TransactionKind::Expense, "delivery"),
            MoneyCents::ZERO
        );
    }

    #[test]
    fn overrides_replace_single_entries() {
        let table = BudgetTable::default().with_overrides(
            TransactionKind::Expense,
            [("food".to_string(), MoneyCents::new(50_000))],
        );
        assert_eq!(
            table.ceiling(TransactionKind::Expense, "food"),
            MoneyCents::new(50_000)
        );
        assert_eq!(
            table.ceiling(TransactionKind::Expense, "rent"),
            MoneyCents::new(100_000)
        );
    }
}
