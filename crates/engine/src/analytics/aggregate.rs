//! Reductions over a user's raw history.
//!
//! Every function takes the full record list (both kinds mixed is fine) and
//! a [`TransactionKind`] selecting what to sum. Nothing is cached; callers
//! recompute on each view.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, Transaction, TransactionKind};

/// A calendar month (`year`, `month` in `1..=12`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn of_datetime(at: DateTime<Utc>) -> Self {
        Self::of(at.date_naive())
    }

    /// The immediately preceding calendar month (January -> previous December).
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Midnight UTC of the first day of the month.
    pub fn start(self) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
    }

    pub fn contains(self, at: DateTime<Utc>) -> bool {
        Self::of_datetime(at) == self
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn of_kind(records: &[Transaction], kind: TransactionKind) -> impl Iterator<Item = &Transaction> {
    records.iter().filter(move |tx| tx.kind == kind)
}

/// Sum of every record of `kind`.
pub fn total(records: &[Transaction], kind: TransactionKind) -> MoneyCents {
    of_kind(records, kind).map(|tx| tx.amount).sum()
}

/// Category -> summed amount. Categories with no records are absent.
pub fn category_totals(
    records: &[Transaction],
    kind: TransactionKind,
) -> BTreeMap<String, MoneyCents> {
    sum_by_category(of_kind(records, kind))
}

/// Same as [`category_totals`], restricted to one calendar month.
pub fn category_totals_in_month(
    records: &[Transaction],
    kind: TransactionKind,
    month: Month,
) -> BTreeMap<String, MoneyCents> {
    sum_by_category(of_kind(records, kind).filter(|tx| month.contains(tx.occurred_at)))
}

fn sum_by_category<'a>(
    records: impl Iterator<Item = &'a Transaction>,
) -> BTreeMap<String, MoneyCents> {
    let mut totals = BTreeMap::new();
    for tx in records {
        *totals.entry(tx.category.clone()).or_insert(MoneyCents::ZERO) += tx.amount;
    }
    totals
}

/// Month -> summed amount, in chronological order.
pub fn monthly_totals(records: &[Transaction], kind: TransactionKind) -> BTreeMap<Month, MoneyCents> {
    let mut totals = BTreeMap::new();
    for tx in of_kind(records, kind) {
        *totals
            .entry(Month::of_datetime(tx.occurred_at))
            .or_insert(MoneyCents::ZERO) += tx.amount;
    }
    totals
}

/// Sum of the records of `kind` that fall in `month`.
pub fn month_total(records: &[Transaction], kind: TransactionKind, month: Month) -> MoneyCents {
    of_kind(records, kind)
        .filter(|tx| month.contains(tx.occurred_at))
        .map(|tx| tx.amount)
        .sum()
}

/// Income and expense sums of a history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: MoneyCents,
    pub expense: MoneyCents,
}

impl Totals {
    pub fn from_records(records: &[Transaction]) -> Self {
        Self {
            income: total(records, TransactionKind::Income),
            expense: total(records, TransactionKind::Expense),
        }
    }

    /// `income - expense`.
    pub fn balance(self) -> MoneyCents {
        self.income - self.expense
    }

    /// `expense > income * numerator / denominator`, computed on cents.
    pub fn expense_exceeds_share(self, numerator: i64, denominator: i64) -> bool {
        i128::from(self.expense.cents()) * i128::from(denominator)
            > i128::from(self.income.cents()) * i128::from(numerator)
    }
}
