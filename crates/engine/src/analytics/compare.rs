//! Month-over-month deltas and budget utilization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{BudgetTable, MoneyCents, Transaction, TransactionKind, categories};

use super::aggregate::{self, Month, Totals};

/// Ratio at which a category is reported as close to its ceiling.
pub const NEAR_LIMIT_RATIO: f64 = 0.8;
/// Ratio at which a category is reported as over budget.
pub const OVER_BUDGET_RATIO: f64 = 1.0;

/// `(this - last) / last * 100`, or `None` when `last` is zero.
pub fn percent_change(this: MoneyCents, last: MoneyCents) -> Option<f64> {
    if last.is_zero() {
        return None;
    }
    let last = last.cents() as f64;
    Some((this.cents() as f64 - last) / last * 100.0)
}

/// Expense totals of the current and previous calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub this_month: Month,
    pub last_month: Month,
    pub this_total: MoneyCents,
    pub last_total: MoneyCents,
    /// `None` when the previous month has no expenses.
    pub percent_change: Option<f64>,
}

/// Compares the month containing `today` with the one before it.
pub fn month_over_month(records: &[Transaction], today: NaiveDate) -> MonthComparison {
    let this_month = Month::of(today);
    let last_month = this_month.previous();
    let this_total = aggregate::month_total(records, TransactionKind::Expense, this_month);
    let last_total = aggregate::month_total(records, TransactionKind::Expense, last_month);

    MonthComparison {
        this_month,
        last_month,
        this_total,
        last_total,
        percent_change: percent_change(this_total, last_total),
    }
}

/// `spent / ceiling`; `0` when the ceiling is zero or negative.
pub fn utilization(spent: MoneyCents, ceiling: MoneyCents) -> f64 {
    if !ceiling.is_positive() {
        return 0.0;
    }
    spent.cents() as f64 / ceiling.cents() as f64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBand {
    /// `ratio < 0.8`
    Under,
    /// `0.8 <= ratio < 1.0`
    NearLimit,
    /// `ratio >= 1.0`
    Over,
}

impl BudgetBand {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= OVER_BUDGET_RATIO {
            Self::Over
        } else if ratio >= NEAR_LIMIT_RATIO {
            Self::NearLimit
        } else {
            Self::Under
        }
    }
}

/// Utilization of one category against its ceiling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub spent: MoneyCents,
    pub ceiling: MoneyCents,
    pub ratio: f64,
    pub band: BudgetBand,
    /// `ceiling - spent`; negative when over.
    pub difference: MoneyCents,
}

impl CategoryBudget {
    pub fn new(category: impl Into<String>, spent: MoneyCents, ceiling: MoneyCents) -> Self {
        let ratio = utilization(spent, ceiling);
        Self {
            category: category.into(),
            spent,
            ceiling,
            ratio,
            band: BudgetBand::from_ratio(ratio),
            difference: ceiling - spent,
        }
    }

    /// Human readable status, e.g. `Over budget by €0.00`.
    pub fn status(&self) -> String {
        match self.band {
            BudgetBand::Over => format!("Over budget by {}", self.difference.abs()),
            BudgetBand::NearLimit => "Close to budget".to_string(),
            BudgetBand::Under => format!("Under budget by {}", self.difference.abs()),
        }
    }
}

/// Everything the analytics view shows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub month: Option<Month>,
    pub totals: Totals,
    /// `income - expense`.
    pub remaining: MoneyCents,
    /// `remaining / income`, `0` without income.
    pub remaining_ratio: f64,
    pub expense: Vec<CategoryBudget>,
    pub income: Vec<CategoryBudget>,
}

/// Builds the per-category report for every category in the vocabularies.
///
/// With `month` set only records of that calendar month count; otherwise the
/// whole history is used.
pub fn budget_report(
    records: &[Transaction],
    budgets: &BudgetTable,
    month: Option<Month>,
) -> BudgetReport {
    let scoped: Vec<Transaction> = match month {
        Some(month) => records
            .iter()
            .filter(|tx| month.contains(tx.occurred_at))
            .cloned()
            .collect(),
        None => records.to_vec(),
    };

    let totals = Totals::from_records(&scoped);
    let remaining = totals.balance();
    let remaining_ratio = if totals.income.is_positive() {
        remaining.cents() as f64 / totals.income.cents() as f64
    } else {
        0.0
    };

    let rows = |kind: TransactionKind| {
        let spent = aggregate::category_totals(&scoped, kind);
        categories::vocabulary(kind)
            .iter()
            .map(|name| {
                CategoryBudget::new(
                    *name,
                    spent.get(*name).copied().unwrap_or(MoneyCents::ZERO),
                    budgets.ceiling(kind, name),
                )
            })
            .collect::<Vec<_>>()
    };

    BudgetReport {
        month,
        totals,
        remaining,
        remaining_ratio,
        expense: rows(TransactionKind::Expense),
        income: rows(TransactionKind::Income),
    }
}
