//! Pure analytics over a user's transaction history.
//!
//! - [`aggregate`]: category, monthly and overall totals.
//! - [`compare`]: month-over-month change and budget utilization.
//! - [`advice`]: ordered budgeting tips.
//! - [`alerts`]: spending thresholds and the edge-triggered dispatcher.

pub mod advice;
pub mod aggregate;
pub mod alerts;
pub mod compare;

pub use advice::{ADVICE_PRIORITY, AdviceRule, Tip, generate_advice};
pub use aggregate::{Month, Totals};
pub use alerts::{Alert, AlertDispatcher, AlertKind, Notifier, crossed_thresholds};
pub use compare::{BudgetBand, BudgetReport, CategoryBudget, MonthComparison, budget_report};
