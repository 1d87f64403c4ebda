//! Time-series preparation for the external expense predictor.
//!
//! The predictor itself runs out of process; this module only shapes the
//! request and vets the reply.

use serde::{Deserialize, Serialize};

use crate::{Transaction, TransactionKind};

/// Fewer dated expenses than this means no forecast is attempted.
pub const MIN_FORECAST_POINTS: usize = 3;

/// Parallel `(day offset, amount)` sequences, ordered by date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// Whole days since the first expense.
    pub days: Vec<f64>,
    /// Amounts in currency units.
    pub amounts: Vec<f64>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Builds the series from the expenses in `records`.
///
/// Returns `None` when fewer than [`MIN_FORECAST_POINTS`] expenses exist.
pub fn expense_series(records: &[Transaction]) -> Option<ForecastSeries> {
    let mut expenses: Vec<&Transaction> = records
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .collect();
    if expenses.len() < MIN_FORECAST_POINTS {
        return None;
    }
    expenses.sort_by_key(|tx| tx.occurred_at);

    let base = expenses.first()?.occurred_at;
    let (days, amounts) = expenses
        .iter()
        .map(|tx| {
            let offset = (tx.occurred_at - base).num_days();
            (offset as f64, tx.amount.as_units())
        })
        .unzip();

    Some(ForecastSeries { days, amounts })
}

/// Keeps a predicted value only if it is a finite number.
pub fn accept_forecast(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{expense, income};

    #[test]
    fn fewer_than_three_expenses_skip_forecast() {
        let records = vec![
            expense("2024-01-01", 1000, "food"),
            expense("2024-01-05", 1000, "food"),
            income("2024-01-02", 1000, "salary"),
            income("2024-01-03", 1000, "salary"),
        ];
        assert_eq!(expense_series(&records), None);
    }

    #[test]
    fn series_is_sorted_with_day_offsets() {
        let records = vec![
            expense("2024-01-11", 2550, "food"),
            expense("2024-01-01", 1000, "food"),
            expense("2024-02-01", 400, "taxi"),
        ];
        let series = expense_series(&records).unwrap();
        assert_eq!(series.days, vec![0.0, 10.0, 31.0]);
        assert_eq!(series.amounts, vec![10.0, 25.5, 4.0]);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn non_finite_forecasts_are_rejected() {
        assert_eq!(accept_forecast(f64::NAN), None);
        assert_eq!(accept_forecast(f64::INFINITY), None);
        assert_eq!(accept_forecast(42.5), Some(42.5));
    }
}
