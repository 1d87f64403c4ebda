//! Canned, data-derived replies for the chat fulfillment webhook.

use chrono::{DateTime, Duration, Utc};

use crate::{
    MoneyCents, Transaction, TransactionKind, TransactionListFilter,
    analytics::{Month, aggregate, compare},
};

/// Days considered by the "last month" intents.
pub const LOOKBACK_DAYS: i64 = 30;

pub const FALLBACK_REPLY: &str = "Sorry, I did not understand the question. Please try again!";
pub const ERROR_REPLY: &str = "Something went wrong on the server.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatIntent {
    CategorySpending,
    NextMonthForecast,
    ExpenseTrend,
    Unknown(String),
}

impl ChatIntent {
    /// Parses an intent display name, ignoring any `folder/` prefix.
    pub fn from_display_name(display_name: &str) -> Self {
        let name = display_name.rsplit('/').next().unwrap_or(display_name).trim();
        match name {
            "category_spending" => Self::CategorySpending,
            "next_month_forecast" => Self::NextMonthForecast,
            "expense_trend" => Self::ExpenseTrend,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Date range of the expenses the reply needs, `None` if it needs none.
    pub fn window(&self, now: DateTime<Utc>) -> Option<TransactionListFilter> {
        match self {
            Self::CategorySpending | Self::NextMonthForecast => Some(TransactionListFilter {
                from: Some(now - Duration::days(LOOKBACK_DAYS)),
                to: None,
            }),
            Self::ExpenseTrend => Some(TransactionListFilter {
                from: Month::of_datetime(now).previous().start(),
                to: None,
            }),
            Self::Unknown(_) => None,
        }
    }

    /// Builds the reply text from the user's expenses.
    pub fn reply(&self, expenses: &[Transaction], now: DateTime<Utc>) -> String {
        match self {
            Self::CategorySpending => category_spending(expenses, now),
            Self::NextMonthForecast => next_month_forecast(expenses, now),
            Self::ExpenseTrend => expense_trend(expenses, now),
            Self::Unknown(_) => FALLBACK_REPLY.to_string(),
        }
    }
}

fn recent(expenses: &[Transaction], now: DateTime<Utc>) -> Vec<Transaction> {
    let since = now - Duration::days(LOOKBACK_DAYS);
    expenses
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && tx.occurred_at >= since)
        .cloned()
        .collect()
}

fn category_spending(expenses: &[Transaction], now: DateTime<Utc>) -> String {
    let recent = recent(expenses, now);
    let top = aggregate::category_totals(&recent, TransactionKind::Expense)
        .into_iter()
        .fold(None::<(String, MoneyCents)>, |best, (category, amount)| {
            match best {
                Some((_, best_amount)) if best_amount >= amount => best,
                _ => Some((category, amount)),
            }
        });

    match top {
        Some((category, amount)) => format!(
            "💡 You spend the most on '{category}' ({amount}) over the last month."
        ),
        None => "I found no expenses in the last month to analyse.".to_string(),
    }
}

fn next_month_forecast(expenses: &[Transaction], now: DateTime<Utc>) -> String {
    let recent = recent(expenses, now);
    if recent.is_empty() {
        return "There are no expenses in the last month to forecast from.".to_string();
    }
    let total = aggregate::total(&recent, TransactionKind::Expense);
    let forecast = total.as_units() / recent.len() as f64 * LOOKBACK_DAYS as f64;
    format!(
        "🔮 If you keep the same pace, expect about €{forecast:.2} of expenses next month."
    )
}

fn expense_trend(expenses: &[Transaction], now: DateTime<Utc>) -> String {
    let cmp = compare::month_over_month(expenses, now.date_naive());
    let Some(change) = cmp.percent_change else {
        return "There is no data for the previous month.".to_string();
    };

    if change > 0.0 {
        format!("📈 Your expenses went up this month by {change:.1}% compared to the previous one.")
    } else if change < 0.0 {
        format!(
            "📉 Your expenses went down this month by {:.1}% compared to the previous one.",
            change.abs()
        )
    } else {
        "Your expenses are the same as last month.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::expense;

    fn now() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn display_name_prefix_is_ignored() {
        assert_eq!(
            ChatIntent::from_display_name("finance/expense_trend"),
            ChatIntent::ExpenseTrend
        );
        assert_eq!(
            ChatIntent::from_display_name("category_spending"),
            ChatIntent::CategorySpending
        );
        assert_eq!(
            ChatIntent::from_display_name("smalltalk/hello"),
            ChatIntent::Unknown("hello".to_string())
        );
    }

    #[test]
    fn category_spending_uses_last_thirty_days() {
        let expenses = vec![
            expense("2024-01-02", 90_000, "rent"),
            expense("2024-02-01", 4_000, "food"),
            expense("2024-02-10", 2_550, "food"),
            expense("2024-02-11", 5_000, "taxi"),
        ];
        assert_eq!(
            ChatIntent::CategorySpending.reply(&expenses, now()),
            "💡 You spend the most on 'food' (€65.50) over the last month."
        );
        assert_eq!(
            ChatIntent::CategorySpending.reply(&[], now()),
            "I found no expenses in the last month to analyse."
        );
    }

    #[test]
    fn forecast_is_average_times_thirty() {
        let expenses = vec![
            expense("2024-02-01", 1_000, "food"),
            expense("2024-02-10", 3_000, "food"),
        ];
        assert_eq!(
            ChatIntent::NextMonthForecast.reply(&expenses, now()),
            "🔮 If you keep the same pace, expect about €600.00 of expenses next month."
        );
    }

    #[test]
    fn trend_compares_calendar_months() {
        let expenses = vec![
            expense("2024-01-15", 10_000, "food"),
            expense("2024-02-10", 12_500, "food"),
        ];
        assert_eq!(
            ChatIntent::ExpenseTrend.reply(&expenses, now()),
            "📈 Your expenses went up this month by 25.0% compared to the previous one."
        );
        assert_eq!(
            ChatIntent::ExpenseTrend.reply(&expenses[1..], now()),
            "There is no data for the previous month."
        );
    }

    #[test]
    fn unknown_intent_falls_back() {
        assert_eq!(
            ChatIntent::Unknown("x".to_string()).reply(&[], now()),
            FALLBACK_REPLY
        );
        assert!(ChatIntent::Unknown("x".to_string()).window(now()).is_none());
    }
}
