//! Fetches a user's history and turns it into the analytics, advice and
//! alert views.

use api_types::transaction::{TransactionKind as ApiKind, TransactionView};
use chrono::{NaiveDate, Utc};
use engine::{
    MoneyCents, Transaction, TransactionKind,
    analytics::{Alert, BudgetReport, CategoryBudget, Notifier, Tip},
    forecast,
};

use crate::client::{ApiClient, ClientError};

pub fn to_transaction(view: TransactionView) -> Transaction {
    Transaction {
        id: view.id,
        user_id: view.user,
        kind: match view.kind {
            ApiKind::Expense => TransactionKind::Expense,
            ApiKind::Income => TransactionKind::Income,
        },
        amount: MoneyCents::new(view.amount.cents()),
        category: view.category,
        description: view.description,
        occurred_at: view.date.with_timezone(&Utc),
    }
}

/// Expenses and incomes of `user`, fetched concurrently.
pub async fn fetch_history(client: &ApiClient, user: &str) -> Result<Vec<Transaction>, ClientError> {
    let (expenses, incomes) = tokio::join!(
        client.list(TransactionKind::Expense, user),
        client.list(TransactionKind::Income, user)
    );

    Ok(expenses?
        .into_iter()
        .chain(incomes?)
        .map(to_transaction)
        .collect())
}

/// Forecast for the next expense, or `None` when it cannot be computed.
///
/// Failures are logged and never surface to the caller.
pub async fn fetch_forecast(client: &ApiClient, records: &[Transaction]) -> Option<f64> {
    let series = forecast::expense_series(records)?;
    match client.predict_expense(series.days, series.amounts).await {
        Ok(value) => {
            let accepted = forecast::accept_forecast(value);
            if accepted.is_none() {
                tracing::warn!("discarding non-finite forecast");
            }
            accepted
        }
        Err(err) => {
            tracing::warn!("forecast unavailable: {err}");
            None
        }
    }
}

/// Prints alerts to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: &Alert) {
        println!("{}\n  {}", alert.title(), alert.message());
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn render_rows(title: &str, rows: &[CategoryBudget]) -> Vec<String> {
    let body = rows
        .iter()
        .filter(|row| row.spent.is_positive() || row.ceiling.is_positive())
        .map(|row| {
            format!(
                "  {:<14} {:>12} / {:<12} {:>5.0}%  {}",
                row.category,
                row.spent.to_string(),
                row.ceiling.to_string(),
                row.ratio * 100.0,
                row.status()
            )
        });
    std::iter::once(title.to_string()).chain(body).collect()
}

pub fn render_report(report: &BudgetReport) -> String {
    let heading = match report.month {
        Some(month) => format!("Analytics for {month}"),
        None => "Analytics for the whole history".to_string(),
    };
    let mut lines = vec![
        heading,
        format!("  Income:    {}", report.totals.income),
        format!("  Expenses:  {}", report.totals.expense),
        format!(
            "  Remaining: {} ({:.0}%)",
            report.remaining,
            report.remaining_ratio * 100.0
        ),
    ];
    lines.extend(render_rows("Expenses by category", &report.expense));
    lines.extend(render_rows("Income by category", &report.income));
    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn render_tips(tips: &[Tip]) -> String {
    tips.iter().map(|tip| format!("- {tip}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use engine::{BudgetTable, analytics};
    use uuid::Uuid;

    fn view(kind: ApiKind, cents: i64, category: &str, date: &str) -> TransactionView {
        TransactionView {
            id: Uuid::new_v4(),
            user: "alice".to_string(),
            kind,
            amount: api_types::transaction::Amount::from_cents(cents),
            category: category.to_string(),
            description: None,
            date: DateTime::<FixedOffset>::parse_from_rfc3339(date).unwrap(),
        }
    }

    #[test]
    fn view_conversion_normalizes_to_utc() {
        let tx = to_transaction(view(ApiKind::Income, 500, "salary", "2024-02-01T01:00:00+02:00"));
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.amount, MoneyCents::new(500));
        assert_eq!(tx.occurred_at.to_rfc3339(), "2024-01-31T23:00:00+00:00");
    }

    #[test]
    fn report_lists_only_relevant_rows() {
        let records = vec![to_transaction(view(
            ApiKind::Expense,
            10_000,
            "food",
            "2024-02-01T12:00:00Z",
        ))];
        let budgets = BudgetTable::default()
            .with_overrides(TransactionKind::Expense, [("food".to_string(), MoneyCents::new(10_000))]);
        let report = analytics::budget_report(&records, &budgets, None);
        let text = render_report(&report);

        assert!(text.contains("Over budget by €0.00"));
        // delivery has no ceiling and no spend
        assert!(!text.contains("delivery"));
    }

    #[test]
    fn empty_history_report_has_one_line_per_entry() {
        let report = analytics::budget_report(&[], &BudgetTable::default(), None);
        let text = render_report(&report);
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("Analytics for the whole history"));
        assert_eq!(lines.next(), Some("  Income:    €0.00"));
        assert!(text.ends_with('\n'));
        assert!(text.lines().any(|line| line == "Income by category"));
    }

    #[test]
    fn tips_render_as_bullets() {
        assert_eq!(
            render_tips(&[Tip::Deficit, Tip::Invest]),
            format!("- {}\n- {}\n", Tip::Deficit, Tip::Invest)
        );
    }
}
