//! Rule-based budgeting tips.
//!
//! Rules are evaluated in [`ADVICE_PRIORITY`] order. Each rule contributes at
//! most one tip and never suppresses another; the output keeps that order.
//! When nothing fires the list holds exactly one [`Tip::Balanced`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, Transaction, TransactionKind};

use super::{
    aggregate::{self, Totals},
    compare,
};

/// Balance above which investing part of the savings is suggested.
pub const INVEST_BALANCE_THRESHOLD: MoneyCents = MoneyCents::new(500_00);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceRule {
    MonthOverMonth,
    TopCategory,
    Deficit,
    Invest,
    HighSpendRatio,
    Forecast,
}

/// Order in which rules run and tips are listed.
pub const ADVICE_PRIORITY: [AdviceRule; 6] = [
    AdviceRule::MonthOverMonth,
    AdviceRule::TopCategory,
    AdviceRule::Deficit,
    AdviceRule::Invest,
    AdviceRule::HighSpendRatio,
    AdviceRule::Forecast,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tip", rename_all = "snake_case")]
pub enum Tip {
    SpendingUp { percent: f64 },
    SpendingDown { percent: f64 },
    TopCategory { category: String, amount: MoneyCents },
    Deficit,
    Invest,
    HighSpendRatio,
    Forecast { amount: f64 },
    Balanced,
}

impl Tip {
    /// Rule that produced the tip; `None` for the fallback.
    pub fn rule(&self) -> Option<AdviceRule> {
        match self {
            Self::SpendingUp { .. } | Self::SpendingDown { .. } => Some(AdviceRule::MonthOverMonth),
            Self::TopCategory { .. } => Some(AdviceRule::TopCategory),
            Self::Deficit => Some(AdviceRule::Deficit),
            Self::Invest => Some(AdviceRule::Invest),
            Self::HighSpendRatio => Some(AdviceRule::HighSpendRatio),
            Self::Forecast { .. } => Some(AdviceRule::Forecast),
            Self::Balanced => None,
        }
    }
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpendingUp { percent } => write!(
                f,
                "📈 Your expenses went up by {percent:.1}% compared to last month."
            ),
            Self::SpendingDown { percent } => write!(
                f,
                "📉 Well done! You cut your expenses by {:.1}% from last month.",
                percent.abs()
            ),
            Self::TopCategory { category, amount } => {
                write!(f, "💡 Most of your spending went to: {category} ({amount}).")
            }
            Self::Deficit => write!(
                f,
                "⚠️ Try to reduce your expenses to avoid running a deficit."
            ),
            Self::Invest => write!(f, "💡 Consider investing part of your savings."),
            Self::HighSpendRatio => write!(
                f,
                "🚨 Your expenses exceed 80% of your income. Try cutting unnecessary spending."
            ),
            Self::Forecast { amount } => {
                write!(f, "🤖 Forecast: next month's expenses ~ €{amount:.2}")
            }
            Self::Balanced => write!(
                f,
                "🎉 Congratulations! Your finances look balanced. Keep it up!"
            ),
        }
    }
}

struct AdviceContext {
    comparison: compare::MonthComparison,
    top_category: Option<(String, MoneyCents)>,
    totals: Totals,
    forecast: Option<f64>,
}

/// Highest-spending expense category; ties go to the alphabetically first.
fn top_category(records: &[Transaction], month: aggregate::Month) -> Option<(String, MoneyCents)> {
    let mut top: Option<(String, MoneyCents)> = None;
    for (category, amount) in
        aggregate::category_totals_in_month(records, TransactionKind::Expense, month)
    {
        if top.as_ref().is_none_or(|(_, best)| amount > *best) {
            top = Some((category, amount));
        }
    }
    top
}

fn evaluate(rule: AdviceRule, ctx: &AdviceContext) -> Option<Tip> {
    match rule {
        AdviceRule::MonthOverMonth => match ctx.comparison.percent_change {
            Some(percent) if percent > 0.0 => Some(Tip::SpendingUp { percent }),
            Some(percent) if percent < 0.0 => Some(Tip::SpendingDown { percent }),
            _ => None,
        },
        AdviceRule::TopCategory => ctx
            .top_category
            .clone()
            .map(|(category, amount)| Tip::TopCategory { category, amount }),
        AdviceRule::Deficit => (ctx.totals.expense > ctx.totals.income).then_some(Tip::Deficit),
        AdviceRule::Invest => {
            (ctx.totals.balance() > INVEST_BALANCE_THRESHOLD).then_some(Tip::Invest)
        }
        AdviceRule::HighSpendRatio => ctx
            .totals
            .expense_exceeds_share(8, 10)
            .then_some(Tip::HighSpendRatio),
        AdviceRule::Forecast => ctx
            .forecast
            .filter(|value| value.is_finite())
            .map(|amount| Tip::Forecast { amount }),
    }
}

/// Builds the tip list for a user's full history.
///
/// `today` picks the current calendar month; `forecast` is the predicted
/// next-period expense when one is available.
pub fn generate_advice(
    records: &[Transaction],
    today: NaiveDate,
    forecast: Option<f64>,
) -> Vec<Tip> {
    let comparison = compare::month_over_month(records, today);
    let ctx = AdviceContext {
        top_category: top_category(records, comparison.this_month),
        comparison,
        totals: Totals::from_records(records),
        forecast,
    };

    let mut tips: Vec<Tip> = ADVICE_PRIORITY
        .iter()
        .filter_map(|rule| evaluate(*rule, &ctx))
        .collect();
    if tips.is_empty() {
        tips.push(Tip::Balanced);
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{date, expense, income};

    #[test]
    fn empty_history_gives_single_fallback() {
        let tips = generate_advice(&[], date("2024-02-15"), None);
        assert_eq!(tips, vec![Tip::Balanced]);
    }

    #[test]
    fn end_to_end_february_example() {
        let records = vec![
            expense("2024-01-01", 10_000, "food"),
            expense("2024-02-01", 15_000, "food"),
            income("2024-01-01", 50_000, "salary"),
        ];
        let tips = generate_advice(&records, date("2024-02-15"), None);

        assert_eq!(tips[0], Tip::SpendingUp { percent: 50.0 });
        assert_eq!(tips[0].to_string(), "📈 Your expenses went up by 50.0% compared to last month.");
        assert_eq!(
            tips[1],
            Tip::TopCategory {
                category: "food".to_string(),
                amount: MoneyCents::new(15_000)
            }
        );
        assert!(tips[1].to_string().contains("food (€150.00)"));
        // expenses 250 of income 500: no deficit, balance 250 < 500, 50% < 80%.
        assert_eq!(tips.len(), 2);
    }

    #[test]
    fn tips_follow_priority_order() {
        let records = vec![
            expense("2024-01-10", 10_000, "rent"),
            expense("2024-02-02", 5_000, "food"),
            expense("2024-02-03", 7_000, "taxi"),
            income("2024-01-01", 10_000, "salary"),
        ];
        let tips = generate_advice(&records, date("2024-02-20"), Some(123.456));
        let rules: Vec<_> = tips.iter().filter_map(Tip::rule).collect();
        assert_eq!(
            rules,
            vec![
                AdviceRule::MonthOverMonth,
                AdviceRule::TopCategory,
                AdviceRule::Deficit,
                AdviceRule::HighSpendRatio,
                AdviceRule::Forecast,
            ]
        );
        assert_eq!(
            tips[1],
            Tip::TopCategory {
                category: "taxi".to_string(),
                amount: MoneyCents::new(7_000)
            }
        );
        assert_eq!(tips[4].to_string(), "🤖 Forecast: next month's expenses ~ €123.46");
    }

    #[test]
    fn decrease_and_invest_tips() {
        let records = vec![
            expense("2024-01-10", 20_000, "rent"),
            expense("2024-02-02", 10_000, "food"),
            income("2024-01-01", 200_000, "salary"),
        ];
        let tips = generate_advice(&records, date("2024-02-20"), None);
        assert_eq!(tips[0], Tip::SpendingDown { percent: -50.0 });
        assert!(tips[0].to_string().contains("50.0%"));
        assert!(tips.contains(&Tip::Invest));
        assert!(!tips.contains(&Tip::Deficit));
    }

    #[test]
    fn non_finite_forecast_is_dropped() {
        let tips = generate_advice(&[], date("2024-02-15"), Some(f64::NAN));
        assert_eq!(tips, vec![Tip::Balanced]);
    }

    #[test]
    fn top_category_tie_prefers_alphabetical() {
        let records = vec![
            expense("2024-02-02", 5_000, "taxi"),
            expense("2024-02-03", 5_000, "food"),
        ];
        let tips = generate_advice(&records, date("2024-02-20"), None);
        assert_eq!(
            tips[0],
            Tip::TopCategory {
                category: "food".to_string(),
                amount: MoneyCents::new(5_000)
            }
        );
    }
}
