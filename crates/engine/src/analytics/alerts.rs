//! Threshold alerts raised while analytics are recomputed.
//!
//! [`crossed_thresholds`] is a pure check. [`AlertDispatcher`] wraps it with
//! edge-triggering: an alert is sent once when its threshold becomes crossed
//! and re-armed only after the threshold recovers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DELIVERY_CATEGORY, MoneyCents, Transaction, TransactionKind};

use super::aggregate::{self, Totals};

/// Spend in the delivery category above which an alert is raised.
pub const DELIVERY_ALERT_THRESHOLD: MoneyCents = MoneyCents::new(100_00);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Expenses above 90% of income.
    Overspending,
    /// Delivery spend above [`DELIVERY_ALERT_THRESHOLD`].
    HighDelivery,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alert {
    Overspending {
        expense: MoneyCents,
        income: MoneyCents,
    },
    HighDelivery {
        spent: MoneyCents,
    },
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::Overspending { .. } => AlertKind::Overspending,
            Self::HighDelivery { .. } => AlertKind::HighDelivery,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overspending { .. } => "⚠️ Excessive spending!",
            Self::HighDelivery { .. } => "🍔 High delivery spending",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Overspending { expense, income } => format!(
                "You spent {expense}, more than 90% of your income ({income})."
            ),
            Self::HighDelivery { spent } => format!(
                "You spent {spent} on delivery, more than {DELIVERY_ALERT_THRESHOLD}."
            ),
        }
    }
}

/// Every threshold currently crossed by the history.
pub fn crossed_thresholds(records: &[Transaction]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let totals = Totals::from_records(records);
    if totals.expense_exceeds_share(9, 10) {
        alerts.push(Alert::Overspending {
            expense: totals.expense,
            income: totals.income,
        });
    }

    let delivery = aggregate::category_totals(records, TransactionKind::Expense)
        .get(DELIVERY_CATEGORY)
        .copied()
        .unwrap_or(MoneyCents::ZERO);
    if delivery > DELIVERY_ALERT_THRESHOLD {
        alerts.push(Alert::HighDelivery { spent: delivery });
    }

    alerts
}

/// Sink for transient, non-blocking notifications.
pub trait Notifier {
    fn notify(&self, alert: &Alert);
}

/// Remembers which thresholds are active so each crossing notifies once.
#[derive(Debug, Default)]
pub struct AlertDispatcher {
    active: HashSet<AlertKind>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a dispatcher whose thresholds were already active.
    pub fn with_active(active: impl IntoIterator<Item = AlertKind>) -> Self {
        Self {
            active: active.into_iter().collect(),
        }
    }

    /// Currently active thresholds, in a stable order.
    pub fn active(&self) -> Vec<AlertKind> {
        let mut kinds: Vec<AlertKind> = self.active.iter().copied().collect();
        kinds.sort_by_key(|kind| *kind as u8);
        kinds
    }

    /// Evaluates the thresholds and notifies only newly crossed ones.
    ///
    /// Thresholds no longer crossed are cleared so they can fire again later.
    /// Returns the alerts that were sent.
    pub fn dispatch(&mut self, records: &[Transaction], notifier: &dyn Notifier) -> Vec<Alert> {
        let crossed = crossed_thresholds(records);
        let crossed_kinds: HashSet<AlertKind> = crossed.iter().map(Alert::kind).collect();
        self.active.retain(|kind| crossed_kinds.contains(kind));

        let mut fired = Vec::new();
        for alert in crossed {
            if self.active.insert(alert.kind()) {
                tracing::debug!(kind = ?alert.kind(), "alert threshold crossed");
                notifier.notify(&alert);
                fired.push(alert);
            }
        }
        fired
    }

    pub fn is_active(&self, kind: AlertKind) -> bool {
        self.active.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::analytics::test_support::{expense, income};

    #[derive(Default)]
    struct Recorder(RefCell<Vec<AlertKind>>);

    impl Notifier for Recorder {
        fn notify(&self, alert: &Alert) {
            self.0.borrow_mut().push(alert.kind());
        }
    }

    #[test]
    fn detects_both_thresholds() {
        let records = vec![
            expense("2024-02-01", 95_000, "rent"),
            expense("2024-02-02", 10_001, "delivery"),
            income("2024-02-01", 100_000, "salary"),
        ];
        let kinds: Vec<_> = crossed_thresholds(&records)
            .iter()
            .map(Alert::kind)
            .collect();
        assert_eq!(kinds, vec![AlertKind::Overspending, AlertKind::HighDelivery]);
    }

    #[test]
    fn thresholds_are_strict() {
        let records = vec![
            expense("2024-02-01", 80_000, "rent"),
            expense("2024-02-02", 10_000, "delivery"),
            income("2024-02-01", 100_000, "salary"),
        ];
        // 900 of 1000 is exactly 90%, delivery exactly 100: nothing fires.
        assert!(crossed_thresholds(&records).is_empty());
    }

    #[test]
    fn dispatcher_is_edge_triggered() {
        let recorder = Recorder::default();
        let mut dispatcher = AlertDispatcher::new();
        let mut records = vec![
            expense("2024-02-01", 95_000, "rent"),
            income("2024-02-01", 100_000, "salary"),
        ];

        assert_eq!(dispatcher.dispatch(&records, &recorder).len(), 1);
        assert!(dispatcher.dispatch(&records, &recorder).is_empty());
        assert!(dispatcher.is_active(AlertKind::Overspending));

        // Recovery clears the alert.
        records.push(income("2024-02-10", 100_000, "bonus"));
        assert!(dispatcher.dispatch(&records, &recorder).is_empty());
        assert!(!dispatcher.is_active(AlertKind::Overspending));

        // Crossing again fires again.
        records.push(expense("2024-02-11", 100_000, "travel"));
        assert_eq!(dispatcher.dispatch(&records, &recorder).len(), 1);

        assert_eq!(
            *recorder.0.borrow(),
            vec![AlertKind::Overspending, AlertKind::Overspending]
        );
    }

    #[test]
    fn restored_dispatcher_does_not_repeat() {
        let recorder = Recorder::default();
        let records = vec![
            expense("2024-02-01", 95_000, "rent"),
            expense("2024-02-02", 12_000, "delivery"),
            income("2024-02-01", 100_000, "salary"),
        ];

        let mut dispatcher = AlertDispatcher::with_active([AlertKind::Overspending]);
        let fired = dispatcher.dispatch(&records, &recorder);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind(), AlertKind::HighDelivery);
        assert_eq!(
            dispatcher.active(),
            vec![AlertKind::Overspending, AlertKind::HighDelivery]
        );
    }
}
