//! Domain core: transaction records, storage operations and the analytics
//! pipeline that turns a user's history into breakdowns, tips and alerts.

pub use categories::{BudgetTable, DELIVERY_CATEGORY, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use commands::{NewTransactionCmd, UpdateTransactionCmd};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind};

pub mod analytics;
pub mod categories;
pub mod chat;
pub mod forecast;

mod commands;
mod error;
mod money;
mod ops;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
