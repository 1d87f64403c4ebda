use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use engine::{BudgetTable, MoneyCents, TransactionKind, analytics::Month, categories};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/cli.toml";
const DEFAULT_STATE_PATH: &str = "config/cli_state.json";

/// Ceiling overrides in currency units, keyed by category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetOverrides {
    pub expense: BTreeMap<String, String>,
    pub income: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub user: String,
    pub state_path: String,
    pub budgets: BudgetOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            user: String::new(),
            state_path: DEFAULT_STATE_PATH.to_string(),
            budgets: BudgetOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Default ceilings with the configured overrides applied.
    ///
    /// Every key must be a category of its kind and every ceiling a
    /// non-negative amount.
    pub fn budget_table(&self) -> Result<BudgetTable> {
        let parse = |kind: TransactionKind, overrides: &BTreeMap<String, String>| {
            overrides
                .iter()
                .map(|(category, amount)| {
                    let invalid = |err: String| {
                        AppError::Input(format!(
                            "budgets.{}.{category}: {err}",
                            kind.as_str()
                        ))
                    };
                    let category = categories::normalize_category(kind, category)
                        .map_err(|err| invalid(err.to_string()))?;
                    let ceiling = amount
                        .parse::<MoneyCents>()
                        .map_err(|err| invalid(err.to_string()))?;
                    if ceiling < MoneyCents::ZERO {
                        return Err(invalid("ceiling must not be negative".to_string()));
                    }
                    Ok((category, ceiling))
                })
                .collect::<Result<Vec<_>>>()
        };

        Ok(BudgetTable::default()
            .with_overrides(
                TransactionKind::Expense,
                parse(TransactionKind::Expense, &self.budgets.expense)?,
            )
            .with_overrides(
                TransactionKind::Income,
                parse(TransactionKind::Income, &self.budgets.income)?,
            ))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Expense,
    Income,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Expense => TransactionKind::Expense,
            KindArg::Income => TransactionKind::Income,
        }
    }
}

fn parse_month(value: &str) -> std::result::Result<Month, String> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map(Month::of)
        .map_err(|_| format!("expected YYYY-MM, got '{value}'"))
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record an expense or an income.
    Add {
        kind: KindArg,
        /// Amount in currency units, e.g. 12.50.
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Defaults to now.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List records, oldest first.
    List { kind: KindArg },
    /// Replace amount, category and description of a record.
    Update {
        kind: KindArg,
        id: Uuid,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        /// Keeps the stored date when omitted.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Delete { kind: KindArg, id: Uuid },
    /// Total per kind as reported by the server.
    Stats { kind: KindArg },
    /// Category breakdown against the budget table.
    Analytics {
        /// Restrict to one calendar month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
    },
    /// Budgeting tips, forecast and alerts.
    Advice,
    /// Ask the chat assistant.
    Chat {
        text: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Run the onboarding survey again.
    Survey,
}

#[derive(Debug, Parser)]
#[command(name = "spendtrack_cli", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:5000).
    #[arg(long, env = "SPENDTRACK_CLI_BASE_URL")]
    base_url: Option<String>,
    /// Override user id.
    #[arg(long)]
    user: Option<String>,
    /// Override local state file.
    #[arg(long)]
    state_path: Option<String>,
    #[command(subcommand)]
    command: Command,
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPENDTRACK_CLI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(user) = args.user {
        settings.user = user;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if settings.user.trim().is_empty() {
        return Err(AppError::Input(
            "no user configured (set `user` or pass --user)".to_string(),
        ));
    }

    Ok((settings, args.command))
}
