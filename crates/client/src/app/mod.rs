use api_types::transaction::{Amount, TransactionNew, TransactionUpdate, TransactionView};
use chrono::{DateTime, FixedOffset, NaiveDate};
use engine::{
    BudgetTable, MoneyCents, TransactionKind,
    analytics::{self, AlertDispatcher},
};

use crate::{
    client::ApiClient,
    config::{AppConfig, Command},
    error::Result,
    insights::{self, ConsoleNotifier},
    local_state::LocalState,
    survey,
};

pub struct App {
    config: AppConfig,
    client: ApiClient,
    budgets: BudgetTable,
    state: LocalState,
}

/// Noon UTC of `date`, so the calendar day survives any display offset.
fn noon(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(12, 0, 0)
        .map(|at| at.and_utc().fixed_offset())
}

/// Reads user input such as `12,50` into a wire amount.
fn parse_amount(value: &str) -> Result<Amount> {
    Ok(Amount::from_cents(value.parse::<MoneyCents>()?.cents()))
}

fn print_record(tx: &TransactionView) {
    println!(
        "{}  {}  {:>10}  {:<14} {}",
        tx.id,
        tx.date.format("%Y-%m-%d"),
        MoneyCents::new(tx.amount.cents()).to_string(),
        tx.category,
        tx.description.as_deref().unwrap_or("")
    );
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ApiClient::new(&config.base_url)?;
        let budgets = config.budget_table()?;
        let state = LocalState::load(&config.state_path)?;
        Ok(Self {
            config,
            client,
            budgets,
            state,
        })
    }

    pub async fn run(mut self, command: Command) -> Result<()> {
        if matches!(command, Command::Survey) {
            return self.onboard();
        }
        if !self.state.onboarding_completed {
            println!("Welcome! A few questions before we start.");
            self.onboard()?;
        }

        match command {
            Command::Add {
                kind,
                amount,
                category,
                description,
                date,
            } => {
                let kind = TransactionKind::from(kind);
                let payload = TransactionNew {
                    user: Some(self.config.user.clone()),
                    kind: None,
                    amount: Some(parse_amount(&amount)?),
                    category: Some(category),
                    description,
                    date: date.and_then(noon),
                };
                let tx = self.client.add(kind, &payload).await?;
                println!("Added {}:", kind.as_str());
                print_record(&tx);
            }
            Command::List { kind } => {
                let txs = self.client.list(kind.into(), &self.config.user).await?;
                if txs.is_empty() {
                    println!("No records.");
                }
                txs.iter().for_each(print_record);
            }
            Command::Update {
                kind,
                id,
                amount,
                category,
                description,
                date,
            } => {
                let payload = TransactionUpdate {
                    amount: Some(parse_amount(&amount)?),
                    category: Some(category),
                    description: Some(description),
                    date: date.and_then(noon),
                };
                let tx = self.client.update(kind.into(), id, &payload).await?;
                print_record(&tx);
            }
            Command::Delete { kind, id } => {
                let deleted = self.client.delete(kind.into(), id).await?;
                println!("{}", deleted.message);
            }
            Command::Stats { kind } => {
                let stats = self.client.stats(kind.into(), &self.config.user).await?;
                println!("Total: {}", MoneyCents::new(stats.total.cents()));
            }
            Command::Analytics { month } => {
                let records = insights::fetch_history(&self.client, &self.config.user).await?;
                let report = analytics::budget_report(&records, &self.budgets, month);
                print!("{}", insights::render_report(&report));
                self.dispatch_alerts(&records)?;
            }
            Command::Advice => {
                let records = insights::fetch_history(&self.client, &self.config.user).await?;
                let forecast = insights::fetch_forecast(&self.client, &records).await;
                let tips = analytics::generate_advice(&records, insights::today(), forecast);
                print!("{}", insights::render_tips(&tips));
                self.dispatch_alerts(&records)?;
            }
            Command::Chat { text, session } => {
                let reply = self.client.send_message(&text, session.as_deref()).await?;
                println!("{reply}");
            }
            Command::Survey => {}
        }

        Ok(())
    }

    fn onboard(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let answers = survey::run(&mut stdin.lock(), &mut std::io::stdout())?;
        self.state.complete_onboarding(answers);
        self.state.save(&self.config.state_path)?;
        println!("Onboarding completed.");
        Ok(())
    }

    /// Notifies newly crossed thresholds and remembers them across runs.
    fn dispatch_alerts(&mut self, records: &[engine::Transaction]) -> Result<()> {
        let mut dispatcher = AlertDispatcher::with_active(self.state.active_alerts.iter().copied());
        let fired = dispatcher.dispatch(records, &ConsoleNotifier);
        let active = dispatcher.active();
        if active != self.state.active_alerts {
            tracing::debug!(fired = fired.len(), "alert state changed");
            self.state.active_alerts = active;
            self.state.save(&self.config.state_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_pinned_to_noon_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(noon(date).unwrap().to_rfc3339(), "2024-02-01T12:00:00+00:00");
    }

    #[test]
    fn amounts_parse_to_cents() {
        assert_eq!(parse_amount("12,5").unwrap().cents(), 1250);
        assert!(parse_amount("abc").is_err());
    }
}
