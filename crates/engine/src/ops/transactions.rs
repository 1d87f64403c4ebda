use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, MoneyCents, NewTransactionCmd, ResultEngine, Transaction, TransactionKind,
    UpdateTransactionCmd, categories, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidRange(
            "from must be earlier than to".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Validates and stores a new transaction, returning the stored record.
    pub async fn add_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        let user_id = cmd.user_id.trim();
        if user_id.is_empty() {
            return Err(EngineError::InvalidUser("user must not be empty".to_string()));
        }
        let tx = Transaction::new(
            user_id.to_string(),
            cmd.kind,
            cmd.amount,
            &cmd.category,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.occurred_at.unwrap_or_else(Utc::now),
        )?;

        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        tracing::debug!(id = %tx.id, kind = tx.kind.as_str(), "transaction stored");
        Ok(tx)
    }

    /// Returns every transaction of `kind` owned by `user_id`, oldest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<Transaction>> {
        self.list_transactions_filtered(user_id, kind, &TransactionListFilter::default())
            .await
    }

    /// Like [`Engine::list_transactions`], restricted to a date range.
    pub async fn list_transactions_filtered(
        &self,
        user_id: &str,
        kind: TransactionKind,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Kind.eq(kind.as_str()));
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lt(to));
        }

        query
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Replaces amount, category and description of an existing transaction.
    ///
    /// The date is replaced only when the command carries one.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        transactions::validate_amount(cmd.amount)?;
        let category = categories::normalize_category(cmd.kind, &cmd.category)?;
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(cmd.transaction_id.to_string())
                .one(&db_tx)
                .await?
                .filter(|model| model.kind == cmd.kind.as_str())
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            let occurred_at = cmd.occurred_at.unwrap_or(model.occurred_at);
            let mut active: transactions::ActiveModel = model.into();
            active.amount_minor = ActiveValue::Set(cmd.amount.cents());
            active.category = ActiveValue::Set(category);
            active.description = ActiveValue::Set(description);
            active.occurred_at = ActiveValue::Set(occurred_at);

            let updated = active.update(&db_tx).await?;
            Transaction::try_from(updated)
        })
    }

    /// Deletes a transaction. Returns `false` if nothing matched.
    pub async fn delete_transaction(
        &self,
        kind: TransactionKind,
        transaction_id: Uuid,
    ) -> ResultEngine<bool> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(transaction_id.to_string()))
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Sum of every transaction of `kind` owned by `user_id`.
    pub async fn total(&self, user_id: &str, kind: TransactionKind) -> ResultEngine<MoneyCents> {
        let txs = self.list_transactions(user_id, kind).await?;
        Ok(txs.iter().map(|tx| tx.amount).sum())
    }
}
