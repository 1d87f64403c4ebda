//! Expense and income endpoints.
//!
//! Both resources share these handlers; the router injects the kind.

use api_types::transaction::{
    Amount, TransactionDeleted, TransactionKind as ApiKind, TransactionNew, TransactionStats,
    TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{MoneyCents, NewTransactionCmd, Transaction, TransactionKind, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Expense => ApiKind::Expense,
        TransactionKind::Income => ApiKind::Income,
    }
}

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user: tx.user_id,
        kind: map_kind(tx.kind),
        amount: Amount::from_cents(tx.amount.cents()),
        category: tx.category,
        description: tx.description,
        date: tx.occurred_at.fixed_offset(),
    }
}

fn missing_fields() -> ServerError {
    ServerError::Generic("missing required fields".to_string())
}

fn parse_id(id: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(id).map_err(|_| ServerError::Generic("invalid id".to_string()))
}

fn resource_name(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    }
}

pub async fn add(
    Extension(kind): Extension<TransactionKind>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let user = payload
        .user
        .filter(|user| !user.trim().is_empty())
        .ok_or_else(missing_fields)?;
    let amount = payload.amount.ok_or_else(missing_fields)?;
    let category = payload.category.ok_or_else(missing_fields)?;
    if let Some(requested) = payload.kind
        && requested != map_kind(kind)
    {
        return Err(ServerError::Generic(format!(
            "kind must be {}",
            kind.as_str()
        )));
    }

    let mut cmd = NewTransactionCmd::new(user, kind, MoneyCents::new(amount.cents()), category);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = payload.date {
        cmd = cmd.occurred_at(date.with_timezone(&Utc));
    }

    let tx = state.engine.add_transaction(cmd).await?;
    tracing::info!(id = %tx.id, kind = kind.as_str(), "transaction added");

    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn list(
    Extension(kind): Extension<TransactionKind>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state.engine.list_transactions(&user_id, kind).await?;
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(kind): Extension<TransactionKind>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let id = parse_id(&id)?;
    let amount = payload.amount.ok_or_else(missing_fields)?;
    let category = payload.category.ok_or_else(missing_fields)?;
    let description = payload.description.ok_or_else(missing_fields)?;

    let mut cmd = UpdateTransactionCmd::new(id, kind, MoneyCents::new(amount.cents()), category)
        .description(description);
    if let Some(date) = payload.date {
        cmd = cmd.occurred_at(date.with_timezone(&Utc));
    }

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(view(tx)))
}

pub async fn remove(
    Extension(kind): Extension<TransactionKind>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let id = parse_id(&id)?;
    let removed = state.engine.delete_transaction(kind, id).await?;
    if !removed {
        tracing::debug!(%id, kind = kind.as_str(), "delete of unknown transaction");
    }

    Ok(Json(TransactionDeleted {
        message: format!("{} deleted", resource_name(kind)),
    }))
}

pub async fn stats(
    Extension(kind): Extension<TransactionKind>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<TransactionStats>, ServerError> {
    let total = state.engine.total(&user_id, kind).await?;
    Ok(Json(TransactionStats {
        total: Amount::from_cents(total.cents()),
    }))
}
