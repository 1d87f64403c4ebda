use axum::{
    Extension, Router,
    routing::{delete, get, post, put},
};

use std::sync::Arc;

use crate::{
    chat::{self, NluClient},
    forecast::{self, ForecastRunner},
    transactions,
};
use engine::{Engine, TransactionKind};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub forecast: Arc<ForecastRunner>,
    /// `None` when no NLU service is configured; `/send-message` then fails.
    pub nlu: Option<Arc<NluClient>>,
}

impl ServerState {
    pub fn new(engine: Engine, forecast: ForecastRunner, nlu: Option<NluClient>) -> Self {
        Self {
            engine: Arc::new(engine),
            forecast: Arc::new(forecast),
            nlu: nlu.map(Arc::new),
        }
    }
}

/// CRUD routes for one transaction kind; the kind travels as an extension.
fn transaction_routes(kind: TransactionKind) -> Router<ServerState> {
    Router::new()
        .route("/add", post(transactions::add))
        .route("/{user_id}", get(transactions::list))
        .route("/update/{id}", put(transactions::update))
        .route("/delete/{id}", delete(transactions::remove))
        .route("/stats/{user_id}", get(transactions::stats))
        .layer(Extension(kind))
}

async fn root() -> &'static str {
    "Personal Finance API is running"
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api/expenses", transaction_routes(TransactionKind::Expense))
        .nest("/api/incomes", transaction_routes(TransactionKind::Income))
        .route("/api/ml/predict-expense", post(forecast::predict_expense))
        .route("/api/dialogflow/test", get(chat::test))
        .route("/api/dialogflow/send-message", post(chat::send_message))
        .route("/api/dialogflow/fulfillment", post(chat::fulfillment))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
