use api_types::{
    chat::{ChatMessage, FulfillmentReply},
    forecast::{ForecastReply, ForecastRequest},
    transaction::{
        TransactionDeleted, TransactionNew, TransactionStats, TransactionUpdate, TransactionView,
    },
};
use engine::TransactionKind;
use reqwest::{Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn resource(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "api/expenses",
        TransactionKind::Income => "api/incomes",
    }
}

/// HTTP access to the SpendTrack server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // `Url::join` drops the last path segment unless it ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| AppError::Input(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    /// `path` followed by `user` as one percent-encoded segment.
    fn user_endpoint(&self, path: &str, user: &str) -> std::result::Result<Url, ClientError> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Server("base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(user);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(res: Response) -> std::result::Result<T, ClientError> {
        if res.status().is_success() {
            return res.json::<T>().await.map_err(ClientError::Transport);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        let err = match status.as_u16() {
            404 => ClientError::NotFound,
            400 | 422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        };
        Err(err)
    }

    /// Every record of `kind` owned by `user`, oldest first.
    pub async fn list(
        &self,
        kind: TransactionKind,
        user: &str,
    ) -> std::result::Result<Vec<TransactionView>, ClientError> {
        let endpoint = self.user_endpoint(resource(kind), user)?;
        let res = self.http.get(endpoint).send().await?;
        Self::parse(res).await
    }

    pub async fn add(
        &self,
        kind: TransactionKind,
        payload: &TransactionNew,
    ) -> std::result::Result<TransactionView, ClientError> {
        let endpoint = self.endpoint(&format!("{}/add", resource(kind)))?;
        let res = self.http.post(endpoint).json(payload).send().await?;
        Self::parse(res).await
    }

    pub async fn update(
        &self,
        kind: TransactionKind,
        id: Uuid,
        payload: &TransactionUpdate,
    ) -> std::result::Result<TransactionView, ClientError> {
        let endpoint = self.endpoint(&format!("{}/update/{}", resource(kind), id))?;
        let res = self.http.put(endpoint).json(payload).send().await?;
        Self::parse(res).await
    }

    pub async fn delete(
        &self,
        kind: TransactionKind,
        id: Uuid,
    ) -> std::result::Result<TransactionDeleted, ClientError> {
        let endpoint = self.endpoint(&format!("{}/delete/{}", resource(kind), id))?;
        let res = self.http.delete(endpoint).send().await?;
        Self::parse(res).await
    }

    pub async fn stats(
        &self,
        kind: TransactionKind,
        user: &str,
    ) -> std::result::Result<TransactionStats, ClientError> {
        let endpoint = self.user_endpoint(&format!("{}/stats", resource(kind)), user)?;
        let res = self.http.get(endpoint).send().await?;
        Self::parse(res).await
    }

    /// Asks the forecast endpoint for the next expense amount.
    pub async fn predict_expense(
        &self,
        days: Vec<f64>,
        amounts: Vec<f64>,
    ) -> std::result::Result<f64, ClientError> {
        let endpoint = self.endpoint("api/ml/predict-expense")?;
        let payload = ForecastRequest {
            days: Some(days),
            amounts: Some(amounts),
        };
        let res = self.http.post(endpoint).json(&payload).send().await?;
        match Self::parse::<ForecastReply>(res).await? {
            ForecastReply::Forecast { forecast } => Ok(forecast),
            ForecastReply::Error { error } => Err(ClientError::Server(error)),
        }
    }

    pub async fn send_message(
        &self,
        text: &str,
        session_id: Option<&str>,
    ) -> std::result::Result<String, ClientError> {
        let endpoint = self.endpoint("api/dialogflow/send-message")?;
        let payload = ChatMessage {
            text: Some(text.to_string()),
            session_id: session_id.map(str::to_string),
        };
        let res = self.http.post(endpoint).json(&payload).send().await?;
        let reply: FulfillmentReply = Self::parse(res).await?;
        Ok(reply.fulfillment_text)
    }
}
