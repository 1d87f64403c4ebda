//! Chat assistant: a proxy to the NLU detect-intent API and the fulfillment
//! webhook the NLU service calls back into.

use api_types::chat::{ChatMessage, FulfillmentReply, WebhookRequest};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{
    TransactionKind,
    chat::{ChatIntent, ERROR_REPLY},
};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState};

const DEFAULT_SESSION: &str = "123456";
const DEFAULT_USER: &str = "user-id-placeholder";

#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service error: {0}")]
    Service(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest<'a> {
    query_input: QueryInput<'a>,
}

#[derive(Serialize)]
struct QueryInput<'a> {
    text: TextInput<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: Option<DetectedQuery>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedQuery {
    #[serde(default)]
    fulfillment_text: String,
}

/// Client for the NLU detect-intent endpoint.
///
/// `base_url` points at the sessions collection; requests go to
/// `{base_url}/{session}:detectIntent`.
#[derive(Clone, Debug)]
pub struct NluClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    language: String,
}

impl NluClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            language: language.into(),
        }
    }

    pub async fn detect_intent(&self, session_id: &str, text: &str) -> Result<String, NluError> {
        let url = format!("{}/{}:detectIntent", self.base_url, session_id);
        let body = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text,
                    language_code: &self.language,
                },
            },
        };

        let mut req = self.http.post(url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let res: DetectIntentResponse = req.send().await?.json().await?;

        if let Some(error) = res.error {
            return Err(NluError::Service(error.to_string()));
        }
        Ok(res
            .query_result
            .map(|query| query.fulfillment_text)
            .unwrap_or_default())
    }
}

pub async fn test() -> &'static str {
    "Chat route is working!"
}

pub async fn send_message(
    State(state): State<ServerState>,
    Json(payload): Json<ChatMessage>,
) -> Result<Json<FulfillmentReply>, ServerError> {
    let text = payload
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ServerError::Generic("text is required".to_string()))?;
    let session_id = payload
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let nlu = state
        .nlu
        .as_ref()
        .ok_or_else(|| ServerError::Upstream("chat service not configured".to_string()))?;

    match nlu.detect_intent(&session_id, &text).await {
        Ok(fulfillment_text) => Ok(Json(FulfillmentReply { fulfillment_text })),
        Err(err) => {
            tracing::error!("detect intent failed: {err}");
            Err(ServerError::Upstream("chat service failed".to_string()))
        }
    }
}

pub async fn fulfillment(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookRequest>,
) -> Result<Json<FulfillmentReply>, (StatusCode, Json<FulfillmentReply>)> {
    let intent = ChatIntent::from_display_name(&payload.query_result.intent.display_name);
    let user_id = payload
        .original_detect_intent_request
        .and_then(|req| req.payload)
        .and_then(|payload| payload.user_id)
        .unwrap_or_else(|| DEFAULT_USER.to_string());
    tracing::debug!(?intent, %user_id, "fulfillment request");

    let now = Utc::now();
    let expenses = match intent.window(now) {
        Some(filter) => state
            .engine
            .list_transactions_filtered(&user_id, TransactionKind::Expense, &filter)
            .await
            .map_err(|err| {
                tracing::error!("fulfillment failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FulfillmentReply {
                        fulfillment_text: ERROR_REPLY.to_string(),
                    }),
                )
            })?,
        None => Vec::new(),
    };

    Ok(Json(FulfillmentReply {
        fulfillment_text: intent.reply(&expenses, now),
    }))
}
