//! Expense forecasting through an external predictor process.
//!
//! The request body is written to the predictor's stdin as JSON; the
//! predictor answers with a single JSON object on stdout.

use std::{process::Stdio, time::Duration};

use api_types::forecast::{ForecastReply, ForecastRequest};
use axum::{Json, extract::State};
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{ServerError, server::ServerState};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("cannot start predictor: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("predictor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("predictor output is not valid JSON: {0}")]
    InvalidOutput(#[from] serde_json::Error),
    #[error("predictor reported: {0}")]
    Model(String),
    #[error("predictor timed out")]
    Timeout,
}

/// Command line of the predictor program.
#[derive(Clone, Debug)]
pub struct ForecastRunner {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ForecastRunner {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the predictor once and returns its forecast.
    pub async fn predict(&self, request: &ForecastRequest) -> Result<f64, ForecastError> {
        let input = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ForecastError::Timeout)??;

        if !output.status.success() {
            return Err(ForecastError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        match serde_json::from_slice::<ForecastReply>(&output.stdout)? {
            ForecastReply::Forecast { forecast } => Ok(forecast),
            ForecastReply::Error { error } => Err(ForecastError::Model(error)),
        }
    }
}

pub async fn predict_expense(
    State(state): State<ServerState>,
    Json(payload): Json<ForecastRequest>,
) -> Result<Json<ForecastReply>, ServerError> {
    match (&payload.days, &payload.amounts) {
        (Some(days), Some(amounts)) if days.len() == amounts.len() => {}
        _ => return Err(ServerError::Generic("invalid input data".to_string())),
    }

    match state.forecast.predict(&payload).await {
        Ok(forecast) => Ok(Json(ForecastReply::Forecast { forecast })),
        Err(ForecastError::InvalidOutput(err)) => {
            tracing::error!("invalid predictor output: {err}");
            Err(ServerError::Upstream(
                "invalid response from model".to_string(),
            ))
        }
        Err(err) => {
            tracing::error!("forecast failed: {err}");
            Err(ServerError::Upstream("forecast model failed".to_string()))
        }
    }
}
