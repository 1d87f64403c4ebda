//! Reads `{ "days": [...], "amounts": [...] }` from stdin and prints
//! `{ "forecast": n }`, or `{ "error": "..." }` with exit code 1.

use std::{io::Read, process::ExitCode};

use api_types::forecast::{ForecastReply, ForecastRequest};

mod model;

fn run(input: &str) -> Result<f64, String> {
    let request: ForecastRequest = serde_json::from_str(input).map_err(|err| err.to_string())?;
    let days = request
        .days
        .ok_or(model::ModelError::Missing("days"))
        .map_err(|err| err.to_string())?;
    let amounts = request
        .amounts
        .ok_or(model::ModelError::Missing("amounts"))
        .map_err(|err| err.to_string())?;
    tracing::debug!(points = days.len(), "fitting forecast");

    model::forecast_next(&days, &amounts).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    let result = std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| err.to_string())
        .and_then(|_| run(&input));

    let (reply, code) = match result {
        Ok(forecast) => (ForecastReply::Forecast { forecast }, ExitCode::SUCCESS),
        Err(error) => {
            tracing::error!("forecast failed: {error}");
            (ForecastReply::Error { error }, ExitCode::FAILURE)
        }
    };

    match serde_json::to_string(&reply) {
        Ok(line) => println!("{line}"),
        Err(err) => {
            tracing::error!("cannot encode reply: {err}");
            return ExitCode::FAILURE;
        }
    }
    code
}
