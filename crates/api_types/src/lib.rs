use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod amount {
    //! Money on the wire: a decimal number of euros, stored as cents.

    use std::fmt;

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{self, Visitor},
    };

    /// A euro amount that travels as a JSON number (`12.5`) and is held as
    /// integer cents (`1250`).
    ///
    /// Deserialization also accepts a decimal string (`"12.50"`) and rejects
    /// anything with more than two decimals.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Amount(i64);

    impl Amount {
        pub const fn from_cents(cents: i64) -> Self {
            Self(cents)
        }

        pub const fn cents(self) -> i64 {
            self.0
        }

        /// Parses `12`, `12.5` or `-0.25`.
        pub fn parse(text: &str) -> Result<Self, String> {
            let text = text.trim();
            let (negative, unsigned) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text),
            };
            let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
            let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
            if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
                return Err(format!("invalid amount {text:?}"));
            }
            if fraction.len() > 2 {
                return Err(format!("amount {text:?} has more than 2 decimals"));
            }

            let too_large = || format!("amount {text:?} is too large");
            let whole: i64 = whole.parse().map_err(|_| too_large())?;
            let fraction: i64 = format!("{fraction:0<2}").parse().map_err(|_| too_large())?;
            let cents = whole
                .checked_mul(100)
                .and_then(|cents| cents.checked_add(fraction))
                .ok_or_else(too_large)?;
            Ok(Self(if negative { -cents } else { cents }))
        }
    }

    impl fmt::Display for Amount {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let sign = if self.0 < 0 { "-" } else { "" };
            let cents = self.0.unsigned_abs();
            write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
        }
    }

    impl Serialize for Amount {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }

    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal amount with at most 2 decimals")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            v.checked_mul(100)
                .map(Amount)
                .ok_or_else(|| E::custom("amount is too large"))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            i64::try_from(v)
                .map_err(|_| E::custom("amount is too large"))
                .and_then(|v| self.visit_i64(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
            if !v.is_finite() {
                return Err(E::custom("amount must be finite"));
            }
            // `Display` for f64 prints the shortest exact decimal, never an exponent
            Amount::parse(&v.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            Amount::parse(v).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Amount {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(AmountVisitor)
        }
    }
}

pub mod transaction {
    use super::*;
    pub use crate::amount::Amount;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Expense,
        Income,
    }

    /// Request body for `POST /add`.
    ///
    /// Every field is optional on the wire so the server can answer with a
    /// "missing required fields" error instead of a deserialization failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub user: Option<String>,
        /// Must match the resource root when present.
        pub kind: Option<TransactionKind>,
        /// Must be > 0.
        pub amount: Option<Amount>,
        pub category: Option<String>,
        pub description: Option<String>,
        /// RFC3339 timestamp. If absent, server uses now().
        pub date: Option<DateTime<FixedOffset>>,
    }

    /// Request body for `PUT /update/:id` (full-field replace).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount: Option<Amount>,
        pub category: Option<String>,
        pub description: Option<String>,
        /// If absent, the stored date is kept.
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub user: String,
        pub kind: TransactionKind,
        pub amount: Amount,
        pub category: String,
        pub description: Option<String>,
        /// RFC3339 timestamp (UTC).
        pub date: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDeleted {
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionStats {
        pub total: Amount,
    }
}

pub mod forecast {
    use super::*;

    /// Parallel series sent to `POST /predict-expense`.
    ///
    /// `days[i]` is the day offset of `amounts[i]` from the first record.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ForecastRequest {
        pub days: Option<Vec<f64>>,
        pub amounts: Option<Vec<f64>>,
    }

    /// Output of the predictor program and body of a successful forecast.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum ForecastReply {
        Forecast { forecast: f64 },
        Error { error: String },
    }
}

pub mod chat {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub text: Option<String>,
        #[serde(alias = "sessionId")]
        pub session_id: Option<String>,
    }

    /// Reply for both `/send-message` and the fulfillment webhook.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FulfillmentReply {
        pub fulfillment_text: String,
    }

    /// Subset of the webhook request the NLU service posts to `/fulfillment`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookRequest {
        pub query_result: QueryResult,
        #[serde(default)]
        pub original_detect_intent_request: Option<OriginalRequest>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryResult {
        pub intent: Intent,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Intent {
        /// May carry a folder prefix, e.g. `finance/expense_trend`.
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OriginalRequest {
        #[serde(default)]
        pub payload: Option<Payload>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub user_id: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        chat::WebhookRequest,
        forecast::ForecastReply,
        transaction::{Amount, TransactionNew, TransactionStats},
    };

    #[test]
    fn amount_reads_numbers_and_strings() {
        let body = r#"{"user": "u", "amount": 12.5, "category": "food"}"#;
        let req: TransactionNew = serde_json::from_str(body).unwrap();
        assert_eq!(req.amount, Some(Amount::from_cents(1250)));

        let whole: Amount = serde_json::from_str("80").unwrap();
        assert_eq!(whole.cents(), 8000);
        let text: Amount = serde_json::from_str(r#""0.07""#).unwrap();
        assert_eq!(text.cents(), 7);
        let cents: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(cents.cents(), 1999);
    }

    #[test]
    fn amount_rejects_extra_decimals_and_junk() {
        for body in ["12.345", r#""1.001""#, r#""12,5""#, r#""abc""#, "true"] {
            assert!(
                serde_json::from_str::<Amount>(body).is_err(),
                "{body} should be rejected"
            );
        }
        let missing: TransactionNew = serde_json::from_str(r#"{"user": "u"}"#).unwrap();
        assert_eq!(missing.amount, None);
    }

    #[test]
    fn amount_serializes_as_decimal_number() {
        let stats = TransactionStats {
            total: Amount::from_cents(1250),
        };
        assert_eq!(serde_json::to_string(&stats).unwrap(), r#"{"total":12.5}"#);
        assert_eq!(Amount::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn forecast_reply_parses_both_shapes() {
        let ok: ForecastReply = serde_json::from_str(r#"{"forecast": 12.5}"#).unwrap();
        assert_eq!(ok, ForecastReply::Forecast { forecast: 12.5 });

        let err: ForecastReply = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(
            err,
            ForecastReply::Error {
                error: "boom".to_string()
            }
        );
    }

    #[test]
    fn webhook_request_reads_camel_case_fields() {
        let body = r#"{
            "queryResult": { "intent": { "displayName": "finance/expense_trend" } },
            "originalDetectIntentRequest": { "payload": { "userId": "alice" } }
        }"#;
        let req: WebhookRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.query_result.intent.display_name, "finance/expense_trend");
        let user = req
            .original_detect_intent_request
            .and_then(|r| r.payload)
            .and_then(|p| p.user_id);
        assert_eq!(user.as_deref(), Some("alice"));
    }
}
