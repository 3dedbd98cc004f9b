use async_trait::async_trait;
use serde::Deserialize;

use super::payload::SubmissionPayload;
use crate::results::{ResultRow, ResultTable};

/// Shown when the backend gives no readable reason.
pub const FALLBACK_MESSAGE: &str = "Server error";

/// Anything that can score a submission; the HTTP client in production, fakes in tests.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, payload: SubmissionPayload) -> Result<ResultTable, SubmissionFailure>;
}

/// A rejected or unreadable submission, reduced to what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SubmissionFailure {
    pub message: String,
}

impl SubmissionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_MESSAGE)
    }

    /// Uses the body's `error` string when there is one.
    pub fn from_body(body: Option<&[u8]>) -> Self {
        body.and_then(|bytes| serde_json::from_slice::<ResponseBody>(bytes).ok())
            .and_then(|parsed| parsed.error)
            .filter(|message| !message.trim().is_empty())
            .map(Self::new)
            .unwrap_or_else(Self::fallback)
    }
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    table: Option<Vec<ResultRow>>,
    #[serde(default)]
    download: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Interprets a 2xx body. A body without a table counts as a failure.
pub fn parse_success_body(body: &[u8]) -> Result<ResultTable, SubmissionFailure> {
    let parsed: ResponseBody =
        serde_json::from_slice(body).map_err(|_| SubmissionFailure::fallback())?;

    match parsed {
        ResponseBody {
            table: Some(rows),
            download,
            ..
        } => Ok(ResultTable { rows, download }),
        ResponseBody {
            error: Some(message),
            ..
        } if !message.trim().is_empty() => Err(SubmissionFailure::new(message)),
        _ => Err(SubmissionFailure::fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_becomes_the_message() {
        let failure = SubmissionFailure::from_body(Some(br#"{"error":"bad weights"}"#));
        assert_eq!(failure.message, "bad weights");
    }

    #[test]
    fn missing_or_odd_bodies_fall_back() {
        assert_eq!(SubmissionFailure::from_body(None).message, FALLBACK_MESSAGE);
        assert_eq!(
            SubmissionFailure::from_body(Some(b"")).message,
            FALLBACK_MESSAGE
        );
        assert_eq!(
            SubmissionFailure::from_body(Some(b"<html>502 Bad Gateway</html>")).message,
            FALLBACK_MESSAGE
        );
        assert_eq!(
            SubmissionFailure::from_body(Some(br#"{"error":42}"#)).message,
            FALLBACK_MESSAGE
        );
    }

    #[test]
    fn success_body_keeps_rows_and_download_link() {
        let body = json!({
            "table": [{"a": 1, "b": 2}],
            "download": "/api/download/topsis_result_7.csv"
        })
        .to_string();
        let table = parse_success_body(body.as_bytes()).expect("table parsed");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("a"), Some(&json!(1)));
        assert_eq!(
            table.download.as_deref(),
            Some("/api/download/topsis_result_7.csv")
        );
    }

    #[test]
    fn success_status_without_table_is_a_failure() {
        assert_eq!(
            parse_success_body(br#"{"error":"Weights count mismatch"}"#),
            Err(SubmissionFailure::new("Weights count mismatch"))
        );
        assert_eq!(
            parse_success_body(br#"{"status":"ok"}"#),
            Err(SubmissionFailure::fallback())
        );
    }
}
