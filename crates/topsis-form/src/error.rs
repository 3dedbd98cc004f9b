use crate::config::ConfigError;
use crate::form::SubmitError;
use crate::notify::MailError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Http(reqwest::Error),
    Submit(SubmitError),
    /// The backend settled the submission with an error message.
    Rejected(String),
    Mail(MailError),
    Csv(csv::Error),
    BadRequest(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Http(err) => write!(f, "http client error: {}", err),
            AppError::Submit(err) => write!(f, "submission blocked: {}", err),
            AppError::Rejected(message) => write!(f, "scoring failed: {}", message),
            AppError::Mail(err) => write!(f, "{}", err),
            AppError::Csv(err) => write!(f, "csv error: {}", err),
            AppError::BadRequest(message) => write!(f, "bad request: {}", message),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Http(err) => Some(err),
            AppError::Submit(err) => Some(err),
            AppError::Mail(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Rejected(_) | AppError::BadRequest(_) | AppError::NotFound(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Submit(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejected(_) | AppError::Mail(_) | AppError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<SubmitError> for AppError {
    fn from(value: SubmitError) -> Self {
        Self::Submit(value)
    }
}

impl From<MailError> for AppError {
    fn from(value: MailError) -> Self {
        Self::Mail(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidationError;

    #[test]
    fn statuses_follow_error_kind() {
        let blocked = AppError::from(SubmitError::Invalid(ValidationError::MissingFile));
        assert_eq!(blocked.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::NotFound("session 9".to_string());
        assert_eq!(missing.to_string(), "session 9 not found");
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let rejected = AppError::Rejected("bad weights".to_string());
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
