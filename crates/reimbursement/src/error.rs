use crate::config::ConfigError;
use crate::corpus::CorpusError;
use crate::estimation::{PolicyError, TripError};
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
    Policy(PolicyError),
    Corpus(CorpusError),
    Trip(TripError),
    Encode(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Policy(err) => write!(f, "policy error: {}", err),
            AppError::Corpus(err) => write!(f, "corpus error: {}", err),
            AppError::Trip(err) => write!(f, "invalid trip: {}", err),
            AppError::Encode(err) => write!(f, "failed to encode output: {}", err),
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
            AppError::Policy(err) => Some(err),
            AppError::Corpus(err) => Some(err),
            AppError::Trip(err) => Some(err),
            AppError::Encode(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Trip(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Corpus(_) | AppError::Policy(PolicyError::Parse(_) | PolicyError::Invalid(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Encode(_)
            | AppError::Policy(PolicyError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
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

impl From<PolicyError> for AppError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<CorpusError> for AppError {
    fn from(value: CorpusError) -> Self {
        Self::Corpus(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<TripError> for AppError {
    fn from(value: TripError) -> Self {
        Self::Trip(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_errors_are_unprocessable() {
        let err = AppError::from(TripError::ZeroDuration);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.to_string(),
            "invalid trip: trip_duration_days must be at least 1"
        );
    }

    #[test]
    fn input_errors_are_bad_requests() {
        let corpus = AppError::from(CorpusError::UnsupportedFormat("xlsx".to_string()));
        assert_eq!(corpus.status_code(), StatusCode::BAD_REQUEST);

        let policy = AppError::from(PolicyError::Invalid("empty tiers".to_string()));
        assert_eq!(policy.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let err = AppError::from(ConfigError::InvalidPort);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
