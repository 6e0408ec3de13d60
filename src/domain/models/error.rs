use std::time::Duration;

use thiserror::Error;

/// Every way a single delivery attempt can fail. The delivery controller
/// treats them all alike when deciding to fall back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("No response within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP error: status {status}")]
    HttpError { status: u16 },

    #[error("Unable to parse backend response: {0}")]
    ParseFailure(String),

    #[error("Streaming unavailable")]
    StreamUnavailable,

    #[error("Backend reported an error: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> DeliveryError {
        if let Some(status) = err.status() {
            return DeliveryError::HttpError {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return DeliveryError::ParseFailure(err.to_string());
        }

        return DeliveryError::ConnectionFailure(err.to_string());
    }
}
