//! Error taxonomy for the BidWaves REST boundary.
//!
//! Every failure the HTTP client can produce is folded into [`ApiError`],
//! which carries enough structure for the list controller to pick a single
//! user-facing message, an optional status code, and the session-expiry
//! side effect for 401s.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

const NETWORK_MESSAGE: &str = "Please check your internet connection and try again.";
const NO_BODY_MESSAGE: &str = "There was a network problem. Please try again.";
const UNAUTHORIZED_MESSAGE: &str = "Your session has expired. Please sign in again.";
const NOT_FOUND_MESSAGE: &str = "Not Found";
const DECODE_MESSAGE: &str = "Unexpected response from the server.";

/// Body fields the backend uses for error text, in lookup order.
const MESSAGE_FIELDS: &[&str] = &["error", "message", "description"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized (401)")]
    Unauthorized { message: Option<String> },

    #[error("not found (404)")]
    NotFound { message: Option<String> },

    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("server error ({status})")]
    ServerNoBody { status: StatusCode },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            _ => match message {
                Some(message) => ApiError::Server { status, message },
                None => ApiError::ServerNoBody { status },
            },
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Unauthorized { message } => message
                .clone()
                .unwrap_or_else(|| UNAUTHORIZED_MESSAGE.to_string()),
            ApiError::NotFound { message } => message
                .clone()
                .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::ServerNoBody { .. } => NO_BODY_MESSAGE.to_string(),
            ApiError::Decode(_) => DECODE_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Server { status, .. } | ApiError::ServerNoBody { status } => {
                Some(status.as_u16())
            }
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    /// Short heading for notices.
    pub fn label(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "Network Error",
            ApiError::Unauthorized { .. } => "Unauthorized",
            ApiError::NotFound { .. } => "Not Found",
            ApiError::Server { .. } | ApiError::ServerNoBody { .. } | ApiError::Decode(_) => {
                "Server Error"
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } | ApiError::ServerNoBody { status } => {
                status.is_server_error() || status.as_u16() == 429
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => ApiError::from_response(status, &[]),
            None => ApiError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// `error` may itself be an object carrying a `message`.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    MESSAGE_FIELDS.iter().find_map(|field| {
        let text = match object.get(*field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Object(nested) => nested.get("message")?.as_str()?.trim().to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}
