//! Error types shared by the resource client and the view controller.
//!
//! Every failure the client can observe falls into one of four buckets.
//! The view controller recovers all of them locally and turns them into a
//! notification via [`ClientError::user_message`].

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Fallback text for failures that carry no server-provided message
pub const GENERIC_NETWORK_MESSAGE: &str =
    "Could not reach the parish server. Check your connection and try again.";

/// Fallback text for responses that could not be understood
pub const GENERIC_PROTOCOL_MESSAGE: &str = "The parish server sent an unexpected response.";

/// Text shown when an action needs a logged-in user
pub const AUTH_REQUIRED_MESSAGE: &str = "Please log in to continue.";

/// Errors produced by a resource client call
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent or no response was received
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{message}")]
    Request { status: StatusCode, message: String },

    /// The response body was empty or not the expected JSON
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// Client-side guard: the action needs an active session
    #[error("authentication required")]
    AuthRequired,
}

impl ClientError {
    /// Build a request error from a non-success response body.
    ///
    /// Uses the `error` field of a `{ "error": "..." }` body when present,
    /// otherwise falls back to a message naming the status code.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Server returned error {}", status));

        ClientError::Request { status, message }
    }

    /// Text to show the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Request { message, .. } => message.clone(),
            ClientError::Network(_) => GENERIC_NETWORK_MESSAGE.to_string(),
            ClientError::Protocol(_) => GENERIC_PROTOCOL_MESSAGE.to_string(),
            ClientError::AuthRequired => AUTH_REQUIRED_MESSAGE.to_string(),
        }
    }

    /// HTTP status for request errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Error envelope returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_is_used_verbatim() {
        let err = ClientError::from_response(
            StatusCode::UNAUTHORIZED,
            br#"{"error":"invalid credentials"}"#,
        );
        assert_eq!(err.user_message(), "invalid credentials");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_missing_error_field_falls_back() {
        let err = ClientError::from_response(StatusCode::CONFLICT, br#"{"message":"nope"}"#);
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert!(err.user_message().contains("409"));
    }

    #[test]
    fn test_unparseable_body_falls_back() {
        let err = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert!(err.user_message().contains("500"));

        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, b"");
        assert!(err.user_message().contains("502"));
    }

    #[test]
    fn test_blank_error_field_falls_back() {
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, br#"{"error":"  "}"#);
        assert!(err.user_message().contains("400"));
    }

    #[test]
    fn test_generic_messages() {
        assert_eq!(
            ClientError::Protocol("empty body".into()).user_message(),
            GENERIC_PROTOCOL_MESSAGE
        );
        assert_eq!(ClientError::AuthRequired.user_message(), AUTH_REQUIRED_MESSAGE);
        assert_eq!(ClientError::AuthRequired.status(), None);
    }
}
