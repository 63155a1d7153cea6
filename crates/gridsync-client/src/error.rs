//! Remote API error types.

use std::time::Duration;

use gridsync_core::{ErrorClassifier, ErrorKind, MessageSegment};

/// Generic description used instead of token refresh failure details.
///
/// Refresh failures carry correlation IDs and timestamps that differ on every
/// attempt, so echoing them into a status record would change it on each pass.
pub const TOKEN_REFRESH_MESSAGE: &str = "Invalid client secret";

/// Errors returned by the remote management API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The remote API answered with an error status.
    #[error("{message} (status {status})")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Service-specific error code, if provided.
        code: Option<String>,
        /// Service-provided error message.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The call did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The call was abandoned because the reconcile pass was cancelled.
    #[error("request cancelled")]
    Cancelled,

    /// The request could not be sent or its response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials for the remote API could not be obtained.
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),
}

impl ApiError {
    /// Creates a `Response` error without code or cause.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Response {
            status,
            code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a 404 `Response` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Response {
            status: 404,
            code: Some("ResourceNotFound".to_string()),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a 403 `Response` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Response {
            status: 403,
            code: Some("AuthorizationFailed".to_string()),
            message: message.into(),
            source: None,
        }
    }

    /// Returns the HTTP status code of a `Response` error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures to obtain credentials for the remote API.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// A referenced secret does not exist.
    #[error("secret {namespace}/{name} not found")]
    SecretNotFound {
        /// Namespace of the secret.
        namespace: String,
        /// Name of the secret.
        name: String,
    },

    /// The credentials are unusable and will remain so without user action.
    #[error("invalid credentials: {0}")]
    Permanent(String),

    /// Exchanging the credentials for an access token failed.
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),
}

/// Returns the classifier that understands [`ApiError`] and [`CredentialsError`].
///
/// - 404 responses are `NotFound`
/// - 401 and 403 responses are `AccessDenied`, at any depth of the chain
/// - missing secrets and permanent credential errors are `NoCredentials`
pub fn default_classifier() -> ErrorClassifier {
    ErrorClassifier::new()
        .with_kind_rule(|e: &ApiError| match e.status_code() {
            Some(404) => Some(ErrorKind::NotFound),
            Some(401 | 403) => Some(ErrorKind::AccessDenied),
            _ => None,
        })
        .with_kind_rule(|e: &CredentialsError| match e {
            CredentialsError::SecretNotFound { .. } | CredentialsError::Permanent(_) => {
                Some(ErrorKind::NoCredentials)
            }
            CredentialsError::TokenRefresh(_) => None,
        })
        .with_message_rule(|e: &ApiError| match e {
            ApiError::Response { message, .. } => Some(MessageSegment::Wrapped(message.clone())),
            ApiError::Credentials(_) => Some(MessageSegment::Wrapped(String::new())),
            _ => None,
        })
        .with_message_rule(|e: &CredentialsError| match e {
            CredentialsError::TokenRefresh(_) => {
                Some(MessageSegment::Final(TOKEN_REFRESH_MESSAGE.to_string()))
            }
            _ => None,
        })
}
