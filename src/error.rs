use std::path::PathBuf;
use std::time::Duration;

/// Why a credential refresh did not produce a new access token.
///
/// Cloneable so a single failure can settle every request that was waiting
/// on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_refresh_failure(.status, .detail))]
pub struct RefreshFailure {
    pub status: Option<u16>,
    pub detail: String,
}

impl RefreshFailure {
    pub fn new(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self::new(
            None,
            format!("refresh did not complete within {}ms", after.as_millis()),
        )
    }

    pub fn missing_refresh_token() -> Self {
        Self::new(None, "no refresh token available")
    }
}

fn format_refresh_failure(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(s) => format!("HTTP {s}: {detail}"),
        None => detail.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NamecardError {
    #[error("Request to {path} was rejected as unauthorized")]
    Unauthorized { path: String },

    #[error("Access to {path} is forbidden: {message}")]
    Forbidden { path: String, message: String },

    #[error("Session refresh failed: {0}. Run: namecard login")]
    RefreshFailed(#[from] RefreshFailure),

    #[error("Request to {path} failed with HTTP {status}: {message}")]
    Http {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    TransportError(Box<dyn std::error::Error + Send + Sync>),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Error in config {}: {detail}", path.display())]
    ConfigError { path: PathBuf, detail: String },

    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("Not logged in. Run: namecard login")]
    NotLoggedIn,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NamecardError {
    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            NamecardError::Unauthorized { .. } => "unauthorized",
            NamecardError::Forbidden { .. } => "forbidden",
            NamecardError::RefreshFailed(_) => "refresh_failed",
            NamecardError::Http { .. } => "http_error",
            NamecardError::TransportError(_) => "transport_error",
            NamecardError::ProtocolError(_) => "parse_error",
            NamecardError::ConfigError { .. } => "config_error",
            NamecardError::ProfileNotFound(_) => "not_found",
            NamecardError::NotLoggedIn => "auth_required",
            NamecardError::InvalidArgument(_) => "invalid_argument",
            NamecardError::IoError(_) => "io_error",
        }
    }

    /// The HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            NamecardError::Unauthorized { .. } => Some(401),
            NamecardError::Forbidden { .. } => Some(403),
            NamecardError::Http { status, .. } => Some(*status),
            NamecardError::RefreshFailed(failure) => failure.status,
            _ => None,
        }
    }

    /// True when the caller should drop the session and log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            NamecardError::Unauthorized { .. }
                | NamecardError::RefreshFailed(_)
                | NamecardError::NotLoggedIn
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(status) = self.status() {
            obj.insert("status".into(), serde_json::Value::from(status));
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
