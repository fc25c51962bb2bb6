//! Error types for concierge-core operations.
//! Keep `user_message` stable: the presentation layer shows it verbatim.

use std::path::PathBuf;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Store Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure reported by a [`DeviceStore`](crate::store::DeviceStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode store file: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Store backend unavailable: {0}")]
    Unavailable(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in concierge-core operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    // ─────────────────────────────────────────────────────────────────────
    // Login Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Credentials rejected for {identifier}")]
    InvalidCredentials { identifier: String },

    #[error("Login timed out after {after:?}")]
    NetworkTimeout { after: Duration },

    #[error("Login cancelled before completion")]
    Cancelled,

    #[error("Login task ended without a result")]
    LoginAborted,

    #[error("No async runtime available to run the login")]
    NoRuntime,

    // ─────────────────────────────────────────────────────────────────────
    // Persistence Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Device store unavailable for key {key}: {source}")]
    StoreUnavailable {
        key: String,
        #[source]
        source: StoreError,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Data Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid user profile: {0}")]
    InvalidProfile(String),

    #[error("Configuration error: {path}: {details}")]
    Config { path: PathBuf, details: String },
}

impl SessionError {
    pub(crate) fn store(key: &str, source: StoreError) -> Self {
        SessionError::StoreUnavailable {
            key: key.to_string(),
            source,
        }
    }

    /// Message suitable for a toast in the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::InvalidCredentials { .. } => {
                "Those credentials were not recognised. Please try again.".to_string()
            }
            SessionError::NetworkTimeout { .. } => {
                "The concierge service took too long to respond.".to_string()
            }
            SessionError::Cancelled => "Login was interrupted.".to_string(),
            SessionError::LoginAborted | SessionError::NoRuntime => {
                "Something went wrong while signing in. Please try again.".to_string()
            }
            SessionError::StoreUnavailable { .. } => {
                "Could not save your session on this device.".to_string()
            }
            SessionError::InvalidProfile(_) | SessionError::Config { .. } => self.to_string(),
        }
    }
}

/// Convenience type alias for Results using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;
