//! Data structures for session state and login input.

use std::fmt;

use serde::Serialize;

/// Position in the authentication state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Anonymous,
    LoggingIn,
    Authenticated,
}

/// Snapshot handed to the presentation layer.
///
/// Snapshots published by the controller derive both `login_in_flight` and
/// `authenticated` from a single [`AuthPhase`], so they are never both true.
/// A hand-built value can set both; [`SessionState::phase`] then reads it as
/// authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub authenticated: bool,
    pub guest_presence: bool,
    pub login_in_flight: bool,
}

impl SessionState {
    pub(crate) fn from_parts(phase: AuthPhase, guest_presence: bool) -> Self {
        Self {
            authenticated: phase == AuthPhase::Authenticated,
            guest_presence,
            login_in_flight: phase == AuthPhase::LoggingIn,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        if self.authenticated {
            AuthPhase::Authenticated
        } else if self.login_in_flight {
            AuthPhase::LoggingIn
        } else {
            AuthPhase::Anonymous
        }
    }

    /// Who the chat should answer as: in-house guest or prospective visitor.
    pub fn audience(&self) -> ChatAudience {
        if self.authenticated && self.guest_presence {
            ChatAudience::Guest
        } else {
            ChatAudience::Visitor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAudience {
    Guest,
    Visitor,
}

/// Login form input. Never persisted; the secret is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}
