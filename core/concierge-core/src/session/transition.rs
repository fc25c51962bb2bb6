//! Maps session events to authentication phase transitions.
//! Completions that arrive for a phase they don't belong to are ignored.

use super::types::AuthPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoginRequested,
    LoginSucceeded,
    LoginFailed,
    LoggedOut,
    /// Store read at load time; `remembered` is the persisted logged-in flag.
    Hydrated { remembered: bool },
}

pub fn next_phase(current: AuthPhase, event: AuthEvent) -> AuthPhase {
    match (current, event) {
        (AuthPhase::Anonymous, AuthEvent::LoginRequested) => AuthPhase::LoggingIn,
        (_, AuthEvent::LoginRequested) => current,
        (AuthPhase::LoggingIn, AuthEvent::LoginSucceeded) => AuthPhase::Authenticated,
        (AuthPhase::LoggingIn, AuthEvent::LoginFailed) => AuthPhase::Anonymous,
        (_, AuthEvent::LoginSucceeded | AuthEvent::LoginFailed) => current,
        (_, AuthEvent::LoggedOut) => AuthPhase::Anonymous,
        (AuthPhase::LoggingIn, AuthEvent::Hydrated { .. }) => current,
        (_, AuthEvent::Hydrated { remembered: true }) => AuthPhase::Authenticated,
        (_, AuthEvent::Hydrated { remembered: false }) => AuthPhase::Anonymous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_from_anonymous_starts_login() {
        assert_eq!(
            next_phase(AuthPhase::Anonymous, AuthEvent::LoginRequested),
            AuthPhase::LoggingIn
        );
    }

    #[test]
    fn test_login_request_while_in_flight_is_ignored() {
        assert_eq!(
            next_phase(AuthPhase::LoggingIn, AuthEvent::LoginRequested),
            AuthPhase::LoggingIn
        );
    }

    #[test]
    fn test_login_request_while_authenticated_is_ignored() {
        assert_eq!(
            next_phase(AuthPhase::Authenticated, AuthEvent::LoginRequested),
            AuthPhase::Authenticated
        );
    }

    #[test]
    fn test_success_completes_login() {
        assert_eq!(
            next_phase(AuthPhase::LoggingIn, AuthEvent::LoginSucceeded),
            AuthPhase::Authenticated
        );
    }

    #[test]
    fn test_failure_returns_to_anonymous() {
        assert_eq!(
            next_phase(AuthPhase::LoggingIn, AuthEvent::LoginFailed),
            AuthPhase::Anonymous
        );
    }

    #[test]
    fn test_stale_success_after_logout_ignored() {
        assert_eq!(
            next_phase(AuthPhase::Anonymous, AuthEvent::LoginSucceeded),
            AuthPhase::Anonymous
        );
    }

    #[test]
    fn test_logout_from_any_phase() {
        for phase in [
            AuthPhase::Anonymous,
            AuthPhase::LoggingIn,
            AuthPhase::Authenticated,
        ] {
            assert_eq!(next_phase(phase, AuthEvent::LoggedOut), AuthPhase::Anonymous);
        }
    }

    #[test]
    fn test_hydrate_follows_remembered_flag() {
        assert_eq!(
            next_phase(AuthPhase::Anonymous, AuthEvent::Hydrated { remembered: true }),
            AuthPhase::Authenticated
        );
        assert_eq!(
            next_phase(
                AuthPhase::Authenticated,
                AuthEvent::Hydrated { remembered: false }
            ),
            AuthPhase::Anonymous
        );
    }

    #[test]
    fn test_hydrate_does_not_interrupt_login() {
        assert_eq!(
            next_phase(AuthPhase::LoggingIn, AuthEvent::Hydrated { remembered: false }),
            AuthPhase::LoggingIn
        );
    }
}
