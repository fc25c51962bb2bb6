//! Session & presence tracking.
//!
//! # Module Structure
//!
//! - [`controller`]: the single writer; hydrates, logs in/out, toggles presence
//! - [`transition`]: pure authentication state machine
//! - [`types`]: snapshots, phases and login input
//! - [`verifier`]: credential verification seam and the demo verifier
//!
//! Presence is orthogonal to the authentication phase. It is stored and
//! restored independently, and only logout clears it.

mod controller;
pub mod transition;
mod types;
mod verifier;

pub use controller::{LoginAttempt, LoginHandle, SessionController, SessionControllerBuilder};
pub use transition::{next_phase, AuthEvent};
pub use types::{AuthPhase, ChatAudience, Credentials, SessionState};
pub use verifier::{CredentialVerifier, DemoVerifier};
