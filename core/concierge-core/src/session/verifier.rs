//! Credential verification seam.
//!
//! The controller awaits a [`CredentialVerifier`] while a login is in flight.
//! [`DemoVerifier`] is the only implementation shipped: it waits out a fixed
//! round-trip delay and accepts every credential pair.

use std::time::Duration;

use async_trait::async_trait;

use super::types::Credentials;
use crate::error::Result;

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Resolves `Ok(())` when the credentials are accepted.
    async fn verify(&self, credentials: &Credentials) -> Result<()>;
}

/// Demonstration verifier: no credential is ever rejected.
#[derive(Debug, Clone)]
pub struct DemoVerifier {
    delay: Duration,
}

impl DemoVerifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl CredentialVerifier for DemoVerifier {
    async fn verify(&self, credentials: &Credentials) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(
            identifier = %credentials.identifier(),
            "Demo verifier accepted credentials"
        );
        Ok(())
    }
}
