//! Runtime configuration loaded from `concierge.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! A file that fails to parse is reported rather than silently ignored.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SessionError};
use crate::profile::{BookingStatus, UserProfile};

pub const DEFAULT_LOGIN_DELAY_MS: u64 = 1000;
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConciergeConfig {
    /// Simulated network round trip for the demo verifier.
    pub login_delay_ms: u64,
    /// Upper bound on a single credential verification.
    pub login_timeout_ms: u64,
    /// Viewports narrower than this are classified as mobile.
    pub mobile_breakpoint_px: u32,
    pub profile: ProfileConfig,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            login_delay_ms: DEFAULT_LOGIN_DELAY_MS,
            login_timeout_ms: DEFAULT_LOGIN_TIMEOUT_MS,
            mobile_breakpoint_px: DEFAULT_MOBILE_BREAKPOINT_PX,
            profile: ProfileConfig::default(),
        }
    }
}

impl ConciergeConfig {
    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }
}

/// Placeholder profile shown to every authenticated visitor.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    pub uid: String,
    pub booking_status: BookingStatus,
    pub id_proof_status: String,
    pub pending_balance: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            uid: "ILORA-2024-0117".to_string(),
            booking_status: BookingStatus::Confirmed,
            id_proof_status: "Verified".to_string(),
            pending_balance: 2500.0,
        }
    }
}

impl ProfileConfig {
    pub fn to_profile(&self) -> Result<UserProfile> {
        UserProfile::new(
            self.uid.clone(),
            self.booking_status,
            self.id_proof_status.clone(),
            self.pending_balance,
        )
    }
}

/// Loads configuration from `path`, falling back to defaults when it doesn't exist.
pub fn load_config(path: &Path) -> Result<ConciergeConfig> {
    if !path.exists() {
        return Ok(ConciergeConfig::default());
    }

    let content = fs_err::read_to_string(path).map_err(|err| SessionError::Config {
        path: path.to_path_buf(),
        details: err.to_string(),
    })?;
    parse_config(path, &content)
}

fn parse_config(path: &Path, content: &str) -> Result<ConciergeConfig> {
    let config =
        toml::from_str::<ConciergeConfig>(content).map_err(|err| SessionError::Config {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;

    if config.mobile_breakpoint_px == 0 {
        return Err(SessionError::Config {
            path: path.to_path_buf(),
            details: "mobile_breakpoint_px must be positive".to_string(),
        });
    }
    Ok(config)
}
