//! Subcommand implementations.
//!
//! Each command opens the device store, builds a controller (which hydrates
//! from the store), applies one transition and prints the result. Running two
//! commands back to back behaves like two page loads on the same device.

use std::io::Write;
use std::sync::Arc;

use concierge_core::{
    select_view, ChatAudience, ConciergeConfig, Credentials, FileDeviceStore, Notice,
    NoticeLevel, Notifier, SessionController, SessionControllerBuilder, SessionError,
    SessionState, StorageConfig, StoreError, UserProfile, View, ViewportClass,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Device store error: {0}")]
    Store(#[from] StoreError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Prints notices as terminal lines, the shell's stand-in for toasts.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let marker = match notice.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "•",
            NoticeLevel::Error => "✗",
        };
        tracing::debug!(title = %notice.title, "notice shown");
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{marker} {}: {}", notice.title, notice.message);
    }
}

pub struct Shell {
    config: ConciergeConfig,
    controller: SessionController,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    session_id: String,
    #[serde(flatten)]
    state: SessionState,
    audience: ChatAudience,
    viewport: ViewportClass,
    view: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a UserProfile>,
}

impl Shell {
    pub fn open(storage: &StorageConfig, config: ConciergeConfig) -> Result<Self, ShellError> {
        let store = Arc::new(FileDeviceStore::open(&storage.device_store_file())?);
        let controller = SessionControllerBuilder::from_config(store, &config)?
            .notifier(Arc::new(TerminalNotifier))
            .initialize()?;
        Ok(Self { config, controller })
    }

    fn classify(&self, width: u32) -> ViewportClass {
        ViewportClass::from_width(width, self.config.mobile_breakpoint_px)
    }

    pub fn status(&self, width: u32, json: bool) -> Result<(), ShellError> {
        let state = self.controller.state();
        let viewport = self.classify(width);
        let report = StatusReport {
            session_id: self.controller.session_id().to_string(),
            state,
            audience: state.audience(),
            viewport,
            view: select_view(state.authenticated, viewport),
            profile: state
                .authenticated
                .then(|| self.controller.profile())
                .flatten(),
        };

        let mut stdout = std::io::stdout().lock();
        if json {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
            return Ok(());
        }

        writeln!(stdout, "authenticated:   {}", state.authenticated)?;
        writeln!(stdout, "guest presence:  {}", state.guest_presence)?;
        writeln!(stdout, "view:            {:?}", report.view)?;
        if let Some(profile) = report.profile {
            writeln!(
                stdout,
                "UID: {} | Booking: {} | ID Proof: {} | Pending Balance: ₹{:.2}",
                profile.uid,
                profile.booking_status.label(),
                profile.id_proof_status,
                profile.pending_balance
            )?;
        }
        Ok(())
    }

    pub async fn login(&self, identifier: String, secret: String) -> Result<(), ShellError> {
        let attempt = self.controller.login(Credentials::new(identifier, secret));
        match attempt.into_handle() {
            Some(handle) => {
                handle.outcome().await?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "Already signed in on this device.")?;
            }
        }
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ShellError> {
        self.controller.logout()?;
        Ok(())
    }

    pub fn presence(&self, present: bool) -> Result<(), ShellError> {
        if !self.controller.state().authenticated {
            tracing::info!("Recording presence while signed out");
        }
        self.controller.set_guest_presence(present)?;
        let mut stdout = std::io::stdout().lock();
        let answer = if present { "Yes" } else { "No" };
        writeln!(stdout, "Staying at ILORA Retreats: {answer}")?;
        Ok(())
    }

    pub fn layout(&self, width: u32) -> Result<(), ShellError> {
        let view = select_view(self.controller.state().authenticated, self.classify(width));
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{view:?}")?;
        Ok(())
    }
}
