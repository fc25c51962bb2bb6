//! # concierge-core
//!
//! Session & presence controller for the ILORA Retreats concierge front end.
//! It decides whether a visitor is signed in and whether they are staying
//! on the property. It remembers both on the device and picks the top-level
//! layout to render.
//!
//! ## Design Principles
//!
//! - **Single writer**: only [`SessionController`] mutates session state;
//!   everyone else reads snapshots or subscribes to a watch channel.
//! - **Injected persistence**: the device store is a trait object, so tests
//!   run against memory and the shell runs against a JSON file.
//! - **Graceful degradation**: missing or corrupt stored data reads as a fresh
//!   device, never as an error.
//! - **Demonstration login**: the shipped verifier accepts every credential
//!   pair after a simulated round trip.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use concierge_core::{Credentials, MemoryDeviceStore, SessionController};
//!
//! let controller = SessionController::initialize(Arc::new(MemoryDeviceStore::new()))?;
//! let attempt = controller.login(Credentials::new("guest@ilora.test", "secret"));
//! if let Some(handle) = attempt.into_handle() {
//!     handle.outcome().await?;
//! }
//! controller.set_guest_presence(true)?;
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod notify;
pub mod profile;
pub mod session;
pub mod storage;
pub mod store;
pub mod viewport;

pub use config::{load_config, ConciergeConfig, ProfileConfig};
pub use error::{Result, SessionError, StoreError};
pub use layout::{select_view, LayoutWatcher, View};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use profile::{BookingStatus, DueItem, UserProfile};
pub use session::{
    AuthPhase, ChatAudience, CredentialVerifier, Credentials, DemoVerifier, LoginAttempt,
    LoginHandle, SessionController, SessionControllerBuilder, SessionState,
};
pub use storage::StorageConfig;
pub use store::{DeviceStore, FileDeviceStore, MemoryDeviceStore, GUEST_STATUS_KEY, LOGGED_IN_KEY};
pub use viewport::{Viewport, ViewportClass};
