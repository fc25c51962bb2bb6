//! The session & presence controller.
//!
//! Owns the only mutable copy of [`SessionState`]. Every transition is a short
//! critical section that writes through to the [`DeviceStore`] and then
//! publishes a fresh snapshot on a watch channel.
//!
//! ```text
//! presentation ──intent──▶ SessionController ──write──▶ DeviceStore
//!      ▲                         │
//!      └──── watch<SessionState> ┘
//! ```
//!
//! Login is the one asynchronous transition. It runs as a spawned task that
//! awaits the [`CredentialVerifier`] and races a cancellation token, so
//! tearing the controller down (or logging out) never lets a stale completion
//! land.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ulid::Ulid;

use super::transition::{next_phase, AuthEvent};
use super::types::{AuthPhase, Credentials, SessionState};
use super::verifier::{CredentialVerifier, DemoVerifier};
use crate::config::ConciergeConfig;
use crate::error::{Result, SessionError};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::profile::UserProfile;
use crate::store::{encode_flag, DeviceStore, GUEST_STATUS_KEY, LOGGED_IN_KEY, TRUE_VALUE};

/// What happened to a `login` call.
#[derive(Debug)]
pub enum LoginAttempt {
    /// A completion task was started; await the handle for its outcome.
    Pending(LoginHandle),
    /// Another login is still resolving. Nothing was started.
    AlreadyInFlight,
    /// The visitor is already signed in. Nothing was started.
    AlreadyAuthenticated,
}

impl LoginAttempt {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoginAttempt::Pending(_))
    }

    pub fn into_handle(self) -> Option<LoginHandle> {
        match self {
            LoginAttempt::Pending(handle) => Some(handle),
            LoginAttempt::AlreadyInFlight | LoginAttempt::AlreadyAuthenticated => None,
        }
    }
}

/// Awaitable outcome of one login attempt.
#[derive(Debug)]
pub struct LoginHandle {
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Running(JoinHandle<Result<SessionState>>),
    /// Resolved before any task was spawned.
    Failed(SessionError),
}

impl LoginHandle {
    fn failed(err: SessionError) -> Self {
        Self {
            state: HandleState::Failed(err),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Running(task) => task.is_finished(),
            HandleState::Failed(_) => true,
        }
    }

    /// Waits for the attempt to resolve.
    pub async fn outcome(self) -> Result<SessionState> {
        let task = match self.state {
            HandleState::Running(task) => task,
            HandleState::Failed(err) => return Err(err),
        };
        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => {
                warn!(error = %err, "Login completion task panicked");
                Err(SessionError::LoginAborted)
            }
            Err(_) => Err(SessionError::Cancelled),
        }
    }
}

/// Returns the controller to Anonymous if the login task ends before
/// `finish_login` runs: the verifier panicked or the runtime dropped the task.
struct AttemptGuard {
    inner: Arc<Inner>,
    attempt: u64,
    resolved: bool,
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if !self.resolved {
            self.inner
                .abandon_login(self.attempt, std::thread::panicking());
        }
    }
}

#[derive(Debug, Default)]
struct Core {
    phase: AuthPhase,
    guest_presence: bool,
    /// Monotonic attempt counter; a completion only applies to its own attempt.
    attempt: u64,
    pending: Option<CancellationToken>,
}

impl Core {
    fn snapshot(&self) -> SessionState {
        SessionState::from_parts(self.phase, self.guest_presence)
    }
}

struct Inner {
    session_id: Ulid,
    store: Arc<dyn DeviceStore>,
    notifier: Arc<dyn Notifier>,
    verifier: Arc<dyn CredentialVerifier>,
    login_timeout: Duration,
    profile: Option<UserProfile>,
    core: Mutex<Core>,
    state_tx: watch::Sender<SessionState>,
    shutdown: CancellationToken,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, core: &Core) -> SessionState {
        let state = core.snapshot();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        state
    }

    fn read_flag(&self, key: &str) -> Result<bool> {
        let value = self
            .store
            .get(key)
            .map_err(|err| SessionError::store(key, err))?;
        match value.as_deref() {
            None | Some("false") => Ok(false),
            Some(TRUE_VALUE) => Ok(true),
            Some(other) => {
                warn!(
                    session_id = %self.session_id,
                    key,
                    value = other,
                    "Unrecognised stored flag, treating as false"
                );
                Ok(false)
            }
        }
    }

    async fn run_login(
        self: Arc<Self>,
        attempt: u64,
        credentials: Credentials,
        cancel: CancellationToken,
    ) -> Result<SessionState> {
        let mut guard = AttemptGuard {
            inner: Arc::clone(&self),
            attempt,
            resolved: false,
        };
        let timeout = self.login_timeout;
        let verification = tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = tokio::time::timeout(timeout, self.verifier.verify(&credentials)) => {
                match result {
                    Ok(verified) => verified,
                    Err(_) => Err(SessionError::NetworkTimeout { after: timeout }),
                }
            }
        };
        guard.resolved = true;
        self.finish_login(attempt, &credentials, verification)
    }

    fn abandon_login(&self, attempt: u64, panicked: bool) {
        let mut core = self.lock();
        if core.attempt != attempt || core.phase != AuthPhase::LoggingIn {
            return;
        }
        core.pending = None;
        core.phase = next_phase(core.phase, AuthEvent::LoginFailed);
        self.publish(&core);
        drop(core);

        warn!(
            session_id = %self.session_id,
            attempt,
            panicked,
            "Login ended without a result"
        );
        if panicked {
            self.notifier.notify(Notice::error(
                "Login failed",
                SessionError::LoginAborted.user_message(),
            ));
        }
    }

    fn finish_login(
        &self,
        attempt: u64,
        credentials: &Credentials,
        verification: Result<()>,
    ) -> Result<SessionState> {
        let mut core = self.lock();
        if core.attempt != attempt || core.phase != AuthPhase::LoggingIn {
            debug!(
                session_id = %self.session_id,
                attempt,
                "Dropping superseded login completion"
            );
            return Err(SessionError::Cancelled);
        }
        core.pending = None;

        let outcome = verification.and_then(|()| {
            self.store
                .set(LOGGED_IN_KEY, TRUE_VALUE)
                .map_err(|err| SessionError::store(LOGGED_IN_KEY, err))
        });

        match outcome {
            Ok(()) => {
                core.phase = next_phase(core.phase, AuthEvent::LoginSucceeded);
                let state = self.publish(&core);
                drop(core);
                info!(
                    session_id = %self.session_id,
                    identifier = %credentials.identifier(),
                    "Login succeeded"
                );
                self.notifier.notify(Notice::success(
                    "Welcome to ILORA Retreats",
                    "You're signed in to your personal concierge.",
                ));
                Ok(state)
            }
            Err(err) => {
                core.phase = next_phase(core.phase, AuthEvent::LoginFailed);
                self.publish(&core);
                drop(core);
                warn!(
                    session_id = %self.session_id,
                    identifier = %credentials.identifier(),
                    error = %err,
                    "Login failed"
                );
                if !matches!(err, SessionError::Cancelled) {
                    self.notifier
                        .notify(Notice::error("Login failed", err.user_message()));
                }
                Err(err)
            }
        }
    }
}

/// Builds a [`SessionController`] around an injected store.
pub struct SessionControllerBuilder {
    store: Arc<dyn DeviceStore>,
    notifier: Arc<dyn Notifier>,
    verifier: Arc<dyn CredentialVerifier>,
    login_timeout: Duration,
    profile: Option<UserProfile>,
}

impl SessionControllerBuilder {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        let defaults = ConciergeConfig::default();
        Self {
            store,
            notifier: Arc::new(TracingNotifier),
            verifier: Arc::new(DemoVerifier::new(defaults.login_delay())),
            login_timeout: defaults.login_timeout(),
            profile: None,
        }
    }

    /// Demo verifier, timeout and placeholder profile taken from `config`.
    pub fn from_config(store: Arc<dyn DeviceStore>, config: &ConciergeConfig) -> Result<Self> {
        Ok(Self::new(store)
            .verifier(Arc::new(DemoVerifier::new(config.login_delay())))
            .login_timeout(config.login_timeout())
            .profile(config.profile.to_profile()?))
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Creates the controller and hydrates it from the store once.
    pub fn initialize(self) -> Result<SessionController> {
        let (state_tx, _state_rx) = watch::channel(SessionState::default());
        let controller = SessionController {
            inner: Arc::new(Inner {
                session_id: Ulid::new(),
                store: self.store,
                notifier: self.notifier,
                verifier: self.verifier,
                login_timeout: self.login_timeout,
                profile: self.profile,
                core: Mutex::new(Core::default()),
                state_tx,
                shutdown: CancellationToken::new(),
            }),
        };
        let state = controller.hydrate()?;
        info!(
            session_id = %controller.inner.session_id,
            authenticated = state.authenticated,
            guest_presence = state.guest_presence,
            "Session controller initialized"
        );
        Ok(controller)
    }
}

/// Single writer for session and presence state.
///
/// Dropping the controller cancels any login still in flight.
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn builder(store: Arc<dyn DeviceStore>) -> SessionControllerBuilder {
        SessionControllerBuilder::new(store)
    }

    /// Controller with default collaborators, hydrated from `store`.
    pub fn initialize(store: Arc<dyn DeviceStore>) -> Result<Self> {
        Self::builder(store).initialize()
    }

    pub fn session_id(&self) -> Ulid {
        self.inner.session_id
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state_tx.borrow()
    }

    /// Receives a new snapshot after every transition that changes state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.inner.profile.as_ref()
    }

    /// Re-reads both persisted flags. Calling it twice in a row yields the same state.
    pub fn hydrate(&self) -> Result<SessionState> {
        let remembered = self.inner.read_flag(LOGGED_IN_KEY)?;
        let guest_presence = self.inner.read_flag(GUEST_STATUS_KEY)?;

        let mut core = self.inner.lock();
        core.phase = next_phase(core.phase, AuthEvent::Hydrated { remembered });
        core.guest_presence = guest_presence;
        Ok(self.inner.publish(&core))
    }

    /// Starts a login. A second call while one is resolving is a no-op.
    ///
    /// The completion runs on the current Tokio runtime. Without one, nothing
    /// changes and the handle resolves to [`SessionError::NoRuntime`].
    pub fn login(&self, credentials: Credentials) -> LoginAttempt {
        let mut core = self.inner.lock();
        match core.phase {
            AuthPhase::LoggingIn => {
                debug!(session_id = %self.inner.session_id, "Login already in flight, ignoring");
                return LoginAttempt::AlreadyInFlight;
            }
            AuthPhase::Authenticated => {
                debug!(session_id = %self.inner.session_id, "Already authenticated, ignoring login");
                return LoginAttempt::AlreadyAuthenticated;
            }
            AuthPhase::Anonymous => {}
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(core);
            let err = SessionError::NoRuntime;
            warn!(session_id = %self.inner.session_id, error = %err, "Login not started");
            self.inner
                .notifier
                .notify(Notice::error("Login failed", err.user_message()));
            return LoginAttempt::Pending(LoginHandle::failed(err));
        };

        core.phase = next_phase(core.phase, AuthEvent::LoginRequested);
        core.attempt += 1;
        let attempt = core.attempt;
        let cancel = self.inner.shutdown.child_token();
        core.pending = Some(cancel.clone());
        self.inner.publish(&core);
        drop(core);

        debug!(
            session_id = %self.inner.session_id,
            attempt,
            identifier = %credentials.identifier(),
            "Login started"
        );
        let inner = Arc::clone(&self.inner);
        let task = runtime.spawn(inner.run_login(attempt, credentials, cancel));
        LoginAttempt::Pending(LoginHandle {
            state: HandleState::Running(task),
        })
    }

    /// Forgets the session on this device and clears presence.
    ///
    /// Memory is cleared even if the store fails; the first store error is returned.
    pub fn logout(&self) -> Result<()> {
        let mut core = self.inner.lock();
        let mut store_error = None;
        for key in [LOGGED_IN_KEY, GUEST_STATUS_KEY] {
            if let Err(err) = self.inner.store.remove(key) {
                store_error.get_or_insert(SessionError::store(key, err));
            }
        }

        if let Some(pending) = core.pending.take() {
            pending.cancel();
        }
        core.phase = next_phase(core.phase, AuthEvent::LoggedOut);
        core.guest_presence = false;
        self.inner.publish(&core);
        drop(core);

        match store_error {
            None => {
                info!(session_id = %self.inner.session_id, "Logged out");
                self.inner.notifier.notify(Notice::info(
                    "Signed out",
                    "You have been logged out on this device.",
                ));
                Ok(())
            }
            Some(err) => {
                warn!(session_id = %self.inner.session_id, error = %err, "Logout could not clear device store");
                self.inner
                    .notifier
                    .notify(Notice::error("Sign-out incomplete", err.user_message()));
                Err(err)
            }
        }
    }

    /// Records whether the visitor is currently staying on the property.
    pub fn set_guest_presence(&self, present: bool) -> Result<()> {
        let mut core = self.inner.lock();
        self.inner
            .store
            .set(GUEST_STATUS_KEY, encode_flag(present))
            .map_err(|err| SessionError::store(GUEST_STATUS_KEY, err))?;
        core.guest_presence = present;
        self.inner.publish(&core);
        debug!(session_id = %self.inner.session_id, present, "Guest presence updated");
        Ok(())
    }

    /// Cancels any pending login. Further logins are cancelled immediately.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.inner.session_id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::notify::{NoticeLevel, RecordingNotifier};
    use crate::store::MemoryDeviceStore;
    use async_trait::async_trait;

    const DELAY: Duration = Duration::from_millis(1000);

    fn controller_with(
        store: Arc<MemoryDeviceStore>,
    ) -> (SessionController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = SessionController::builder(store)
            .notifier(notifier.clone())
            .verifier(Arc::new(DemoVerifier::new(DELAY)))
            .initialize()
            .unwrap();
        (controller, notifier)
    }

    struct RejectingVerifier;

    #[async_trait]
    impl CredentialVerifier for RejectingVerifier {
        async fn verify(&self, credentials: &Credentials) -> Result<()> {
            Err(SessionError::InvalidCredentials {
                identifier: credentials.identifier().to_string(),
            })
        }
    }

    struct PanickingVerifier;

    #[async_trait]
    impl CredentialVerifier for PanickingVerifier {
        async fn verify(&self, _credentials: &Credentials) -> Result<()> {
            panic!("verifier backend crashed");
        }
    }

    struct ReadOnlyStore;

    impl DeviceStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn test_fresh_device_is_anonymous() {
        let (controller, _) = controller_with(Arc::new(MemoryDeviceStore::new()));
        assert_eq!(controller.state(), SessionState::default());
    }

    #[test]
    fn test_hydrates_remembered_session() {
        let store = Arc::new(MemoryDeviceStore::with_entries([
            (LOGGED_IN_KEY, "true"),
            (GUEST_STATUS_KEY, "true"),
        ]));
        let (controller, _) = controller_with(store);

        let state = controller.state();
        assert!(state.authenticated);
        assert!(state.guest_presence);
        assert!(!state.login_in_flight);
    }

    #[test]
    fn test_hydrate_twice_is_stable() {
        let store = Arc::new(MemoryDeviceStore::with_entries([(GUEST_STATUS_KEY, "true")]));
        let (controller, _) = controller_with(store);

        let first = controller.hydrate().unwrap();
        let second = controller.hydrate().unwrap();
        assert_eq!(first, second);
        assert!(!first.authenticated);
        assert!(first.guest_presence);
    }

    #[test]
    fn test_unrecognised_flag_value_reads_false() {
        let store = Arc::new(MemoryDeviceStore::with_entries([(LOGGED_IN_KEY, "yes")]));
        let (controller, _) = controller_with(store);
        assert!(!controller.state().authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_sets_in_flight_then_authenticates() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (controller, notifier) = controller_with(store.clone());

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        assert!(controller.state().login_in_flight);
        assert!(!controller.state().authenticated);

        let state = handle.outcome().await.unwrap();
        assert!(state.authenticated);
        assert!(!state.login_in_flight);
        assert_eq!(store.get(LOGGED_IN_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(notifier.count(NoticeLevel::Success), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_waits_for_delay() {
        let (controller, _) = controller_with(Arc::new(MemoryDeviceStore::new()));
        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();

        tokio::time::sleep(DELAY / 2).await;
        assert!(!handle.is_finished());
        assert!(controller.state().login_in_flight);

        handle.outcome().await.unwrap();
        assert!(controller.state().authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_login_while_in_flight_is_noop() {
        let (controller, notifier) = controller_with(Arc::new(MemoryDeviceStore::new()));

        let first = controller.login(Credentials::new("a@b.com", "x"));
        let second = controller.login(Credentials::new("c@d.com", "y"));
        assert!(first.is_pending());
        assert!(matches!(second, LoginAttempt::AlreadyInFlight));

        first.into_handle().unwrap().outcome().await.unwrap();
        assert!(controller.state().authenticated);
        assert_eq!(notifier.count(NoticeLevel::Success), 1);
    }

    #[test]
    fn test_login_when_authenticated_is_noop() {
        let store = Arc::new(MemoryDeviceStore::with_entries([(LOGGED_IN_KEY, "true")]));
        let (controller, notifier) = controller_with(store);

        let attempt = controller.login(Credentials::new("a@b.com", "x"));
        assert!(matches!(attempt, LoginAttempt::AlreadyAuthenticated));
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_login_returns_to_anonymous() {
        let store = Arc::new(MemoryDeviceStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = SessionController::builder(store.clone())
            .notifier(notifier.clone())
            .verifier(Arc::new(RejectingVerifier))
            .initialize()
            .unwrap();

        let err = controller
            .login(Credentials::new("a@b.com", "wrong"))
            .into_handle()
            .unwrap()
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidCredentials { .. }));
        assert_eq!(controller.state(), SessionState::default());
        assert!(store.snapshot().is_empty());
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_verifier_times_out() {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = SessionController::builder(Arc::new(MemoryDeviceStore::new()))
            .notifier(notifier.clone())
            .verifier(Arc::new(DemoVerifier::new(Duration::from_secs(30))))
            .login_timeout(Duration::from_secs(10))
            .initialize()
            .unwrap();

        let err = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap()
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::NetworkTimeout { .. }));
        assert!(!controller.state().login_in_flight);
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_login() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (controller, notifier) = controller_with(store.clone());

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        controller.shutdown();

        let err = handle.outcome().await.unwrap_err();
        assert!(matches!(err, SessionError::Cancelled));
        assert!(!controller.state().authenticated);
        assert!(!controller.state().login_in_flight);
        assert!(store.get(LOGGED_IN_KEY).unwrap().is_none());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_login() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (controller, _) = controller_with(store.clone());

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        drop(controller);

        assert!(matches!(
            handle.outcome().await,
            Err(SessionError::Cancelled)
        ));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_login_discards_completion() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (controller, notifier) = controller_with(store.clone());

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        controller.logout().unwrap();

        assert!(handle.outcome().await.is_err());
        assert!(!controller.state().authenticated);
        assert!(store.get(LOGGED_IN_KEY).unwrap().is_none());
        assert_eq!(notifier.count(NoticeLevel::Success), 0);
        assert_eq!(notifier.count(NoticeLevel::Info), 1);
    }

    #[tokio::test]
    async fn test_panicking_verifier_returns_to_anonymous() {
        let store = Arc::new(MemoryDeviceStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = SessionController::builder(store.clone())
            .notifier(notifier.clone())
            .verifier(Arc::new(PanickingVerifier))
            .initialize()
            .unwrap();

        let err = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap()
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::LoginAborted));
        assert_eq!(controller.state(), SessionState::default());
        assert!(store.snapshot().is_empty());
        assert_eq!(notifier.count(NoticeLevel::Error), 1);

        let retry = controller.login(Credentials::new("a@b.com", "x"));
        assert!(retry.is_pending());
    }

    #[test]
    fn test_login_without_runtime_resolves_as_failed() {
        let (controller, notifier) = controller_with(Arc::new(MemoryDeviceStore::new()));

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        assert!(handle.is_finished());
        assert_eq!(controller.state(), SessionState::default());
        assert_eq!(notifier.count(NoticeLevel::Error), 1);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = runtime.block_on(handle.outcome()).unwrap_err();
        assert!(matches!(err, SessionError::NoRuntime));
    }

    #[test]
    fn test_set_guest_presence_writes_through() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (controller, _) = controller_with(store.clone());

        controller.set_guest_presence(false).unwrap();
        assert_eq!(store.get(GUEST_STATUS_KEY).unwrap().as_deref(), Some("false"));

        controller.set_guest_presence(true).unwrap();
        assert_eq!(store.get(GUEST_STATUS_KEY).unwrap().as_deref(), Some("true"));
        assert!(controller.state().guest_presence);
        assert!(!controller.state().authenticated);
    }

    #[test]
    fn test_presence_write_failure_leaves_memory_untouched() {
        let controller = SessionController::initialize(Arc::new(ReadOnlyStore)).unwrap();

        let err = controller.set_guest_presence(true).unwrap_err();
        assert!(matches!(err, SessionError::StoreUnavailable { .. }));
        assert!(!controller.state().guest_presence);
    }

    #[test]
    fn test_logout_store_failure_still_clears_memory() {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = SessionController::builder(Arc::new(ReadOnlyStore))
            .notifier(notifier.clone())
            .initialize()
            .unwrap();

        let err = controller.logout().unwrap_err();
        assert!(matches!(err, SessionError::StoreUnavailable { ref key, .. } if key == LOGGED_IN_KEY));
        assert_eq!(controller.state(), SessionState::default());
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
        assert_eq!(notifier.count(NoticeLevel::Info), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_store_failure_surfaces() {
        let controller = SessionController::builder(Arc::new(ReadOnlyStore))
            .verifier(Arc::new(DemoVerifier::new(DELAY)))
            .initialize()
            .unwrap();

        let err = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap()
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::StoreUnavailable { .. }));
        assert!(!controller.state().authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_transitions() {
        let (controller, _) = controller_with(Arc::new(MemoryDeviceStore::new()));
        let mut rx = controller.subscribe();

        let handle = controller
            .login(Credentials::new("a@b.com", "x"))
            .into_handle()
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().login_in_flight);

        handle.outcome().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().authenticated);
    }

    #[test]
    fn test_profile_is_passed_through() {
        let profile = UserProfile::from_guest_record("guest@ilora.test", true, true, &[]).unwrap();
        let controller = SessionController::builder(Arc::new(MemoryDeviceStore::new()))
            .profile(profile.clone())
            .initialize()
            .unwrap();
        assert_eq!(controller.profile(), Some(&profile));
    }
}
