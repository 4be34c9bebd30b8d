//! Auth state resolution and transitions.
//!
//! ```text
//!   Uninitialized --initialize()--> Resolving --+--> Authenticated
//!                                               |
//!                                               +--> Unauthenticated
//! ```
//!
//! After the first resolution the orchestrator is *ready* and stays
//! ready; later transitions (sign-in, sign-out, backend events) pass
//! back through `Resolving` but never un-ready the state.
//!
//! ## Behavior
//!
//! - Startup prefers the locally cached session: if it is valid and
//!   carries a cached profile, the state goes `Authenticated`
//!   immediately and the cached tokens are handed to the backend in
//!   the background. The backend's answer then reconciles the state,
//!   so a revoked token self-corrects shortly after launch.
//! - Without a usable cache the backend is asked directly and its
//!   answer is authoritative: a session is persisted, no session
//!   clears local storage.
//! - Sign-out clears local session state even when the backend call
//!   fails. A user who asks to sign out gets signed out on this
//!   device, full stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use basket_core::session::UserProfile;
use basket_core::validation::{validate_email, validate_full_name, validate_password};
use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backend::{AuthBackend, SessionEvent};
use crate::error::AuthResult;
use crate::manager::SessionManager;
use crate::profile::ProfileStore;

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// `initialize` has not been called yet.
    Uninitialized,
    /// A resolution or transition is in flight.
    Resolving,
    Authenticated(UserProfile),
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Outcome of a successful sign-up.
#[derive(Debug, Clone, Copy)]
pub struct SignUpResult {
    /// The account was created but the provider wants an email
    /// confirmation before it will issue a session.
    pub requires_email_verification: bool,
}

/// Hook invoked when the user explicitly signs out, used to reset
/// per-user in-memory state such as carts.
pub trait ResetOnSignOut: Send + Sync {
    fn reset_for_sign_out(&self);
}

impl<F> ResetOnSignOut for F
where
    F: Fn() + Send + Sync,
{
    fn reset_for_sign_out(&self) {
        self()
    }
}

/// Drives [`AuthState`] from credentials, the cached session, and
/// backend session events.
pub struct AuthOrchestrator {
    backend: Arc<dyn AuthBackend>,
    manager: Arc<SessionManager>,
    profiles: Arc<ProfileStore>,
    resets: Vec<Arc<dyn ResetOnSignOut>>,
    state: watch::Sender<AuthState>,
    ready: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AuthOrchestrator {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        manager: Arc<SessionManager>,
        profiles: Arc<ProfileStore>,
        resets: Vec<Arc<dyn ResetOnSignOut>>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(AuthState::Uninitialized);
        Arc::new(Self {
            backend,
            manager,
            profiles,
            resets,
            state,
            ready: AtomicBool::new(false),
            listener: Mutex::new(None),
        })
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Whether the first session resolution has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Resolve the session once at startup and start listening for
    /// backend session events.
    pub async fn initialize(self: &Arc<Self>) {
        self.state.send_replace(AuthState::Resolving);

        let cached = self
            .manager
            .load_session()
            .await
            .filter(|record| record.is_valid(Utc::now()));

        let cached_profile = cached.as_ref().and_then(|record| record.user.clone());
        match (cached, cached_profile) {
            (Some(record), Some(profile)) => {
                // Trust the cache for instant startup; the backend
                // handoff below corrects us if the token was revoked.
                self.profiles.seed(profile.clone());
                self.state.send_replace(AuthState::Authenticated(profile));
                self.ready.store(true, Ordering::Release);
                debug!("restored session from cache, handing tokens to backend");

                let this = Arc::downgrade(self);
                let token = record.auth_token.clone().unwrap_or_default();
                let refresh = record.refresh_token.clone();
                tokio::spawn(async move {
                    let Some(this) = this.upgrade() else { return };
                    match this.backend.set_session(&token, refresh.as_deref()).await {
                        Ok(session) => this.reconcile(session).await,
                        Err(err) => {
                            // Keep the cached identity; the next
                            // backend event or restart resolves it.
                            warn!(%err, "cached session handoff failed")
                        }
                    }
                });
            }
            _ => {
                self.resolve_from_backend().await;
                self.ready.store(true, Ordering::Release);
            }
        }

        self.spawn_listener();
    }

    async fn resolve_from_backend(self: &Arc<Self>) {
        match self.backend.get_session().await {
            Ok(session) => self.reconcile(session).await,
            Err(err) => {
                warn!(%err, "could not resolve session from backend");
                self.manager.clear_session().await;
                self.profiles.clear();
                self.state.send_replace(AuthState::Unauthenticated);
            }
        }
    }

    /// Make local state match the backend's answer.
    async fn reconcile(self: &Arc<Self>, session: Option<crate::backend::AuthSession>) {
        match session {
            Some(session) => {
                let record = session.to_record();
                if let Err(err) = self.manager.save_session(&record).await {
                    warn!(%err, "failed to persist reconciled session");
                }
                let profile = session.user.to_profile();
                self.profiles.seed(profile.clone());
                self.state.send_replace(AuthState::Authenticated(profile));
                self.spawn_profile_refresh(session.user.id);
            }
            None => {
                self.manager.clear_session().await;
                self.profiles.clear();
                self.state.send_replace(AuthState::Unauthenticated);
            }
        }
    }

    /// Fetch the authoritative profile row off the critical path and
    /// fold it back into both caches.
    fn spawn_profile_refresh(self: &Arc<Self>, user_id: String) {
        let this = Arc::downgrade(self);
        tokio::spawn(async move {
            let Some(this) = this.upgrade() else { return };
            match this.profiles.refresh(&user_id).await {
                Ok(Some(profile)) => {
                    this.manager.update_cached_profile(&profile).await;
                    if this.state.borrow().is_authenticated() {
                        this.state.send_replace(AuthState::Authenticated(profile));
                    }
                }
                Ok(None) => {}
                Err(err) => debug!(%err, "background profile refresh failed"),
            }
        });
    }

    fn spawn_listener(self: &Arc<Self>) {
        let mut rx = self.backend.subscribe();
        let this = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let Some(this) = this.upgrade() else { break };
                        // Every pushed session change passes back
                        // through Resolving before it settles.
                        this.state.send_replace(AuthState::Resolving);
                        match event {
                            SessionEvent::SignedIn(session)
                            | SessionEvent::Refreshed(session) => {
                                this.reconcile(Some(session)).await
                            }
                            SessionEvent::SignedOut => this.reconcile(None).await,
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth event stream lagged")
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        let mut guard = self.listener.lock().expect("listener handle poisoned");
        if let Some(old) = guard.replace(handle) {
            old.abort();
        }
    }

    /// Sign in with an email and password.
    ///
    /// Credentials are validated locally before the backend is asked.
    /// On any failure the previous state is restored and nothing
    /// already persisted is touched.
    pub async fn sign_in(self: &Arc<Self>, email: &str, password: &str) -> AuthResult<()> {
        validate_email(email)?;
        validate_password(password)?;

        let prior = self.state();
        self.state.send_replace(AuthState::Resolving);

        let session = match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(err) => {
                self.state.send_replace(prior);
                return Err(err.into());
            }
        };

        if let Err(err) = self.manager.save_session(&session.to_record()).await {
            error!("signed in but session could not be persisted");
            self.state.send_replace(prior);
            return Err(err);
        }

        let profile = session.user.to_profile();
        self.profiles.seed(profile.clone());
        self.state.send_replace(AuthState::Authenticated(profile));
        info!(user_id = %session.user.id, "signed in");
        self.spawn_profile_refresh(session.user.id);
        Ok(())
    }

    /// Create an account. When the provider issues a session right
    /// away the user is signed in; otherwise the caller is told that
    /// an email confirmation is pending and the state is left alone.
    pub async fn sign_up(
        self: &Arc<Self>,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AuthResult<SignUpResult> {
        validate_email(email)?;
        validate_password(password)?;
        validate_full_name(full_name)?;

        let prior = self.state();
        self.state.send_replace(AuthState::Resolving);

        let outcome = match self.backend.sign_up(email, password, full_name).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state.send_replace(prior);
                return Err(err.into());
            }
        };

        match outcome.session {
            Some(session) => {
                if let Err(err) = self.manager.save_session(&session.to_record()).await {
                    error!("signed up but session could not be persisted");
                    self.state.send_replace(prior);
                    return Err(err);
                }
                let profile = session.user.to_profile();
                self.profiles.seed(profile.clone());
                self.state.send_replace(AuthState::Authenticated(profile));
                info!(user_id = %session.user.id, "signed up and signed in");
                self.spawn_profile_refresh(session.user.id);
                Ok(SignUpResult {
                    requires_email_verification: false,
                })
            }
            None => {
                info!(user_id = %outcome.user.id, "signed up, confirmation pending");
                self.state.send_replace(prior);
                Ok(SignUpResult {
                    requires_email_verification: true,
                })
            }
        }
    }

    /// Sign out. Local state is cleared even when the backend call
    /// fails.
    pub async fn sign_out(self: &Arc<Self>) {
        self.state.send_replace(AuthState::Resolving);

        if let Err(err) = self.backend.sign_out().await {
            warn!(%err, "backend sign-out failed, clearing local state anyway");
        }

        self.manager.clear_session().await;
        self.profiles.clear();
        for reset in &self.resets {
            reset.reset_for_sign_out();
        }
        self.state.send_replace(AuthState::Unauthenticated);
        info!("signed out");
    }

    /// Stop the backend event listener. Also done on drop.
    pub fn shutdown(&self) {
        if let Some(handle) = self
            .listener
            .lock()
            .expect("listener handle poisoned")
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for AuthOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthSession, AuthUser, SignUpOutcome};
    use crate::error::{AuthError, BackendError};
    use basket_storage::{MemoryStore, SecureStorage};
    use chrono::Duration;
    use std::sync::atomic::AtomicUsize;

    /// Scriptable backend double. Each `Mutex<Option<..>>` slot is a
    /// canned response for the next call of the matching method.
    struct MockBackend {
        session: Mutex<Option<AuthSession>>,
        sign_in_error: Mutex<Option<BackendError>>,
        sign_up_session: Mutex<Option<bool>>,
        sign_out_error: Mutex<Option<BackendError>>,
        sign_out_calls: AtomicUsize,
        set_session_calls: AtomicUsize,
        profile_name: Mutex<Option<String>>,
        events: broadcast::Sender<SessionEvent>,
    }

    impl MockBackend {
        fn new() -> Arc<Self> {
            let (events, _) = broadcast::channel(16);
            Arc::new(Self {
                session: Mutex::new(None),
                sign_in_error: Mutex::new(None),
                sign_up_session: Mutex::new(Some(true)),
                sign_out_error: Mutex::new(None),
                sign_out_calls: AtomicUsize::new(0),
                set_session_calls: AtomicUsize::new(0),
                profile_name: Mutex::new(None),
                events,
            })
        }

        fn session_for(user_id: &str) -> AuthSession {
            AuthSession {
                access_token: format!("tok-{user_id}"),
                refresh_token: Some(format!("ref-{user_id}")),
                expires_at: Utc::now() + Duration::hours(1),
                user: AuthUser {
                    id: user_id.to_string(),
                    email: format!("{user_id}@example.com"),
                    full_name: None,
                },
            }
        }
    }

    #[async_trait::async_trait]
    impl AuthBackend for MockBackend {
        async fn sign_in_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<AuthSession, BackendError> {
            if let Some(err) = self.sign_in_error.lock().unwrap().take() {
                return Err(err);
            }
            let session = Self::session_for("u-1");
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(session)
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _full_name: Option<&str>,
        ) -> Result<SignUpOutcome, BackendError> {
            let with_session = self.sign_up_session.lock().unwrap().unwrap_or(true);
            let session = with_session.then(|| Self::session_for("u-new"));
            let user = session
                .as_ref()
                .map(|s| s.user.clone())
                .unwrap_or_else(|| AuthUser {
                    id: "u-new".into(),
                    email: "u-new@example.com".into(),
                    full_name: None,
                });
            Ok(SignUpOutcome { user, session })
        }

        async fn sign_out(&self) -> Result<(), BackendError> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            *self.session.lock().unwrap() = None;
            match self.sign_out_error.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn get_session(&self) -> Result<Option<AuthSession>, BackendError> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn set_session(
            &self,
            access_token: &str,
            _refresh_token: Option<&str>,
        ) -> Result<Option<AuthSession>, BackendError> {
            self.set_session_calls.fetch_add(1, Ordering::SeqCst);
            let mut session = Self::session_for("u-1");
            session.access_token = access_token.to_string();
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(Some(session))
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
            self.events.subscribe()
        }

        async fn fetch_profile(
            &self,
            user_id: &str,
        ) -> Result<Option<UserProfile>, BackendError> {
            Ok(self.profile_name.lock().unwrap().clone().map(|name| {
                UserProfile {
                    id: user_id.to_string(),
                    email: format!("{user_id}@example.com"),
                    full_name: Some(name),
                    preferences: Default::default(),
                }
            }))
        }

        async fn update_profile(&self, _profile: &UserProfile) -> Result<(), BackendError> {
            Ok(())
        }

        async fn fetch_settings(
            &self,
            _user_id: &str,
        ) -> Result<Option<serde_json::Value>, BackendError> {
            Ok(None)
        }

        async fn save_settings(
            &self,
            _user_id: &str,
            _settings: &serde_json::Value,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    struct Fixture {
        backend: Arc<MockBackend>,
        manager: Arc<SessionManager>,
        orchestrator: Arc<AuthOrchestrator>,
        reset_count: Arc<AtomicUsize>,
    }

    fn fixture_with_store(store: Arc<dyn basket_storage::KeyValueStore>) -> Fixture {
        let backend = MockBackend::new();
        let manager = Arc::new(SessionManager::new(SecureStorage::plain_only(store)));
        let profiles = ProfileStore::new(backend.clone());
        let reset_count = Arc::new(AtomicUsize::new(0));
        let counter = reset_count.clone();
        let resets: Vec<Arc<dyn ResetOnSignOut>> = vec![Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })];
        let orchestrator =
            AuthOrchestrator::new(backend.clone(), manager.clone(), profiles, resets);
        Fixture {
            backend,
            manager,
            orchestrator,
            reset_count,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_store(Arc::new(MemoryStore::new()))
    }

    async fn settle() {
        // Let background reconcile/refresh tasks run.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn initialize_without_any_session_is_unauthenticated() {
        let fx = fixture();
        assert_eq!(fx.orchestrator.state(), AuthState::Uninitialized);
        assert!(!fx.orchestrator.is_ready());

        fx.orchestrator.initialize().await;

        assert!(fx.orchestrator.is_ready());
        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn initialize_trusts_valid_cached_session_immediately() {
        let fx = fixture();
        fx.manager
            .save_session(&MockBackend::session_for("u-1").to_record())
            .await
            .unwrap();

        fx.orchestrator.initialize().await;

        // Authenticated before the backend handoff completes.
        assert!(fx.orchestrator.is_authenticated());
        assert!(fx.orchestrator.is_ready());

        settle().await;
        assert_eq!(fx.backend.set_session_calls.load(Ordering::SeqCst), 1);
        assert!(fx.orchestrator.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_falls_back_to_backend_for_expired_cache() {
        let fx = fixture();
        let mut session = MockBackend::session_for("u-1");
        session.expires_at = Utc::now() - Duration::minutes(5);
        fx.manager.save_session(&session.to_record()).await.unwrap();

        fx.orchestrator.initialize().await;

        // Backend has no session either, so the stale cache is gone.
        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
        assert!(fx.manager.load_session().await.is_none());
        assert_eq!(fx.backend.set_session_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sign_in_persists_session_and_authenticates() {
        let fx = fixture();
        fx.orchestrator.initialize().await;

        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();

        assert!(fx.orchestrator.is_authenticated());
        let record = fx.manager.load_session().await.unwrap();
        assert_eq!(record.auth_token.as_deref(), Some("tok-u-1"));
    }

    #[tokio::test]
    async fn sign_in_replaces_previous_users_record_wholesale() {
        let fx = fixture();
        // A different account's session is still on disk.
        let mut stale = MockBackend::session_for("u-9");
        stale.user.full_name = Some("Old Owner".into());
        fx.manager.save_session(&stale.to_record()).await.unwrap();

        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();

        // Every field of the record belongs to the new user; nothing
        // was merged from the stale one.
        let record = fx.manager.load_session().await.unwrap();
        assert_eq!(record.auth_token.as_deref(), Some("tok-u-1"));
        assert_eq!(record.refresh_token.as_deref(), Some("ref-u-1"));
        let user = record.user.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "u-1@example.com");
        assert_eq!(user.full_name, None);
    }

    #[tokio::test]
    async fn sign_in_rejects_bad_credentials_locally() {
        let fx = fixture();
        fx.orchestrator.initialize().await;

        let err = fx.orchestrator.sign_in("not-an-email", "pw").await;
        assert!(matches!(err, Err(AuthError::Validation(_))));

        let err = fx.orchestrator.sign_in("ada@example.com", "short").await;
        assert!(matches!(err, Err(AuthError::Validation(_))));

        // Nothing was sent to the backend, state untouched.
        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_in_failure_restores_prior_state() {
        let fx = fixture();
        fx.orchestrator.initialize().await;
        *fx.backend.sign_in_error.lock().unwrap() =
            Some(BackendError::InvalidCredentials);

        let err = fx
            .orchestrator
            .sign_in("ada@example.com", "wrong-horse-battery")
            .await;

        assert!(matches!(
            err,
            Err(AuthError::Backend(BackendError::InvalidCredentials))
        ));
        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
        assert!(fx.manager.load_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_up_without_session_requires_verification() {
        let fx = fixture();
        fx.orchestrator.initialize().await;
        *fx.backend.sign_up_session.lock().unwrap() = Some(false);

        let result = fx
            .orchestrator
            .sign_up("new@example.com", "long-enough-pw", Some("New User"))
            .await
            .unwrap();

        assert!(result.requires_email_verification);
        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
        assert!(fx.manager.load_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_up_with_immediate_session_authenticates() {
        let fx = fixture();
        fx.orchestrator.initialize().await;

        let result = fx
            .orchestrator
            .sign_up("new@example.com", "long-enough-pw", None)
            .await
            .unwrap();

        assert!(!result.requires_email_verification);
        assert!(fx.orchestrator.is_authenticated());
        assert!(fx.manager.load_session().await.is_some());
    }

    #[tokio::test]
    async fn sign_out_clears_locally_even_when_backend_fails() {
        let fx = fixture();
        fx.orchestrator.initialize().await;
        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();
        *fx.backend.sign_out_error.lock().unwrap() =
            Some(BackendError::Network("offline".into()));

        fx.orchestrator.sign_out().await;

        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
        assert!(fx.manager.load_session().await.is_none());
        assert_eq!(fx.backend.sign_out_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.reset_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_sign_out_event_clears_local_state() {
        let fx = fixture();
        fx.orchestrator.initialize().await;
        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();

        fx.backend.events.send(SessionEvent::SignedOut).unwrap();
        settle().await;

        assert_eq!(fx.orchestrator.state(), AuthState::Unauthenticated);
        assert!(fx.manager.load_session().await.is_none());
        // Explicit sign-out hooks do not run for remote events.
        assert_eq!(fx.reset_count.load(Ordering::SeqCst), 0);
    }

    /// Memory store that yields before every operation, so state
    /// transitions interleaved with storage work stay observable on
    /// the watch channel.
    struct YieldStore(MemoryStore);

    #[async_trait::async_trait]
    impl basket_storage::KeyValueStore for YieldStore {
        async fn set_item(&self, key: &str, value: &str) -> basket_storage::StorageResult<()> {
            tokio::task::yield_now().await;
            self.0.set_item(key, value).await
        }

        async fn get_item(&self, key: &str) -> basket_storage::StorageResult<Option<String>> {
            tokio::task::yield_now().await;
            self.0.get_item(key).await
        }

        async fn remove_item(&self, key: &str) -> basket_storage::StorageResult<()> {
            tokio::task::yield_now().await;
            self.0.remove_item(key).await
        }

        async fn clear(&self) -> basket_storage::StorageResult<()> {
            tokio::task::yield_now().await;
            self.0.clear().await
        }
    }

    #[tokio::test]
    async fn pushed_events_pass_through_resolving() {
        let fx = fixture_with_store(Arc::new(YieldStore(MemoryStore::new())));
        fx.orchestrator.initialize().await;
        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();

        let mut rx = fx.orchestrator.subscribe();
        rx.borrow_and_update();
        let recorder = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let done = state == AuthState::Unauthenticated;
                seen.push(state);
                if done {
                    break;
                }
            }
            seen
        });

        fx.backend.events.send(SessionEvent::SignedOut).unwrap();
        let seen = recorder.await.unwrap();

        assert_eq!(seen.first(), Some(&AuthState::Resolving));
        assert_eq!(seen.last(), Some(&AuthState::Unauthenticated));
    }

    #[tokio::test]
    async fn refresh_event_replaces_persisted_tokens() {
        let fx = fixture();
        fx.orchestrator.initialize().await;
        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();

        let mut refreshed = MockBackend::session_for("u-1");
        refreshed.access_token = "tok-rotated".into();
        fx.backend
            .events
            .send(SessionEvent::Refreshed(refreshed))
            .unwrap();
        settle().await;

        let record = fx.manager.load_session().await.unwrap();
        assert_eq!(record.auth_token.as_deref(), Some("tok-rotated"));
        assert!(fx.orchestrator.is_authenticated());
    }

    #[tokio::test]
    async fn profile_refresh_upgrades_minimal_profile() {
        let fx = fixture();
        *fx.backend.profile_name.lock().unwrap() = Some("Ada Lovelace".into());
        fx.orchestrator.initialize().await;

        fx.orchestrator
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();
        settle().await;

        match fx.orchestrator.state() {
            AuthState::Authenticated(profile) => {
                assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
            }
            other => panic!("expected authenticated state, got {other:?}"),
        }
        let record = fx.manager.load_session().await.unwrap();
        assert_eq!(
            record.user.unwrap().full_name.as_deref(),
            Some("Ada Lovelace")
        );
    }
}
