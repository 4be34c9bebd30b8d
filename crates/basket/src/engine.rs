//! Engine startup and wiring.
//!
//! ```text
//! Engine::start(config, backend)
//!     │
//!     ├─ 1. Build storage tiers
//!     │      keyring + file fallback ──> SecureStorage (session)
//!     │      file store ──────────────> cart / wishlist / ui blobs
//!     │
//!     ├─ 2. Migrate legacy session keys (one-time)
//!     │
//!     ├─ 3. Rehydrate persisted stores
//!     │      CartStore, WishlistStore, UiStore
//!     │
//!     ├─ 4. Wire the auth orchestrator
//!     │      sign-out reset hooks per config
//!     │
//!     └─ 5. Resolve the session (initialize)
//! ```
//!
//! After `start` returns, every store is loaded and the auth state has
//! completed its first resolution (or is about to, if the cached
//! session fast path was taken).

use std::sync::Arc;

use basket_session::{
    AuthBackend, AuthOrchestrator, ProfileStore, ResetOnSignOut, RouteGuard, SessionManager,
};
use basket_state::{CartStore, ToastSender, UiStore, WishlistStore};
use basket_storage::{FileStore, KeyringStore, SecureStorage};
use tracing::info;

use crate::config::AppConfig;
use crate::error::EngineResult;

/// Namespace prefix for session entries in the OS keyring.
const SESSION_NAMESPACE: &str = "session";

/// The assembled application engine.
pub struct Engine {
    config: AppConfig,
    cart: Arc<CartStore>,
    wishlist: Arc<WishlistStore>,
    ui: Arc<UiStore>,
    manager: Arc<SessionManager>,
    profiles: Arc<ProfileStore>,
    auth: Arc<AuthOrchestrator>,
    guard: RouteGuard,
}

impl Engine {
    /// Build every store, run migrations, and resolve the session.
    pub async fn start(config: AppConfig, backend: Arc<dyn AuthBackend>) -> EngineResult<Engine> {
        let data_dir = config.resolve_data_dir()?;
        info!(?data_dir, "starting engine");

        // Persisted state blobs always live in the plain file store;
        // only the session record goes through the secure tier.
        let files: Arc<FileStore> = Arc::new(FileStore::new(data_dir.join("state")));
        let session_files = Arc::new(FileStore::new(data_dir.join("session")));
        let secure = if config.storage.plain_only {
            SecureStorage::plain_only(session_files)
        } else {
            let keyring = Arc::new(KeyringStore::new(
                config.storage.keyring_service.clone(),
                SESSION_NAMESPACE,
            ));
            SecureStorage::new(keyring, session_files)
        };

        let manager = Arc::new(SessionManager::new(secure));
        manager.migrate_legacy_keys().await;

        let cart = CartStore::load(files.clone()).await;
        let wishlist = WishlistStore::load(files.clone()).await;
        let ui = UiStore::load_with_default_duration(
            files.clone(),
            config.behavior.default_toast_duration_ms,
        )
        .await;

        // Toast queue and loading flags never survive a sign-out;
        // cart and wishlist clearing is an explicit opt-in.
        let mut resets: Vec<Arc<dyn ResetOnSignOut>> = Vec::new();
        {
            let ui = ui.clone();
            resets.push(Arc::new(move || ui.reset()));
        }
        if config.behavior.clear_cart_on_sign_out {
            let cart = cart.clone();
            resets.push(Arc::new(move || cart.clear()));
        }
        if config.behavior.clear_wishlist_on_sign_out {
            let wishlist = wishlist.clone();
            resets.push(Arc::new(move || wishlist.clear()));
        }

        let profiles = ProfileStore::new(backend.clone());
        let auth = AuthOrchestrator::new(backend, manager.clone(), profiles.clone(), resets);
        auth.initialize().await;

        let guard = RouteGuard::new(config.guard.protected_prefixes.clone());

        Ok(Engine {
            config,
            cart,
            wishlist,
            ui,
            manager,
            profiles,
            auth,
            guard,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn wishlist(&self) -> &Arc<WishlistStore> {
        &self.wishlist
    }

    pub fn ui(&self) -> &Arc<UiStore> {
        &self.ui
    }

    /// A cloneable handle for emitting toasts from anywhere.
    pub fn toast_sender(&self) -> ToastSender {
        self.ui.toast_sender()
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    pub fn auth(&self) -> &Arc<AuthOrchestrator> {
        &self.auth
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Wait until every pending store write has reached disk.
    pub async fn flush(&self) {
        self.cart.flush().await;
        self.wishlist.flush().await;
        self.ui.flush().await;
    }

    /// Flush pending writes and stop background listeners.
    pub async fn shutdown(&self) {
        self.flush().await;
        self.auth.shutdown();
        info!("engine stopped");
    }
}
