//! End-to-end engine tests: startup, persistence across restarts, and
//! the sign-in/sign-out wiring between stores and the orchestrator.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use basket::session::{
    AuthBackend, AuthSession, AuthUser, BackendError, SessionEvent, SignUpOutcome,
};
use basket::{AppConfig, Engine};
use basket_core::cart::NewCartItem;
use basket_core::ui::ToastKind;
use basket_core::session::UserProfile;
use basket_core::wishlist::NewWishlistItem;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;

/// In-memory backend with a single scripted account.
struct FakeBackend {
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl FakeBackend {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            session: Mutex::new(None),
            events,
        })
    }

    fn session() -> AuthSession {
        AuthSession {
            access_token: "tok-1".into(),
            refresh_token: Some("ref-1".into()),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: "u-1".into(),
                email: "ada@example.com".into(),
                full_name: Some("Ada Lovelace".into()),
            },
        }
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthSession, BackendError> {
        if email != "ada@example.com" {
            return Err(BackendError::InvalidCredentials);
        }
        let session = Self::session();
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let session = Self::session();
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, BackendError> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn set_session(
        &self,
        _access_token: &str,
        _refresh_token: Option<&str>,
    ) -> Result<Option<AuthSession>, BackendError> {
        let session = Self::session();
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(Some(session))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, _user_id: &str) -> Result<Option<UserProfile>, BackendError> {
        Ok(None)
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

fn config_in(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = Some(dir.to_path_buf());
    // No OS keyring in the test environment.
    config.storage.plain_only = true;
    config
}

fn bananas() -> NewCartItem {
    NewCartItem {
        product_id: "p-bananas".into(),
        name: "Bananas".into(),
        price_cents: 149,
        discounted_price_cents: None,
        image: "bananas.png".into(),
        unit: "bunch".into(),
    }
}

#[tokio::test]
async fn fresh_start_is_empty_and_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
        .await
        .unwrap();

    assert!(engine.cart().is_empty());
    assert!(engine.wishlist().is_empty());
    assert!(engine.auth().is_ready());
    assert!(!engine.auth().is_authenticated());
}

#[tokio::test]
async fn cart_and_wishlist_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
            .await
            .unwrap();
        engine.cart().add_item(bananas());
        engine.cart().add_item(bananas());
        engine.wishlist().add_item(NewWishlistItem {
            id: "p-mango".into(),
            name: "Mango".into(),
            price_cents: 299,
            discounted_price_cents: Some(249),
            image: "mango.png".into(),
            unit: "each".into(),
        });
        engine.shutdown().await;
    }

    let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
        .await
        .unwrap();
    assert_eq!(engine.cart().total_items(), 2);
    assert_eq!(engine.cart().items()[0].name, "Bananas");
    assert!(engine.wishlist().contains("p-mango"));
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
            .await
            .unwrap();
        engine
            .auth()
            .sign_in("ada@example.com", "correct-horse")
            .await
            .unwrap();
        engine.shutdown().await;
    }

    let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
        .await
        .unwrap();
    assert!(engine.auth().is_authenticated());
    assert!(engine.session().is_session_valid().await);
}

#[tokio::test]
async fn sign_out_keeps_cart_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
        .await
        .unwrap();

    engine
        .auth()
        .sign_in("ada@example.com", "correct-horse")
        .await
        .unwrap();
    engine.cart().add_item(bananas());
    engine.auth().sign_out().await;

    assert!(!engine.auth().is_authenticated());
    assert!(engine.session().load_session().await.is_none());
    // A guest cart survives the sign-out.
    assert_eq!(engine.cart().total_items(), 1);
}

#[tokio::test]
async fn sign_out_clears_stores_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.behavior.clear_cart_on_sign_out = true;
    config.behavior.clear_wishlist_on_sign_out = true;
    let engine = Engine::start(config, FakeBackend::new()).await.unwrap();

    engine
        .auth()
        .sign_in("ada@example.com", "correct-horse")
        .await
        .unwrap();
    engine.cart().add_item(bananas());
    engine.wishlist().add_item(NewWishlistItem {
        id: "p-mango".into(),
        name: "Mango".into(),
        price_cents: 299,
        discounted_price_cents: None,
        image: "mango.png".into(),
        unit: "each".into(),
    });
    engine.auth().sign_out().await;

    assert!(engine.cart().is_empty());
    assert!(engine.wishlist().is_empty());
}

#[tokio::test]
async fn toast_duration_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.behavior.default_toast_duration_ms = 1500;
    let engine = Engine::start(config, FakeBackend::new()).await.unwrap();

    engine.ui().add_toast(ToastKind::Success, "Added to cart", None);

    let toasts = engine.ui().toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].duration_ms, 1500);
}

#[tokio::test]
async fn route_guard_uses_configured_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.guard.protected_prefixes = vec!["/members".into()];
    let engine = Engine::start(config, FakeBackend::new()).await.unwrap();

    assert!(engine.guard().is_protected("/members/area"));
    assert!(!engine.guard().is_protected("/checkout"));
}

#[tokio::test]
async fn legacy_session_keys_migrate_on_start() {
    use basket::storage::{FileStore, KeyValueStore};

    let dir = tempfile::tempdir().unwrap();
    let expiry = (Utc::now() + Duration::hours(1)).timestamp_millis();

    // Seed the pre-blob key layout directly into the session store.
    let session_files = FileStore::new(dir.path().join("session"));
    session_files
        .set_item("basket_auth_token", "legacy-tok")
        .await
        .unwrap();
    session_files
        .set_item("basket_refresh_token", "legacy-ref")
        .await
        .unwrap();
    session_files
        .set_item("basket_session_expiry", &expiry.to_string())
        .await
        .unwrap();
    session_files
        .set_item(
            "basket_user_data",
            r#"{"id":"u-legacy","email":"legacy@example.com"}"#,
        )
        .await
        .unwrap();

    let engine = Engine::start(config_in(dir.path()), FakeBackend::new())
        .await
        .unwrap();

    // The migrated record is picked up by the startup resolution.
    assert!(engine.auth().is_authenticated());
    let record = engine.session().load_session().await.unwrap();
    assert_eq!(record.auth_token.as_deref(), Some("legacy-tok"));
    assert!(
        session_files
            .get_item("basket_auth_token")
            .await
            .unwrap()
            .is_none(),
        "legacy keys should be deleted after migration"
    );
}
