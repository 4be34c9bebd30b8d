//! # UI Store
//!
//! Toast queue, loading flags, and coarse display preferences.
//!
//! ## Persistence Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UiStore State                                    │
//! │                                                                         │
//! │  persisted (survives restart)      in-memory only (process lifetime)    │
//! │  ─────────────────────────────     ──────────────────────────────────   │
//! │  is_dark_mode                      toast queue                          │
//! │  font_size                         loading flags                        │
//! │                                                                         │
//! │  reset() clears the in-memory side and keeps the persisted side.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Toasts self-expire: `add_toast` schedules a removal after the toast's
//! duration, except duration 0, which means "until explicitly removed".
//!
//! Code that needs to enqueue a toast without a reference to the store
//! gets a [`ToastSender`] capability handle instead of a global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use basket_core::{FontSize, Toast, ToastKind, DEFAULT_TOAST_DURATION_MS};
use basket_storage::KeyValueStore;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::persist::WriteThrough;

/// Durable-storage key for the UI preferences blob.
pub const UI_STORAGE_KEY: &str = "basket-ui-storage";

/// The persisted subset of UI state. The toast queue and loading flags
/// are intentionally excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPrefs {
    pub is_dark_mode: bool,
    pub font_size: FontSize,
}

/// UI/toast state container.
pub struct UiStore {
    toasts: Mutex<Vec<Toast>>,
    loading: Mutex<HashMap<String, bool>>,
    prefs: Mutex<UiPrefs>,
    persist: WriteThrough,
    default_toast_duration_ms: u64,
}

impl UiStore {
    /// Rehydrates preferences from durable storage; the toast queue
    /// always starts empty.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Arc<Self> {
        Self::load_with_default_duration(kv, DEFAULT_TOAST_DURATION_MS).await
    }

    /// As [`UiStore::load`], with a configured default toast duration.
    pub async fn load_with_default_duration(
        kv: Arc<dyn KeyValueStore>,
        default_toast_duration_ms: u64,
    ) -> Arc<Self> {
        let prefs = match kv.get_item(UI_STORAGE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<UiPrefs>(&blob) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(error = %e, "UI prefs blob corrupt, using defaults");
                    UiPrefs::default()
                }
            },
            Ok(None) => UiPrefs::default(),
            Err(e) => {
                warn!(error = %e, "UI prefs blob unreadable, using defaults");
                UiPrefs::default()
            }
        };

        Arc::new(UiStore {
            toasts: Mutex::new(Vec::new()),
            loading: Mutex::new(HashMap::new()),
            prefs: Mutex::new(prefs),
            persist: WriteThrough::spawn(kv, UI_STORAGE_KEY),
            default_toast_duration_ms,
        })
    }

    // -------------------------------------------------------------------------
    // Toasts
    // -------------------------------------------------------------------------

    /// Enqueues a toast and schedules its removal after `duration_ms`
    /// (`None` uses the store default; 0 disables auto-removal).
    ///
    /// Returns the generated toast id.
    pub fn add_toast(
        self: &Arc<Self>,
        kind: ToastKind,
        message: impl Into<String>,
        duration_ms: Option<u64>,
    ) -> String {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(7)
            .map(char::from)
            .collect();
        let duration_ms = duration_ms.unwrap_or(self.default_toast_duration_ms);

        let toast = Toast {
            id: id.clone(),
            kind,
            message: message.into(),
            duration_ms,
        };
        self.toasts.lock().expect("ui mutex poisoned").push(toast);
        debug!(id = %id, %kind, duration_ms, "toast queued");

        if duration_ms != 0 {
            // The timer holds only a weak reference: a dropped store
            // stops its timers instead of being kept alive by them.
            let store = Arc::downgrade(self);
            let timer_id = id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(duration_ms)).await;
                if let Some(store) = Weak::upgrade(&store) {
                    store.remove_toast(&timer_id);
                }
            });
        }

        id
    }

    /// Removes a toast by id. No-op if already gone.
    pub fn remove_toast(&self, id: &str) {
        self.toasts
            .lock()
            .expect("ui mutex poisoned")
            .retain(|t| t.id != id);
    }

    pub fn clear_toasts(&self) {
        self.toasts.lock().expect("ui mutex poisoned").clear();
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().expect("ui mutex poisoned").clone()
    }

    /// Returns a clonable handle for enqueueing toasts from code that
    /// has no reference to the store.
    pub fn toast_sender(self: &Arc<Self>) -> ToastSender {
        let (tx, mut rx) = mpsc::unbounded_channel::<ToastRequest>();
        let store = Arc::downgrade(self);

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                let Some(store) = Weak::upgrade(&store) else {
                    break;
                };
                store.add_toast(req.kind, req.message, req.duration_ms);
            }
        });

        ToastSender { tx }
    }

    // -------------------------------------------------------------------------
    // Loading flags
    // -------------------------------------------------------------------------

    pub fn set_loading(&self, key: impl Into<String>, is_loading: bool) {
        self.loading
            .lock()
            .expect("ui mutex poisoned")
            .insert(key.into(), is_loading);
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading
            .lock()
            .expect("ui mutex poisoned")
            .get(key)
            .copied()
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Preferences (the persisted subset)
    // -------------------------------------------------------------------------

    pub fn is_dark_mode(&self) -> bool {
        self.prefs.lock().expect("ui mutex poisoned").is_dark_mode
    }

    pub fn toggle_dark_mode(&self) {
        self.mutate_prefs(|p| p.is_dark_mode = !p.is_dark_mode);
    }

    pub fn set_dark_mode(&self, is_dark: bool) {
        self.mutate_prefs(|p| p.is_dark_mode = is_dark);
    }

    pub fn font_size(&self) -> FontSize {
        self.prefs.lock().expect("ui mutex poisoned").font_size
    }

    pub fn set_font_size(&self, size: FontSize) {
        self.mutate_prefs(|p| p.font_size = size);
    }

    fn mutate_prefs(&self, f: impl FnOnce(&mut UiPrefs)) {
        let mut prefs = self.prefs.lock().expect("ui mutex poisoned");
        f(&mut prefs);
        // Submit under the lock so snapshot order equals publication
        // order.
        let blob = serde_json::to_string(&*prefs).expect("prefs serialization cannot fail");
        self.persist.submit(blob);
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    /// Clears toasts and loading flags. Dark mode and font size are the
    /// only fields that survive.
    pub fn reset(&self) {
        self.clear_toasts();
        self.loading.lock().expect("ui mutex poisoned").clear();
    }

    /// Waits until every preference change issued so far has reached
    /// storage.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }
}

struct ToastRequest {
    kind: ToastKind,
    message: String,
    duration_ms: Option<u64>,
}

/// Clonable capability for enqueueing toasts.
///
/// Replaces the "module-level dispatch variable" pattern: create one at
/// process start and hand it to whatever needs it.
#[derive(Clone)]
pub struct ToastSender {
    tx: mpsc::UnboundedSender<ToastRequest>,
}

impl ToastSender {
    /// Enqueues a toast. Silently dropped when the store is gone.
    pub fn send(&self, kind: ToastKind, message: impl Into<String>, duration_ms: Option<u64>) {
        let _ = self.tx.send(ToastRequest {
            kind,
            message: message.into(),
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_storage::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_removes_after_duration() {
        let kv = Arc::new(MemoryStore::new());
        let store = UiStore::load(kv).await;

        store.add_toast(ToastKind::Info, "saved", Some(500));
        assert_eq!(store.toasts().len(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_duration_zero_never_auto_removes() {
        let kv = Arc::new(MemoryStore::new());
        let store = UiStore::load(kv).await;

        let id = store.add_toast(ToastKind::Error, "offline", Some(0));

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(store.toasts().len(), 1);

        store.remove_toast(&id);
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_duration_applies_when_unspecified() {
        let kv = Arc::new(MemoryStore::new());
        let store = UiStore::load(kv).await;

        store.add_toast(ToastKind::Success, "added to cart", None);
        tokio::time::sleep(Duration::from_millis(DEFAULT_TOAST_DURATION_MS + 100)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_sender_enqueues() {
        let kv = Arc::new(MemoryStore::new());
        let store = UiStore::load(kv).await;
        let sender = store.toast_sender();

        sender.send(ToastKind::Warning, "low stock", Some(0));
        // paused clock: the sleep yields until the pump task has drained
        tokio::time::sleep(Duration::from_millis(1)).await;

        let toasts = store.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "low stock");
    }

    #[tokio::test]
    async fn test_prefs_roundtrip_and_reset_keeps_them() {
        let kv = Arc::new(MemoryStore::new());

        let store = UiStore::load(kv.clone()).await;
        store.set_dark_mode(true);
        store.set_font_size(FontSize::Large);
        store.add_toast(ToastKind::Info, "hello", Some(0));
        store.set_loading("checkout", true);

        store.reset();
        assert!(store.toasts().is_empty());
        assert!(!store.is_loading("checkout"));
        assert!(store.is_dark_mode());
        assert_eq!(store.font_size(), FontSize::Large);

        store.flush().await;
        drop(store);

        let reloaded = UiStore::load(kv.clone()).await;
        assert!(reloaded.is_dark_mode());
        assert_eq!(reloaded.font_size(), FontSize::Large);

        // the persisted blob is exactly the prefs subset
        let blob = kv.get_item(UI_STORAGE_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert!(value.get("isDarkMode").is_some());
        assert!(value.get("toasts").is_none());
    }
}
