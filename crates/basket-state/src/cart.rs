//! # Cart Store
//!
//! In-memory cart behind a mutex, with every mutation scheduling a
//! write-through of the `{ "items": [...] }` blob to the cart namespace.
//!
//! ## Thread Safety
//! The cart is wrapped in a `Mutex` because mutations from concurrent
//! tasks must apply one at a time against the then-current state.
//! Read accessors also take the lock but release it quickly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use basket_core::{Cart, CartItem, NewCartItem};
use basket_storage::KeyValueStore;
use tracing::{debug, warn};

use crate::persist::WriteThrough;

/// Durable-storage key for the cart blob. Stable across versions so
/// upgrades rehydrate without migration.
pub const CART_STORAGE_KEY: &str = "basket-cart-storage";

/// Persisted, rehydrated shopping cart.
pub struct CartStore {
    cart: Mutex<Cart>,
    /// Product id of the most-recently-added line (UI highlight).
    last_added: Mutex<Option<String>>,
    /// Whether the cart panel is open. In-memory only.
    open: AtomicBool,
    persist: WriteThrough,
}

impl CartStore {
    /// Rehydrates the cart from durable storage. A missing or corrupt
    /// blob falls back to an empty cart; rehydration never fails.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let cart = match kv.get_item(CART_STORAGE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<Cart>(&blob) {
                Ok(cart) => {
                    debug!(lines = cart.line_count(), "cart rehydrated");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "cart blob corrupt, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "cart blob unreadable, starting empty");
                Cart::new()
            }
        };

        Arc::new(CartStore {
            cart: Mutex::new(cart),
            last_added: Mutex::new(None),
            open: AtomicBool::new(false),
            persist: WriteThrough::spawn(kv, CART_STORAGE_KEY),
        })
    }

    /// Adds a product (or increments its existing line) and marks it as
    /// the last-added line.
    pub fn add_item(&self, item: NewCartItem) {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        let product_id = cart.add_item(item);
        *self.last_added.lock().expect("cart mutex poisoned") = Some(product_id);
        // Submit under the lock: snapshot order must equal publication
        // order, or a stale snapshot could end up durable.
        self.persist.submit(snapshot(&cart));
    }

    /// Removes a product's line. No-op if absent.
    pub fn remove_item(&self, product_id: &str) {
        self.mutate(|cart| cart.remove_item(product_id));
    }

    /// Sets a line's quantity; `quantity <= 0` removes the line.
    pub fn update_quantity(&self, product_id: &str, quantity: i64) {
        self.mutate(|cart| cart.update_quantity(product_id, quantity));
    }

    pub fn increment_quantity(&self, product_id: &str) {
        self.mutate(|cart| cart.increment_quantity(product_id));
    }

    /// Decrements a line; at quantity 1 the line is removed.
    pub fn decrement_quantity(&self, product_id: &str) {
        self.mutate(|cart| cart.decrement_quantity(product_id));
    }

    /// Empties the cart (checkout completion, or sign-out when the
    /// engine is configured to reset it).
    pub fn clear(&self) {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        cart.clear();
        *self.last_added.lock().expect("cart mutex poisoned") = None;
        self.persist.submit(snapshot(&cart));
    }

    fn mutate(&self, f: impl FnOnce(&mut Cart)) {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        f(&mut cart);
        self.persist.submit(snapshot(&cart));
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.with_cart(|c| c.items.clone())
    }

    pub fn total_items(&self) -> u64 {
        self.with_cart(Cart::total_items)
    }

    pub fn total_price_cents(&self) -> i64 {
        self.with_cart(Cart::total_price_cents)
    }

    pub fn is_empty(&self) -> bool {
        self.with_cart(Cart::is_empty)
    }

    /// Product id of the most-recently-added line, if any.
    pub fn last_added(&self) -> Option<String> {
        self.last_added.lock().expect("cart mutex poisoned").clone()
    }

    /// Whether the cart panel is open. Never persisted; a restart
    /// always starts with the panel closed.
    pub fn is_cart_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    pub fn set_cart_open(&self, open: bool) {
        self.open.store(open, Ordering::Relaxed);
    }

    /// Waits until every mutation issued so far has reached storage.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }
}

fn snapshot(cart: &Cart) -> String {
    // Cart serialization is infallible: plain structs, string keys.
    serde_json::to_string(cart).expect("cart serialization cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_storage::MemoryStore;

    fn apples() -> NewCartItem {
        NewCartItem {
            product_id: "p1".to_string(),
            name: "Apples".to_string(),
            price_cents: 100,
            discounted_price_cents: None,
            image: "apples.png".to_string(),
            unit: "kg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_twice_single_line_quantity_two() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::load(kv).await;

        store.add_item(apples());
        store.add_item(apples());

        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price_cents(), 200);
        assert_eq!(store.with_cart(|c| c.line_count()), 1);
        assert_eq!(store.last_added().as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_roundtrip_through_fresh_store() {
        let kv = Arc::new(MemoryStore::new());

        let store = CartStore::load(kv.clone()).await;
        store.add_item(apples());
        store.increment_quantity("p1");
        store.flush().await;
        drop(store);

        let reloaded = CartStore::load(kv).await;
        assert_eq!(reloaded.total_items(), 2);
        let items = reloaded.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "p1");
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes_line() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::load(kv).await;

        store.add_item(apples());
        store.decrement_quantity("p1");

        assert_eq!(store.total_items(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_blob_rehydrates_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set_item(CART_STORAGE_KEY, "{not json").await.unwrap();

        let store = CartStore::load(kv).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_blob_with_unknown_fields_rehydrates() {
        // A future app version may persist extra fields; they are ignored.
        let kv = Arc::new(MemoryStore::new());
        let blob = r#"{"items":[{"id":"l1","productId":"p1","name":"Apples",
            "priceCents":100,"discountedPriceCents":null,"image":"a.png",
            "unit":"kg","quantity":3,"addedAt":"2025-01-01T00:00:00Z"}],
            "futureField":true}"#;
        kv.set_item(CART_STORAGE_KEY, blob).await.unwrap();

        let store = CartStore::load(kv).await;
        assert_eq!(store.total_items(), 3);
    }

    #[tokio::test]
    async fn test_cart_open_flag_is_not_persisted() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::load(kv.clone()).await;

        assert!(!store.is_cart_open());
        store.set_cart_open(true);
        store.add_item(apples());
        assert!(store.is_cart_open());
        store.flush().await;
        drop(store);

        let reloaded = CartStore::load(kv).await;
        assert_eq!(reloaded.total_items(), 1);
        assert!(!reloaded.is_cart_open());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_mutations_persist_final_state() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::load(kv.clone()).await;

        // Concurrent adders: the durable blob must end up equal to the
        // in-memory state, never a stale intermediate snapshot.
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    store.add_item(apples());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        store.flush().await;

        assert_eq!(store.total_items(), 200);
        let reloaded = CartStore::load(kv).await;
        assert_eq!(reloaded.total_items(), 200);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::load(kv.clone()).await;

        store.add_item(apples());
        store.clear();
        store.flush().await;

        let reloaded = CartStore::load(kv).await;
        assert!(reloaded.is_empty());
        assert!(reloaded.last_added().is_none());
    }
}
