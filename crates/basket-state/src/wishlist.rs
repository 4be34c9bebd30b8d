//! # Wishlist Store
//!
//! Persisted wishlist: same store shape as the cart, over the membership
//! semantics of [`basket_core::Wishlist`].

use std::sync::{Arc, Mutex};

use basket_core::{NewWishlistItem, Wishlist, WishlistItem};
use basket_storage::KeyValueStore;
use tracing::{debug, warn};

use crate::persist::WriteThrough;

/// Durable-storage key for the wishlist blob.
pub const WISHLIST_STORAGE_KEY: &str = "basket-wishlist-storage";

/// Persisted, rehydrated wishlist.
pub struct WishlistStore {
    wishlist: Mutex<Wishlist>,
    persist: WriteThrough,
}

impl WishlistStore {
    /// Rehydrates from durable storage; missing or corrupt blobs fall
    /// back to an empty wishlist.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let wishlist = match kv.get_item(WISHLIST_STORAGE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<Wishlist>(&blob) {
                Ok(wishlist) => {
                    debug!(items = wishlist.len(), "wishlist rehydrated");
                    wishlist
                }
                Err(e) => {
                    warn!(error = %e, "wishlist blob corrupt, starting empty");
                    Wishlist::new()
                }
            },
            Ok(None) => Wishlist::new(),
            Err(e) => {
                warn!(error = %e, "wishlist blob unreadable, starting empty");
                Wishlist::new()
            }
        };

        Arc::new(WishlistStore {
            wishlist: Mutex::new(wishlist),
            persist: WriteThrough::spawn(kv, WISHLIST_STORAGE_KEY),
        })
    }

    /// Saves a product. No-op when already present.
    pub fn add_item(&self, item: NewWishlistItem) {
        self.mutate(|wl| wl.add_item(item));
    }

    /// Removes a product. No-op if absent.
    pub fn remove_item(&self, id: &str) {
        self.mutate(|wl| wl.remove_item(id));
    }

    /// Adds if absent, removes if present.
    pub fn toggle_item(&self, item: NewWishlistItem) {
        self.mutate(|wl| wl.toggle_item(item));
    }

    pub fn clear(&self) {
        self.mutate(Wishlist::clear);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.with_wishlist(|wl| wl.contains(id))
    }

    pub fn items(&self) -> Vec<WishlistItem> {
        self.with_wishlist(|wl| wl.items.clone())
    }

    pub fn len(&self) -> usize {
        self.with_wishlist(Wishlist::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with_wishlist(Wishlist::is_empty)
    }

    /// Executes a function with read access to the wishlist.
    pub fn with_wishlist<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Wishlist) -> R,
    {
        let wishlist = self.wishlist.lock().expect("wishlist mutex poisoned");
        f(&wishlist)
    }

    fn mutate(&self, f: impl FnOnce(&mut Wishlist)) {
        let mut wishlist = self.wishlist.lock().expect("wishlist mutex poisoned");
        f(&mut wishlist);
        // Submit under the lock so snapshot order equals publication
        // order.
        let blob =
            serde_json::to_string(&*wishlist).expect("wishlist serialization cannot fail");
        self.persist.submit(blob);
    }

    /// Waits until every mutation issued so far has reached storage.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }
}
