//! # Wishlist
//!
//! The wishlist collection. Unlike the cart, which keys lines by a locally
//! generated line-item id, the wishlist key space *is* the product key
//! space: an item's `id` equals the product id, and membership is the only
//! state a product has here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved product in the wishlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WishlistItem {
    /// Product id (the wishlist key).
    pub id: String,

    pub name: String,
    pub price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub image: String,
    pub unit: String,

    /// When the product was saved. Serialized as integer milliseconds so
    /// blobs persisted by older app versions keep loading.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date_added: DateTime<Utc>,
}

impl Default for WishlistItem {
    fn default() -> Self {
        WishlistItem {
            id: String::new(),
            name: String::new(),
            price_cents: 0,
            discounted_price_cents: None,
            image: String::new(),
            unit: String::new(),
            date_added: Utc::now(),
        }
    }
}

/// Fields supplied by the caller when saving a product; `date_added` is
/// stamped by the wishlist on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItem {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub image: String,
    pub unit: String,
}

/// The wishlist.
///
/// ## Invariants
/// - Items are unique by `id`
/// - Toggling a present item removes it; toggling an absent item adds it
///   with `date_added = now`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wishlist {
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    pub fn new() -> Self {
        Wishlist::default()
    }

    /// Saves a product. No-op when already present: the existing entry
    /// keeps its `date_added` (no refresh).
    pub fn add_item(&mut self, item: NewWishlistItem) {
        if self.contains(&item.id) {
            return;
        }

        self.items.push(WishlistItem {
            id: item.id,
            name: item.name,
            price_cents: item.price_cents,
            discounted_price_cents: item.discounted_price_cents,
            image: item.image,
            unit: item.unit,
            date_added: Utc::now(),
        });
    }

    /// Removes a product. No-op if absent.
    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    /// Membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Adds the product if absent, removes it if present.
    ///
    /// Toggling twice returns the wishlist to its prior membership state
    /// (`date_added` may differ after an add/remove/add cycle).
    pub fn toggle_item(&mut self, item: NewWishlistItem) {
        if self.contains(&item.id) {
            self.remove_item(&item.id);
        } else {
            self.add_item(item);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
