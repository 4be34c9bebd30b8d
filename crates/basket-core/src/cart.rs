//! # Cart
//!
//! The shopping cart collection and its line items.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  User Action              Operation                Cart Change          │
//! │  ───────────              ─────────                ───────────          │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ────────────► qty += 1 or insert  │
//! │                                                                         │
//! │  Stepper "+" ───────────► increment_quantity() ──► qty += 1            │
//! │                                                                         │
//! │  Stepper "-" ───────────► decrement_quantity() ──► qty -= 1,           │
//! │                                                    removed at qty 1    │
//! │                                                                         │
//! │  Type quantity ─────────► update_quantity(n) ────► qty = n,            │
//! │                                                    n <= 0 removes      │
//! │                                                                         │
//! │  Tap remove ────────────► remove_item() ─────────► line deleted        │
//! │                                                                         │
//! │  Checkout done ─────────► clear() ───────────────► empty cart          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item in the shopping cart.
///
/// ## Design Notes
/// - `id`: locally generated line-item id, stable for the line's lifetime
/// - `product_id`: reference into the remote product catalog (not owned here)
/// - Display fields (`name`, prices, `image`, `unit`) are frozen copies of
///   the product data at the time of adding, so the cart keeps rendering
///   consistently even if the catalog entry changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItem {
    /// Line-item id (UUID v4), generated when the line is inserted.
    pub id: String,

    /// Product id in the remote catalog.
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in cents at time of adding (frozen)
    pub price_cents: i64,

    /// Discounted price in cents, when a promotion applied at add time
    pub discounted_price_cents: Option<i64>,

    /// Product image URL
    pub image: String,

    /// Sale unit (e.g., "kg", "500 g", "1 pc")
    pub unit: String,

    /// Quantity in cart. Always >= 1; reaching zero deletes the line.
    pub quantity: u32,

    /// When this line was added to the cart
    pub added_at: DateTime<Utc>,
}

impl Default for CartItem {
    fn default() -> Self {
        CartItem {
            id: String::new(),
            product_id: String::new(),
            name: String::new(),
            price_cents: 0,
            discounted_price_cents: None,
            image: String::new(),
            unit: String::new(),
            quantity: 1,
            added_at: Utc::now(),
        }
    }
}

impl CartItem {
    /// The price used for totals: discounted price when present,
    /// regular price otherwise.
    pub fn effective_price_cents(&self) -> i64 {
        self.discounted_price_cents.unwrap_or(self.price_cents)
    }

    /// Line total in cents (effective price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.effective_price_cents() * i64::from(self.quantity)
    }
}

/// Fields supplied by the caller when adding a product to the cart.
///
/// The line id and quantity are owned by the cart: the id is generated on
/// insert and the quantity starts at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub image: String,
    pub unit: String,
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increments its quantity instead of duplicating the line)
/// - No line has quantity <= 0 (reaching zero deletes the line)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cart {
    /// Lines in the cart.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product to the cart, or increments its quantity when the
    /// product already has a line.
    ///
    /// ## Returns
    /// The product id of the affected line (the "last added" marker the
    /// UI highlights).
    pub fn add_item(&mut self, item: NewCartItem) -> String {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.product_id == item.product_id)
        {
            line.quantity += 1;
            return line.product_id.clone();
        }

        let product_id = item.product_id.clone();
        self.items.push(CartItem {
            id: Uuid::new_v4().to_string(),
            product_id: item.product_id,
            name: item.name,
            price_cents: item.price_cents,
            discounted_price_cents: item.discounted_price_cents,
            image: item.image,
            unit: item.unit,
            quantity: 1,
            added_at: Utc::now(),
        });
        product_id
    }

    /// Removes the line for a product. No-op (not an error) if absent.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|l| l.product_id != product_id);
    }

    /// Sets the quantity of a product's line.
    ///
    /// ## Behavior
    /// - `quantity <= 0` behaves exactly like [`Cart::remove_item`]
    /// - quantities beyond `u32::MAX` saturate rather than wrap
    /// - unknown product id is a no-op
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Increments the quantity of a product's line by one.
    pub fn increment_quantity(&mut self, product_id: &str) {
        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += 1;
        }
    }

    /// Decrements the quantity of a product's line by one.
    ///
    /// A line at quantity 1 is removed instead of going to 0, preserving
    /// the "no line has quantity <= 0" invariant.
    pub fn decrement_quantity(&mut self, product_id: &str) {
        let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) else {
            return;
        };

        if line.quantity <= 1 {
            self.remove_item(product_id);
        } else {
            line.quantity -= 1;
        }
    }

    /// Clears all lines (checkout completion, or sign-out when configured).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total quantity across all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Cart total in cents: sum of effective price × quantity per line.
    pub fn total_price_cents(&self) -> i64 {
        self.items.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|l| l.product_id == product_id)
    }
}
