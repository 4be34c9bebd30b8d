//! # basket-state: Persisted State Containers
//!
//! The three reactive stores the app reads and mutates: cart, wishlist,
//! and UI. Each pairs an in-memory state tree with a write-through to its
//! own durable-storage namespace.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Persisted Store Pattern                             │
//! │                                                                         │
//! │  caller ──► synchronous mutation ──► in-memory state (source of truth)  │
//! │                     │                                                   │
//! │                     └──► serialize persisted subset                     │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                     WriteThrough (single-slot, latest wins)             │
//! │                              │                                          │
//! │                              ▼  async, eventually consistent           │
//! │                     durable key-value namespace                         │
//! │                                                                         │
//! │  startup ──► load() ── read blob ── parse ── merge into defaults        │
//! │              (corrupt/missing blob falls back to defaults, logged)      │
//! │                                                                         │
//! │  OWNERSHIP: each store writes exactly one key; no key is shared.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`persist`] - Single-slot write-through queue
//! - [`cart`] - Cart store
//! - [`wishlist`] - Wishlist store
//! - [`ui`] - Toast queue + display preferences, and the `ToastSender`
//!   capability handle

pub mod cart;
pub mod persist;
pub mod ui;
pub mod wishlist;

pub use cart::CartStore;
pub use persist::WriteThrough;
pub use ui::{ToastSender, UiPrefs, UiStore};
pub use wishlist::WishlistStore;
