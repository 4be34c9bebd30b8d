//! # basket-core: Pure Domain Logic for Basket
//!
//! This crate is the **heart** of the Basket data engine. It contains the
//! cart, wishlist, and session domain logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   App / UI layer (external)                     │   │
//! │  │    Product screens ──► Cart UI ──► Checkout ──► Settings       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              basket-state / basket-session                      │   │
//! │  │    persisted stores, session manager, auth orchestrator         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │ wishlist  │  │  session  │  │ validation│  │   │
//! │  │   │   Cart    │  │ Wishlist  │  │  Session  │  │   rules   │  │   │
//! │  │   │ CartItem  │  │   Item    │  │  Record   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart collection with uniqueness and quantity invariants
//! - [`wishlist`] - Membership-keyed wishlist with toggle semantics
//! - [`session`] - Session record, user profile, validity queries
//! - [`ui`] - Toast and UI preference types
//! - [`error`] - Domain error types
//! - [`validation`] - Per-field input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every operation is deterministic given its inputs
//! 2. **No I/O**: Storage and network access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

pub mod cart;
pub mod error;
pub mod session;
pub mod ui;
pub mod validation;
pub mod wishlist;

// Re-exports for convenience, so users can do `use basket_core::Cart`
// instead of `use basket_core::cart::Cart`.
pub use cart::{Cart, CartItem, NewCartItem};
pub use error::{CoreError, ValidationError};
pub use session::{Preferences, SessionRecord, UserProfile};
pub use ui::{FontSize, Toast, ToastKind};
pub use wishlist::{NewWishlistItem, Wishlist, WishlistItem};

/// Default toast lifetime in milliseconds when the caller does not pick one.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;
