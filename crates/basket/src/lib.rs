//! # basket
//!
//! The embedding surface for the Basket client engine. Applications
//! call [`Engine::start`] with a configuration and an auth backend and
//! get back rehydrated stores, a resolved auth state, and handles for
//! everything the UI layer needs.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       Engine                           │
//! │                                                        │
//! │  CartStore   WishlistStore   UiStore    AuthOrchestr.  │
//! │      │             │            │            │         │
//! │      └──────┬──────┴────────────┘     SessionManager   │
//! │             │                                │         │
//! │         FileStore                     SecureStorage    │
//! │        (state blobs)               (keyring + files)   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The focused crates underneath are re-exported so applications only
//! depend on this one:
//!
//! - `basket-core` (as `domain`): pure types (cart math, session records)
//! - `basket-storage`: key-value tiers and the secure facade
//! - `basket-state`: rehydrated stores with write-through persistence
//! - `basket-session`: session lifecycle and auth orchestration

pub mod config;
pub mod engine;
pub mod error;

pub use config::AppConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};

pub use basket_core as domain;
pub use basket_session as session;
pub use basket_state as state;
pub use basket_storage as storage;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=basket=trace` - Show trace for basket crates only
/// - Default: INFO level
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,basket=debug"));

    // try_init so embedding apps that installed their own subscriber
    // are left alone.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
