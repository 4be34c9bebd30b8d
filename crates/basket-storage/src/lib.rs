//! # basket-storage: Durable Key-Value Storage
//!
//! Every persisted byte in Basket goes through this crate.
//!
//! ## Storage Tiers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storage Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      SecureStorage (facade)                      │  │
//! │  │                                                                  │  │
//! │  │   per-call availability probe                                    │  │
//! │  │        │                                                         │  │
//! │  │        ├── probe ok ───► KeyringStore (OS-encrypted)             │  │
//! │  │        │                                                         │  │
//! │  │        └── probe fail ─► FileStore    (plain, transparent)       │  │
//! │  │                                                                  │  │
//! │  │   Used by: SessionManager (and nothing else)                     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      KeyValueStore (trait)                       │  │
//! │  │                                                                  │  │
//! │  │   FileStore ──── cart / wishlist / UI persisted blobs            │  │
//! │  │   MemoryStore ── tests, ephemeral runs                           │  │
//! │  │   KeyringStore ─ secure tier backing                             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  OWNERSHIP: each store owns exclusive write access to its namespace;    │
//! │  no two stores ever write the same key.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`kv`] - The four-method `KeyValueStore` trait
//! - [`file`] - Plain persistent file-per-key store
//! - [`memory`] - In-memory store for tests and ephemeral use
//! - [`keyring`] - OS credential-store backing
//! - [`secure`] - Probing facade with plain-storage fallback
//! - [`error`] - Storage error types

pub mod error;
pub mod file;
pub mod keyring;
pub mod kv;
pub mod memory;
pub mod secure;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use keyring::KeyringStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use secure::SecureStorage;
