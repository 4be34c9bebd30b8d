//! # basket-session
//!
//! Session lifecycle for the Basket client. This crate decides one
//! question for the rest of the application: *who is signed in right
//! now?* Everything else (carts, wishlists, preferences) keys off that
//! answer.
//!
//! ```text
//!                      +------------------+
//!   credentials ------>|                  |----> AuthState (watch)
//!   backend events --->| AuthOrchestrator |----> ProfileStore
//!                      |                  |----> reset hooks
//!                      +--------+---------+
//!                               |
//!                      +--------v---------+
//!                      |  SessionManager  |  durable session record
//!                      +--------+---------+
//!                               |
//!                      +--------v---------+
//!                      |  SecureStorage   |  keyring or plain file
//!                      +------------------+
//! ```
//!
//! ## Layers
//!
//! - [`AuthBackend`] is the seam to the remote identity provider. The
//!   orchestrator only ever talks to this trait, so tests swap in a
//!   mock and the facade crate wires in the real thing.
//! - [`SessionManager`] persists a single JSON session record through
//!   `basket_storage::SecureStorage` and absorbs every read-side
//!   failure: a corrupt or inconsistent record loads as "no session",
//!   never as an error.
//! - [`AuthOrchestrator`] runs the startup resolution sequence,
//!   processes backend session events, and publishes [`AuthState`]
//!   over a `tokio::sync::watch` channel.
//! - [`RouteGuard`] turns the published state into navigation
//!   decisions, and stays silent until the first resolution completes
//!   so callers never redirect off stale state.

pub mod backend;
pub mod error;
pub mod guard;
pub mod manager;
pub mod orchestrator;
pub mod profile;

pub use backend::{AuthBackend, AuthSession, AuthUser, SessionEvent, SignUpOutcome};
pub use error::{AuthError, AuthResult, BackendError};
pub use guard::{RouteDecision, RouteGuard};
pub use manager::SessionManager;
pub use orchestrator::{AuthOrchestrator, AuthState, ResetOnSignOut, SignUpResult};
pub use profile::ProfileStore;
