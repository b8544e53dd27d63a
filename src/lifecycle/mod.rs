//! Runtime orchestration and lifecycle management.
//!
//! # Main Components
//!
//! - [`ContactsSystem`] - opens the store, wires it into the HTTP server, and shuts both down
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod contacts_system;
pub mod tracing;

pub use contacts_system::*;
pub use self::tracing::setup_tracing;
