//! The document store collaborator.
//!
//! The rest of the crate talks to persistence only through [`DocumentStore`]. The
//! store instance is constructed at startup and passed in explicitly; there is no
//! process-wide connection.
//!
//! # Main Components
//!
//! - [`DocumentStore`] - the collection-keyed find/save contract
//! - [`StoreActor`] / [`StoreClient`] - in-memory backend, one task owning all collections
//! - [`mock::MockStore`] - scripted store for testing failure paths

pub mod core;
pub mod mock;

pub use self::core::{object_id, StoreActor, StoreClient, StoreRequest};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Document;

/// Errors surfaced by a store backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store closed")]
    Closed,
    #[error("store dropped response channel")]
    Dropped,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Find/save operations over named collections of documents.
///
/// Implementations own their consistency: callers may share one instance across
/// any number of concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in the store's natural order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Persists a new document. The store assigns the identity and returns the stored copy.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    /// Replaces all fields of an existing document, keeping its identity.
    /// Returns `None` when no document has that id.
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Removes a document, returning it, or `None` when no document has that id.
    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;
}
