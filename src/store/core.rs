//! # In-Memory Store Actor
//!
//! The memory backend is a single Tokio task that owns every collection. Requests
//! arrive over an `mpsc` channel and are answered over a `oneshot`, so the
//! collections need no locks: the task has exclusive ownership and handles one
//! message at a time.
//!
//! ## Key Types
//!
//! - [`StoreActor`]: the server half, owning state and the receiver.
//! - [`StoreClient`]: the cloneable sender half, implementing [`DocumentStore`].
//! - [`StoreRequest`]: the message protocol between the two.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::model::Document;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Messages understood by the store actor, one per [`DocumentStore`] operation.
#[derive(Debug)]
pub enum StoreRequest {
    FindAll {
        collection: String,
        respond_to: Response<Vec<Document>>,
    },
    FindById {
        collection: String,
        id: String,
        respond_to: Response<Option<Document>>,
    },
    Insert {
        collection: String,
        document: Document,
        respond_to: Response<Document>,
    },
    Replace {
        collection: String,
        id: String,
        document: Document,
        respond_to: Response<Option<Document>>,
    },
    Remove {
        collection: String,
        id: String,
        respond_to: Response<Option<Document>>,
    },
}

/// Documents of one collection plus their insertion order.
#[derive(Default)]
struct Collection {
    order: Vec<String>,
    documents: HashMap<String, Document>,
}

impl Collection {
    fn all(&self) -> Vec<Document> {
        self.order
            .iter()
            .filter_map(|id| self.documents.get(id).cloned())
            .collect()
    }
}

/// The actor that owns all in-memory collections.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    collections: HashMap<String, Collection>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl StoreActor {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            collections: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, StoreClient::new(sender))
    }

    /// Processes requests until every [`StoreClient`] has been dropped.
    pub async fn run(mut self) {
        info!("Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::FindAll { collection, respond_to } => {
                    let documents = self
                        .collections
                        .get(&collection)
                        .map(Collection::all)
                        .unwrap_or_default();
                    debug!(%collection, count = documents.len(), "FindAll");
                    let _ = respond_to.send(Ok(documents));
                }
                StoreRequest::FindById { collection, id, respond_to } => {
                    let document = self
                        .collections
                        .get(&collection)
                        .and_then(|c| c.documents.get(&id))
                        .cloned();
                    debug!(%collection, %id, found = document.is_some(), "FindById");
                    let _ = respond_to.send(Ok(document));
                }
                StoreRequest::Insert { collection, mut document, respond_to } => {
                    let id = (self.next_id_fn)();
                    document.set_id(id.clone());
                    let entry = self.collections.entry(collection.clone()).or_default();
                    entry.order.push(id.clone());
                    entry.documents.insert(id.clone(), document.clone());
                    info!(%collection, %id, size = entry.documents.len(), "Inserted");
                    let _ = respond_to.send(Ok(document));
                }
                StoreRequest::Replace { collection, id, mut document, respond_to } => {
                    let slot = self
                        .collections
                        .get_mut(&collection)
                        .and_then(|c| c.documents.get_mut(&id));
                    match slot {
                        Some(existing) => {
                            document.set_id(id.clone());
                            *existing = document.clone();
                            info!(%collection, %id, "Replaced");
                            let _ = respond_to.send(Ok(Some(document)));
                        }
                        None => {
                            warn!(%collection, %id, "Not found");
                            let _ = respond_to.send(Ok(None));
                        }
                    }
                }
                StoreRequest::Remove { collection, id, respond_to } => {
                    let removed = self.collections.get_mut(&collection).and_then(|c| {
                        let removed = c.documents.remove(&id)?;
                        c.order.retain(|existing| existing != &id);
                        Some(removed)
                    });
                    match &removed {
                        Some(_) => info!(%collection, %id, "Removed"),
                        None => warn!(%collection, %id, "Not found"),
                    }
                    let _ = respond_to.send(Ok(removed));
                }
            }
        }

        let size: usize = self.collections.values().map(|c| c.documents.len()).sum();
        info!(collections = self.collections.len(), size, "Store shutdown");
    }
}

/// Cloneable handle to a running [`StoreActor`].
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }
}

#[async_trait]
impl DocumentStore for StoreClient {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.request(|respond_to| StoreRequest::FindAll {
            collection: collection.to_string(),
            respond_to,
        })
        .await
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.request(|respond_to| StoreRequest::FindById {
            collection: collection.to_string(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        self.request(|respond_to| StoreRequest::Insert {
            collection: collection.to_string(),
            document,
            respond_to,
        })
        .await
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.request(|respond_to| StoreRequest::Replace {
            collection: collection.to_string(),
            id: id.to_string(),
            document,
            respond_to,
        })
        .await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.request(|respond_to| StoreRequest::Remove {
            collection: collection.to_string(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }
}

/// Generates an ObjectId-shaped identity: 24 lowercase hex characters, the first
/// eight encoding the creation time in seconds.
pub fn object_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default();
    let mut id = format!("{secs:08x}");
    for byte in &Uuid::new_v4().as_bytes()[..8] {
        let _ = write!(id, "{byte:02x}");
    }
    id
}
