//! The five REST operations over a [`Resource`] collection.
//!
//! Handlers are generic over the resource type and take the store explicitly, so
//! they can be called from the dispatcher or directly from tests.

use tracing::{info, instrument, warn};

use super::ApiError;
use crate::model::{Document, Resource};
use crate::store::DocumentStore;

/// The API actions a server route can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    List,
    Show,
    Create,
    Update,
    Destroy,
}

/// Every record in the collection, in store order.
#[instrument(skip(store), fields(resource = R::NAME))]
pub async fn list<R: Resource>(store: &dyn DocumentStore) -> Result<Vec<Document>, ApiError> {
    let documents = store.find_all(R::COLLECTION).await?;
    info!(count = documents.len(), "Listed");
    Ok(documents)
}

#[instrument(skip(store), fields(resource = R::NAME))]
pub async fn show<R: Resource>(store: &dyn DocumentStore, id: &str) -> Result<Document, ApiError> {
    store
        .find_by_id(R::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))
}

/// Persists the body as a new record and returns it with its assigned identity.
#[instrument(skip(store, body), fields(resource = R::NAME))]
pub async fn create<R: Resource>(store: &dyn DocumentStore, body: &[u8]) -> Result<Document, ApiError> {
    let document = decode::<R>(body)?;
    let saved = store.insert(R::COLLECTION, document).await?;
    info!(id = saved.id().unwrap_or_default(), "Created");
    Ok(saved)
}

/// Replaces every field of an existing record. Identity in the body is ignored.
#[instrument(skip(store, body), fields(resource = R::NAME))]
pub async fn update<R: Resource>(
    store: &dyn DocumentStore,
    id: &str,
    body: &[u8],
) -> Result<Document, ApiError> {
    let document = decode::<R>(body)?;
    let updated = store
        .replace(R::COLLECTION, id, document)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    info!("Updated");
    Ok(updated)
}

/// Removes a record and returns what was removed.
#[instrument(skip(store), fields(resource = R::NAME))]
pub async fn destroy<R: Resource>(store: &dyn DocumentStore, id: &str) -> Result<Document, ApiError> {
    let removed = store
        .remove(R::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    info!("Destroyed");
    Ok(removed)
}

/// Parses a body into `R` before anything touches the store.
fn decode<R: Resource>(body: &[u8]) -> Result<Document, ApiError> {
    let resource: R = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected body");
        ApiError::BadRequest(e.to_string())
    })?;
    Ok(resource.to_document()?.without_id())
}

fn not_found<R: Resource>(id: &str) -> ApiError {
    warn!(%id, "Not found");
    ApiError::NotFound {
        resource: R::NAME,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Contact;
    use crate::store::{mock::MockStore, StoreActor, StoreError};
    use serde_json::json;

    fn memory_store() -> crate::store::StoreClient {
        let (actor, client) = StoreActor::new(8, crate::store::object_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_create_then_show_round_trip() {
        let store = memory_store();
        let body = json!({"firstname": "Ada", "lastname": "Lovelace", "age": 28}).to_string();

        let created = create::<Contact>(&store, body.as_bytes()).await.unwrap();
        let id = created.id().unwrap().to_string();

        let shown = Contact::from_document(show::<Contact>(&store, &id).await.unwrap()).unwrap();
        assert_eq!(shown.id.as_deref(), Some(id.as_str()));
        assert_eq!((shown.firstname.as_str(), shown.lastname.as_str(), shown.age), ("Ada", "Lovelace", 28));
    }

    #[tokio::test]
    async fn test_client_identity_is_ignored_on_create() {
        let store = memory_store();
        let body = json!({"_id": "forged", "firstname": "A", "lastname": "B", "age": 1}).to_string();
        let created = create::<Contact>(&store, body.as_bytes()).await.unwrap();
        assert_ne!(created.id(), Some("forged"));
    }

    #[tokio::test]
    async fn test_malformed_body_never_reaches_store() {
        // No expectations: any store call would park and fail verify()
        let mock = MockStore::new();
        let store = mock.client();

        let err = create::<Contact>(&store, b"{not json").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = update::<Contact>(&store, "id", br#"{"firstname": "only"}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        mock.verify();
    }

    #[tokio::test]
    async fn test_update_replaces_and_destroy_removes() {
        let store = memory_store();
        let body = json!({"firstname": "Ada", "lastname": "Lovelace", "age": 28}).to_string();
        let id = create::<Contact>(&store, body.as_bytes()).await.unwrap().id().unwrap().to_string();

        let replacement = json!({"firstname": "Augusta", "lastname": "King", "age": 36}).to_string();
        let updated = update::<Contact>(&store, &id, replacement.as_bytes()).await.unwrap();
        assert_eq!(updated.id(), Some(id.as_str()));
        assert_eq!(updated.scalar("lastname").as_deref(), Some("King"));

        destroy::<Contact>(&store, &id).await.unwrap();
        assert!(list::<Contact>(&store).await.unwrap().is_empty());
        assert!(matches!(
            destroy::<Contact>(&store, &id).await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let mock = MockStore::new();
        mock.expect_find_all().return_err(StoreError::Unavailable("connection refused".into()));

        let err = list::<Contact>(&mock.client()).await.unwrap_err();
        assert!(matches!(err, ApiError::Store(StoreError::Unavailable(_))));
        mock.verify();
    }
}
