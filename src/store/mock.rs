//! # Mock Store
//!
//! A scripted [`DocumentStore`](super::DocumentStore) for exercising failure paths
//! that the in-memory backend never produces (unavailable store, slow store).
//!
//! Queue expectations in the order requests will arrive, hand
//! [`MockStore::client`] to the code under test, then call [`MockStore::verify`].
//!
//! A request that does not match the next expectation is parked: its response
//! channel is held open and never answered, which is how tests simulate a store
//! that hangs.
//!
//! # Example
//! ```ignore
//! let mock = MockStore::new();
//! mock.expect_find_all().return_err(StoreError::Unavailable("down".into()));
//!
//! let store = mock.client();
//! // Use store in tests...
//! mock.verify();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use paste::paste;
use tokio::sync::mpsc;
use tracing::warn;

use super::{StoreClient, StoreError, StoreRequest};
use crate::model::Document;

enum Expectation {
    FindAll(Result<Vec<Document>, StoreError>),
    FindById(Result<Option<Document>, StoreError>),
    Insert(Result<Document, StoreError>),
    Replace(Result<Option<Document>, StoreError>),
    Remove(Result<Option<Document>, StoreError>),
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

fn lock(expectations: &Expectations) -> MutexGuard<'_, VecDeque<Expectation>> {
    expectations.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A store client backed by a queue of canned responses.
pub struct MockStore {
    client: StoreClient,
    expectations: Expectations,
    unexpected: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockStore {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let unexpected = Arc::new(AtomicUsize::new(0));
        let queue = expectations.clone();
        let misses = unexpected.clone();

        let handle = tokio::spawn(async move {
            let mut parked = Vec::new();
            while let Some(request) = receiver.recv().await {
                let next = lock(&queue).pop_front();
                match (request, next) {
                    (StoreRequest::FindAll { respond_to, .. }, Some(Expectation::FindAll(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::FindById { respond_to, .. }, Some(Expectation::FindById(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Replace { respond_to, .. }, Some(Expectation::Replace(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Remove { respond_to, .. }, Some(Expectation::Remove(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (request, next) => {
                        warn!(?request, "Unexpected store request, parking it");
                        if let Some(expectation) = next {
                            lock(&queue).push_front(expectation);
                        }
                        misses.fetch_add(1, Ordering::SeqCst);
                        parked.push(request);
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            unexpected,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    /// Verifies that every expectation was consumed and no request went unanswered.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        let unexpected = self.unexpected.load(Ordering::SeqCst);
        if remaining != 0 || unexpected != 0 {
            panic!("Mock store mismatch: {remaining} expectations unmet, {unexpected} unexpected requests");
        }
    }
}

macro_rules! expectation_builder {
    ($variant:ident, $method:ident, $ok:ty) => {
        paste! {
            #[doc = "Builder for `" $method "` expectations."]
            pub struct [<$variant ExpectationBuilder>] {
                expectations: Expectations,
            }

            impl [<$variant ExpectationBuilder>] {
                /// Answers the request with a successful result.
                pub fn return_ok(self, value: $ok) {
                    lock(&self.expectations).push_back(Expectation::$variant(Ok(value)));
                }

                /// Answers the request with an error.
                pub fn return_err(self, error: StoreError) {
                    lock(&self.expectations).push_back(Expectation::$variant(Err(error)));
                }
            }

            impl MockStore {
                #[doc = "Expects a `" $method "` request."]
                pub fn [<expect_ $method>](&self) -> [<$variant ExpectationBuilder>] {
                    [<$variant ExpectationBuilder>] {
                        expectations: self.expectations.clone(),
                    }
                }
            }
        }
    };
}

expectation_builder!(FindAll, find_all, Vec<Document>);
expectation_builder!(FindById, find_by_id, Option<Document>);
expectation_builder!(Insert, insert, Document);
expectation_builder!(Replace, replace, Option<Document>);
expectation_builder!(Remove, remove, Option<Document>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use std::time::Duration;

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        let mock = MockStore::new();

        let mut saved = Document::new();
        saved.set_id("abc");
        mock.expect_insert().return_ok(saved.clone());
        mock.expect_find_all().return_err(StoreError::Unavailable("down".into()));

        let store = mock.client();
        assert_eq!(store.insert("contacts", Document::new()).await.unwrap(), saved);
        assert_eq!(
            store.find_all("contacts").await,
            Err(StoreError::Unavailable("down".into()))
        );

        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_hangs() {
        let mock = MockStore::new();
        let store = mock.client();

        let pending = tokio::time::timeout(Duration::from_millis(50), store.find_by_id("contacts", "x")).await;
        assert!(pending.is_err(), "parked request should never be answered");
    }

    #[tokio::test]
    #[should_panic(expected = "1 expectations unmet")]
    async fn test_verify_reports_unmet_expectations() {
        let mock = MockStore::new();
        mock.expect_remove().return_ok(None);
        mock.verify();
    }
}
