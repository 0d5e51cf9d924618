use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::common::Document;
use crate::errors::DocketResult;
use crate::query::NativeQuery;

use super::{SearchResponse, VisibilityMode};

/// Low-level interface to a search/document engine.
///
/// # Purpose
/// The only seam between Docket and the engine. Implementations own the wire
/// protocol; everything above this trait (translation, paging, decoding) is
/// engine-independent.
///
/// # Contract
/// - `search` on a collection the engine does not know must fail with
///   `ErrorKind::CollectionAbsent`, never with a generic error and never with an
///   empty response
/// - any other failure is an `ErrorKind::InfrastructureError`
/// - `write` is an upsert keyed by `id`: an existing document with the same id
///   is replaced in full
/// - a point-in-time freezes the documents visible when it was opened; a search
///   carrying a scan page reads from it and returns sort values on every hit,
///   with the engine's position tiebreaker appended last
///
/// # Implementations
/// - `InMemoryStore`: in-process engine for tests and local runs
/// - `ElasticStore` (docket_elastic_adapter): HTTP engine
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Runs a native query against a collection and returns one page of hits.
    async fn search(&self, collection: &str, query: &NativeQuery) -> DocketResult<SearchResponse>;

    /// Writes a document under `id`, replacing any document with the same id.
    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        visibility: VisibilityMode,
    ) -> DocketResult<()>;

    /// Deletes a whole collection. Deleting an absent collection succeeds.
    async fn drop_collection(&self, collection: &str) -> DocketResult<()>;

    /// Opens a point-in-time over a collection and returns its id.
    ///
    /// Fails with `ErrorKind::CollectionAbsent` if the collection does not exist.
    async fn open_point_in_time(&self, collection: &str, keep_alive: Duration) -> DocketResult<String>;

    /// Releases a point-in-time. Closing one that already expired succeeds.
    async fn close_point_in_time(&self, id: &str) -> DocketResult<()>;
}

/// Shared handle to a document store.
///
/// Created once per process and cloned into every repository; clones share the
/// same underlying provider and connection. Repositories never mutate it.
///
/// ```text
/// let store = DocumentStore::new(InMemoryStore::new());
/// let courses = Repository::new(store.clone(), "courses", Course::from_primitives);
/// let users = Repository::new(store, "users", User::from_primitives);
/// ```
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }

    pub fn from_arc(inner: Arc<dyn DocumentStoreProvider>) -> Self {
        DocumentStore { inner }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
