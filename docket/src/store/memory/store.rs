use super::matcher::{bad_request, compare_sort_values, matches, parse_sort, sort_values, SortField};
use super::InMemoryStoreConfig;
use crate::common::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind, InfrastructureCause};
use crate::query::{NativeQuery, ScanPage, SHARD_DOC_FIELD};
use crate::store::{DocumentStoreProvider, Hit, SearchResponse, VisibilityMode};
use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Snapshot = Arc<Vec<(String, Document)>>;

/// In-memory implementation of a document store.
///
/// # Purpose
/// `InMemoryStore` stands in for a search engine in tests and local runs. It
/// evaluates the query DSL produced by the criteria translator against documents
/// held in memory and reproduces the engine behaviours the repository depends on.
///
/// # Characteristics
/// - **Refresh model**: a write made with [VisibilityMode::Eventual] is buffered and
///   stays invisible to searches until the collection is refreshed; a write made
///   with [VisibilityMode::Wait] refreshes its collection before returning
/// - **Implicit collections**: a collection springs into existence on first write;
///   searching one that was never written fails with `CollectionAbsent`
/// - **Engine limits**: unsized searches return the default window and windows past
///   `max_result_window` are rejected with status 400
/// - **Points in time**: opening one snapshots the visible documents; scan pages
///   read the snapshot and resume after the previous page's sort values, so a
///   scan is not bounded by `max_result_window`. Keep-alives are not enforced
/// - **Request accounting**: every search and write is counted, so callers can
///   assert that a request was never sent
///
/// # Usage
/// ```text
/// let store = InMemoryStore::new(InMemoryStoreConfig::new());
/// let repository = Repository::new(DocumentStore::new(store.clone()), "courses", Course::from_primitives);
/// repository.persist(&course).await?;
/// assert_eq!(store.write_count(), 1);
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new(config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(config)),
        }
    }

    /// Makes every buffered write of a collection visible to searches.
    pub fn refresh(&self, collection: &str) {
        self.inner.refresh(collection)
    }

    /// Refreshes every collection.
    pub fn refresh_all(&self) {
        self.inner.refresh_all()
    }

    /// Number of search requests received so far.
    pub fn search_count(&self) -> usize {
        self.inner.search_count.load(Ordering::Relaxed)
    }

    /// Number of write requests received so far.
    pub fn write_count(&self) -> usize {
        self.inner.write_count.load(Ordering::Relaxed)
    }

    /// Total number of requests received so far, point-in-time requests included.
    pub fn request_count(&self) -> usize {
        self.search_count()
            + self.write_count()
            + self.inner.point_in_time_requests.load(Ordering::Relaxed)
    }

    /// Number of points in time opened and not yet closed.
    pub fn open_point_in_time_count(&self) -> usize {
        self.inner.points_in_time.len()
    }

    /// Fails the next request with an infrastructure error of the given cause.
    pub fn fail_next_request(&self, cause: InfrastructureCause) {
        *self.inner.injected_failure.lock() = Some(cause);
    }

    pub fn has_collection(&self, collection: &str) -> bool {
        self.inner.collections.contains_key(collection)
    }

    /// Number of documents visible to searches in a collection.
    pub fn visible_count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|state| state.read().visible.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStoreProvider for InMemoryStore {
    async fn search(&self, collection: &str, query: &NativeQuery) -> DocketResult<SearchResponse> {
        self.inner.search_count.fetch_add(1, Ordering::Relaxed);
        self.inner.delay().await;
        self.inner.take_failure()?;
        self.inner.search(collection, query)
    }

    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        visibility: VisibilityMode,
    ) -> DocketResult<()> {
        self.inner.write_count.fetch_add(1, Ordering::Relaxed);
        self.inner.delay().await;
        self.inner.take_failure()?;
        self.inner.write(collection, id, document, visibility)
    }

    async fn drop_collection(&self, collection: &str) -> DocketResult<()> {
        self.inner.collections.remove(collection);
        log::debug!("Dropped in-memory collection {}", collection);
        Ok(())
    }

    async fn open_point_in_time(&self, collection: &str, keep_alive: Duration) -> DocketResult<String> {
        self.inner.point_in_time_requests.fetch_add(1, Ordering::Relaxed);
        self.inner.delay().await;
        self.inner.take_failure()?;
        self.inner.open_point_in_time(collection, keep_alive)
    }

    async fn close_point_in_time(&self, id: &str) -> DocketResult<()> {
        self.inner.point_in_time_requests.fetch_add(1, Ordering::Relaxed);
        self.inner.points_in_time.remove(id);
        log::debug!("Closed point in time {}", id);
        Ok(())
    }
}

#[derive(Default)]
struct CollectionState {
    visible: IndexMap<String, Document>,
    pending: IndexMap<String, Document>,
}

impl CollectionState {
    fn refresh(&mut self) {
        for (id, document) in self.pending.drain(..) {
            self.visible.insert(id, document);
        }
    }
}

struct InMemoryStoreInner {
    config: InMemoryStoreConfig,
    collections: DashMap<String, Arc<RwLock<CollectionState>>>,
    points_in_time: DashMap<String, Snapshot>,
    next_point_in_time: AtomicU64,
    search_count: AtomicUsize,
    write_count: AtomicUsize,
    point_in_time_requests: AtomicUsize,
    injected_failure: Mutex<Option<InfrastructureCause>>,
}

impl InMemoryStoreInner {
    fn new(config: InMemoryStoreConfig) -> InMemoryStoreInner {
        InMemoryStoreInner {
            config,
            collections: DashMap::new(),
            points_in_time: DashMap::new(),
            next_point_in_time: AtomicU64::new(1),
            search_count: AtomicUsize::new(0),
            write_count: AtomicUsize::new(0),
            point_in_time_requests: AtomicUsize::new(0),
            injected_failure: Mutex::new(None),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.config.latency() {
            tokio::time::sleep(latency).await;
        }
    }

    fn take_failure(&self) -> DocketResult<()> {
        match self.injected_failure.lock().take() {
            Some(cause) => Err(DocketError::new(
                &format!("Injected store failure: {}", cause),
                ErrorKind::InfrastructureError(cause),
            )),
            None => Ok(()),
        }
    }

    fn collection(&self, collection: &str) -> Option<Arc<RwLock<CollectionState>>> {
        self.collections
            .get(collection)
            .map(|entry| entry.value().clone())
    }

    fn visible_documents(&self, collection: &str) -> DocketResult<Snapshot> {
        let state = self.collection(collection).ok_or_else(|| {
            DocketError::new(
                &format!("no such index [{}]", collection),
                ErrorKind::CollectionAbsent,
            )
            .with_collection(collection)
        })?;
        let state = state.read();
        Ok(Arc::new(
            state
                .visible
                .iter()
                .map(|(id, document)| (id.clone(), document.clone()))
                .collect(),
        ))
    }

    fn snapshot(&self, id: &str) -> DocketResult<Snapshot> {
        self.points_in_time
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                DocketError::new(
                    &format!("No search context found for id [{}]", id),
                    ErrorKind::InfrastructureError(InfrastructureCause::Status(404)),
                )
            })
    }

    fn open_point_in_time(&self, collection: &str, keep_alive: Duration) -> DocketResult<String> {
        let documents = self.visible_documents(collection)?;
        let id = format!("pit-{}", self.next_point_in_time.fetch_add(1, Ordering::Relaxed));
        log::debug!(
            "Opened point in time {} over {} documents of {} (keep alive {:?})",
            id,
            documents.len(),
            collection,
            keep_alive
        );
        self.points_in_time.insert(id.clone(), documents);
        Ok(id)
    }

    fn search(&self, collection: &str, query: &NativeQuery) -> DocketResult<SearchResponse> {
        let scan = query.scan();
        let documents = match scan {
            Some(scan) => self.snapshot(scan.point_in_time().id())?,
            None => self.visible_documents(collection)?,
        };

        let (from, size) = match (scan, query.window()) {
            (Some(scan), _) => (0, scan.size()),
            (None, Some(window)) => (window.from(), window.size()),
            (None, None) => (0, self.config.default_search_size()),
        };
        if from.saturating_add(size) > self.config.max_result_window() {
            return Err(DocketError::new(
                &format!(
                    "Result window is too large, from + size must be less than or equal to [{}]",
                    self.config.max_result_window()
                ),
                ErrorKind::InfrastructureError(InfrastructureCause::Status(400)),
            )
            .with_collection(collection));
        }

        let mut fields = parse_sort(query.sort()).map_err(|err| err.with_collection(collection))?;
        if scan.is_some() && fields.last().map(SortField::field) != Some(SHARD_DOC_FIELD) {
            fields.push(SortField::new(SHARD_DOC_FIELD, false));
        }

        let mut matched = Vec::new();
        for (position, (id, document)) in documents.iter().enumerate() {
            if matches(query.query(), document).map_err(|err| err.with_collection(collection))? {
                matched.push((sort_values(&fields, document, position as u64), id, document));
            }
        }
        if !fields.is_empty() {
            matched.sort_by(|a, b| compare_sort_values(&fields, &a.0, &b.0));
        }
        let total = matched.len() as u64;

        if let Some(after) = scan.and_then(ScanPage::search_after) {
            if after.len() != fields.len() {
                return Err(bad_request(&format!(
                    "search_after has {} value(s) but sort has {}",
                    after.len(),
                    fields.len()
                ))
                .with_collection(collection));
            }
            matched.retain(|(values, _, _)| {
                compare_sort_values(&fields, values, after) == CmpOrdering::Greater
            });
        }

        let hits = matched
            .into_iter()
            .skip(from as usize)
            .take(size as usize)
            .map(|(values, id, document)| {
                let hit = Hit::new(id, document.clone());
                if fields.is_empty() {
                    hit
                } else {
                    hit.with_sort_values(values)
                }
            })
            .collect::<Vec<Hit>>();

        log::debug!(
            "In-memory search on {} matched {} documents, returning {}",
            collection,
            total,
            hits.len()
        );
        let response = SearchResponse::new(hits, Some(total));
        Ok(match scan {
            Some(scan) => response.with_point_in_time_id(scan.point_in_time().id()),
            None => response,
        })
    }

    fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        visibility: VisibilityMode,
    ) -> DocketResult<()> {
        let state = self
            .collections
            .entry(collection.to_string())
            .or_default()
            .value()
            .clone();

        let mut state = state.write();
        state.pending.insert(id.to_string(), document.clone());
        if visibility == VisibilityMode::Wait {
            state.refresh();
        }
        log::debug!("Wrote document {} to {} ({})", id, collection, visibility);
        Ok(())
    }

    fn refresh(&self, collection: &str) {
        if let Some(state) = self.collection(collection) {
            state.write().refresh();
        }
    }

    fn refresh_all(&self) {
        let states: Vec<_> = self
            .collections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for state in states {
            state.write().refresh();
        }
    }
}
