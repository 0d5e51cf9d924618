use super::{Aggregate, AggregateCodec};
use crate::common::Document;
use crate::criteria::Criteria;
use crate::docket_config::RepositoryConfig;
use crate::errors::DocketResult;
use crate::operation::{PersistOptions, QueryExecutor, SearchOptions, WriteExecutor};
use crate::query::CriteriaTranslator;
use crate::store::DocumentStore;
use async_trait::async_trait;

/// Repository operations exposed to domain code.
///
/// Domain services depend on this trait rather than on [Repository] so tests can
/// swap in another implementation.
#[async_trait]
pub trait AggregateRepository<T: Aggregate>: Send + Sync {
    /// Stores the aggregate, replacing any previous version with the same identity.
    async fn save(&self, aggregate: &T) -> DocketResult<()>;

    /// Returns every aggregate the criteria selects.
    async fn matching(&self, criteria: &Criteria) -> DocketResult<Vec<T>>;

    /// Returns every aggregate in the collection.
    async fn search_all(&self) -> DocketResult<Vec<T>>;
}

/// Generic repository of one aggregate type over one collection.
///
/// # Purpose
/// Maps aggregates to and from documents in a search engine. Searches take an
/// engine-agnostic [Criteria], which is translated into the engine's query
/// language, executed, and decoded back into aggregates. Writes project an
/// aggregate into primitives and upsert it under its identity.
///
/// # Characteristics
/// - **Stateless**: holds only its configuration between calls
/// - **Shared store**: any number of repositories can use one [DocumentStore]
/// - **All or nothing**: a search returns every decoded aggregate or an error,
///   never a partial list
/// - **Absent collections**: a collection that was never written reads as empty
/// - **Visibility**: writes wait until searchable unless configured otherwise
///
/// # Usage
/// ```ignore
/// let repository = Repository::new(store, "backoffice_courses", Course::from_primitives);
/// repository.persist(&course).await?;
///
/// let criteria = Criteria::new().filter(field("name").contains("DDD"));
/// let courses = repository.search_by_criteria(&criteria).await?;
/// ```
pub struct Repository<T: Aggregate> {
    collection: String,
    config: RepositoryConfig,
    codec: AggregateCodec<T>,
    query_executor: QueryExecutor,
    write_executor: WriteExecutor,
}

impl<T: Aggregate> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            collection: self.collection.clone(),
            config: self.config.clone(),
            codec: self.codec.clone(),
            query_executor: self.query_executor.clone(),
            write_executor: self.write_executor.clone(),
        }
    }
}

impl<T: Aggregate> Repository<T> {
    /// Creates a repository with the default configuration.
    ///
    /// `factory` rebuilds an aggregate from its primitives; a type's
    /// `from_primitives` can be passed directly.
    pub fn new<F>(store: DocumentStore, collection: &str, factory: F) -> Self
    where
        F: Fn(Document) -> DocketResult<T> + Send + Sync + 'static,
    {
        Self::with_config(store, collection, factory, RepositoryConfig::new())
    }

    pub fn with_config<F>(
        store: DocumentStore,
        collection: &str,
        factory: F,
        config: RepositoryConfig,
    ) -> Self
    where
        F: Fn(Document) -> DocketResult<T> + Send + Sync + 'static,
    {
        Repository {
            collection: collection.to_string(),
            codec: AggregateCodec::new(factory),
            query_executor: QueryExecutor::new(store.clone(), config.clone()),
            write_executor: WriteExecutor::new(store, config.clone()),
            config,
        }
    }

    /// The collection this repository reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn codec(&self) -> &AggregateCodec<T> {
        &self.codec
    }

    pub async fn search_all(&self) -> DocketResult<Vec<T>> {
        self.search_all_with_options(&SearchOptions::new()).await
    }

    pub async fn search_all_with_options(&self, options: &SearchOptions) -> DocketResult<Vec<T>> {
        self.search_by_criteria_with_options(&Criteria::new(), options)
            .await
    }

    /// Returns every aggregate the criteria selects.
    ///
    /// # Errors
    ///
    /// * `InvalidCriteria` if the criteria cannot be translated; nothing is sent
    /// * `InfrastructureError` if the store fails or the deadline passes
    /// * `MalformedDocument` if any stored document cannot be decoded
    pub async fn search_by_criteria(&self, criteria: &Criteria) -> DocketResult<Vec<T>> {
        self.search_by_criteria_with_options(criteria, &SearchOptions::new())
            .await
    }

    pub async fn search_by_criteria_with_options(
        &self,
        criteria: &Criteria,
        options: &SearchOptions,
    ) -> DocketResult<Vec<T>> {
        let query = CriteriaTranslator::translate(criteria)
            .map_err(|err| err.with_collection(&self.collection))?;
        let hits = self
            .query_executor
            .execute(&self.collection, &query, options)
            .await?;
        self.codec
            .decode_many(hits)
            .map_err(|err| err.with_collection(&self.collection))
    }

    /// Stores the aggregate under its identity, replacing any previous version.
    ///
    /// # Errors
    ///
    /// * `MalformedDocument` if the aggregate has an empty identity
    /// * `InfrastructureError` if the store fails or the deadline passes
    pub async fn persist(&self, aggregate: &T) -> DocketResult<()> {
        self.persist_with_options(aggregate, &PersistOptions::new())
            .await
    }

    pub async fn persist_with_options(
        &self,
        aggregate: &T,
        options: &PersistOptions,
    ) -> DocketResult<()> {
        let (id, document) = self
            .codec
            .encode(aggregate)
            .map_err(|err| err.with_collection(&self.collection))?;
        self.write_executor
            .write(&self.collection, &id, &document, options)
            .await
    }

    /// Alias of [persist](Self::persist).
    pub async fn save(&self, aggregate: &T) -> DocketResult<()> {
        self.persist(aggregate).await
    }

    /// Alias of [search_by_criteria](Self::search_by_criteria).
    pub async fn matching(&self, criteria: &Criteria) -> DocketResult<Vec<T>> {
        self.search_by_criteria(criteria).await
    }
}

#[async_trait]
impl<T: Aggregate> AggregateRepository<T> for Repository<T> {
    async fn save(&self, aggregate: &T) -> DocketResult<()> {
        self.persist(aggregate).await
    }

    async fn matching(&self, criteria: &Criteria) -> DocketResult<Vec<T>> {
        self.search_by_criteria(criteria).await
    }

    async fn search_all(&self) -> DocketResult<Vec<T>> {
        Repository::search_all(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SortOrder;
    use crate::criteria::field;
    use crate::doc;
    use crate::errors::{ErrorKind, InfrastructureCause};
    use crate::operation::eventually_visible;
    use crate::repository::{FromPrimitives, PrimitiveReader};
    use crate::store::memory::{InMemoryStore, InMemoryStoreConfig};
    use crate::store::{DocumentStoreProvider, VisibilityMode};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Course {
        id: String,
        name: String,
        duration: String,
    }

    impl Course {
        fn new(id: &str, name: &str, duration: &str) -> Self {
            Course {
                id: id.to_string(),
                name: name.to_string(),
                duration: duration.to_string(),
            }
        }
    }

    impl Aggregate for Course {
        fn identity(&self) -> String {
            self.id.clone()
        }

        fn to_primitives(&self) -> Document {
            doc! { "id": (&self.id), "name": (&self.name), "duration": (&self.duration) }
        }
    }

    impl FromPrimitives for Course {
        fn from_primitives(document: Document) -> DocketResult<Self> {
            Ok(Course {
                id: document.required_str("id")?,
                name: document.required_str("name")?,
                duration: document.required_str("duration")?,
            })
        }
    }

    fn setup() -> (InMemoryStore, Repository<Course>) {
        let store = InMemoryStore::new(InMemoryStoreConfig::new());
        let repository = Repository::new(
            DocumentStore::new(store.clone()),
            "backoffice_courses",
            Course::from_primitives,
        );
        (store, repository)
    }

    async fn seed(repository: &Repository<Course>) {
        for course in [
            Course::new("1", "DDD in Typescript", "8 days"),
            Course::new("2", "DDD in Golang", "3 days"),
            Course::new("3", "Unrelated", "1 day"),
        ] {
            repository.persist(&course).await.unwrap();
        }
    }

    #[tokio::test]
    async fn persisted_aggregate_is_found() {
        let (_, repository) = setup();
        let course = Course::new("1", "DDD in Rust", "5 days");
        repository.persist(&course).await.unwrap();
        assert_eq!(repository.search_all().await.unwrap(), vec![course]);
    }

    #[tokio::test]
    async fn never_written_collection_is_empty() {
        let (_, repository) = setup();
        assert!(repository.search_all().await.unwrap().is_empty());
        let criteria = Criteria::new().filter(field("name").eq("x"));
        assert!(repository.search_by_criteria(&criteria).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn contains_filter_selects_matches() {
        let (_, repository) = setup();
        seed(&repository).await;
        let criteria = Criteria::new()
            .filter(field("name").contains("DDD"))
            .order_by("id", SortOrder::Ascending);
        let names: Vec<String> = repository
            .search_by_criteria(&criteria)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["DDD in Typescript", "DDD in Golang"]);
    }

    #[tokio::test]
    async fn unsupported_operator_sends_nothing() {
        let (store, repository) = setup();
        let criteria = Criteria::new().where_field("name", "LIKE", "DDD");
        let err = repository.search_by_criteria(&criteria).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidCriteria);
        assert_eq!(err.collection(), Some("backoffice_courses"));
        assert_eq!(store.request_count(), 0);
    }

    #[tokio::test]
    async fn persist_upserts_by_identity() {
        let (_, repository) = setup();
        repository.persist(&Course::new("1", "old", "1 day")).await.unwrap();
        repository.persist(&Course::new("1", "new", "2 days")).await.unwrap();
        let courses = repository.search_all().await.unwrap();
        assert_eq!(courses, vec![Course::new("1", "new", "2 days")]);
    }

    #[tokio::test]
    async fn eventual_persist_is_visible_after_refresh() {
        let (store, repository) = setup();
        repository
            .persist_with_options(&Course::new("1", "a", "b"), &eventually_visible())
            .await
            .unwrap();
        assert!(repository.search_all().await.unwrap().is_empty());
        store.refresh(repository.collection());
        assert_eq!(repository.search_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_document_aborts_search() {
        let (store, repository) = setup();
        repository.persist(&Course::new("1", "a", "b")).await.unwrap();
        store
            .write("backoffice_courses", "2", &doc! { "id": "2" }, VisibilityMode::Wait)
            .await
            .unwrap();
        let err = repository.search_all().await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedDocument);
        assert_eq!(err.collection(), Some("backoffice_courses"));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let (store, repository) = setup();
        repository.persist(&Course::new("1", "a", "b")).await.unwrap();
        store.fail_next_request(InfrastructureCause::Status(500));
        let err = repository.search_all().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn empty_identity_is_rejected_before_writing() {
        let (store, repository) = setup();
        let err = repository.persist(&Course::new("", "a", "b")).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedDocument);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn pagination_and_order() {
        let (_, repository) = setup();
        seed(&repository).await;
        let criteria = Criteria::new()
            .order_by("name", SortOrder::Ascending)
            .paginate(1, 1);
        let courses = repository.search_by_criteria(&criteria).await.unwrap();
        assert_eq!(courses, vec![Course::new("1", "DDD in Typescript", "8 days")]);
    }

    #[tokio::test]
    async fn aliases_and_trait_object() {
        let (_, repository) = setup();
        let dynamic: &dyn AggregateRepository<Course> = &repository;
        dynamic.save(&Course::new("1", "DDD", "1 day")).await.unwrap();
        let criteria = Criteria::new().filter(field("duration").eq("1 day"));
        assert_eq!(dynamic.matching(&criteria).await.unwrap().len(), 1);
        assert_eq!(dynamic.search_all().await.unwrap().len(), 1);
        assert_eq!(repository.matching(&criteria).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let store = InMemoryStore::new(
            InMemoryStoreConfig::new().with_latency(Duration::from_millis(300)),
        );
        let config = RepositoryConfig::builder()
            .request_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let repository = Repository::with_config(
            DocumentStore::new(store),
            "backoffice_courses",
            Course::from_primitives,
            config,
        );
        assert!(repository.search_all().await.unwrap_err().is_timeout());
        assert!(repository
            .persist(&Course::new("1", "a", "b"))
            .await
            .unwrap_err()
            .is_timeout());
    }
}
