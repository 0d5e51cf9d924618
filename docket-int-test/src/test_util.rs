use crate::fixtures::Course;
use docket::docket_config::RepositoryConfig;
use docket::errors::DocketResult;
use docket::repository::{FromPrimitives, Repository};
use docket::store::memory::InMemoryStore;
use docket::store::{DocumentStore, DocumentStoreProvider};
use std::future::Future;
use std::time::Instant;

/// Runs an async test between a setup and a teardown step.
///
/// The teardown runs even when the test fails or panics; the failure is then
/// reported with the test's error or re-raised panic.
pub async fn run_test<B, BF, T, TF, A, AF>(before: B, test: T, after: A)
where
    B: Fn() -> BF,
    BF: Future<Output = DocketResult<TestContext>>,
    T: Fn(TestContext) -> TF,
    TF: Future<Output = DocketResult<()>> + Send + 'static,
    A: Fn(TestContext) -> AF,
    AF: Future<Output = DocketResult<()>>,
{
    let ctx = match before().await {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let start_time = Instant::now();
    let outcome = tokio::spawn(test(ctx.clone())).await;
    let elapsed = start_time.elapsed();
    let after_result = after(ctx).await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed (took {:?}): {:?}", elapsed, e),
        Err(join_error) if join_error.is_panic() => {
            eprintln!("\n========== Test panicked (took {:?}) ==========", elapsed);
            std::panic::resume_unwind(join_error.into_panic())
        }
        Err(join_error) => panic!("Test task did not complete: {}", join_error),
    }

    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// Everything a test needs: a store and a collection no other test uses.
#[derive(Clone)]
pub struct TestContext {
    collection: String,
    store: DocumentStore,
    in_memory: Option<InMemoryStore>,
}

impl TestContext {
    pub fn new(collection: String, store: DocumentStore, in_memory: Option<InMemoryStore>) -> Self {
        Self {
            collection,
            store,
            in_memory,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> DocumentStore {
        self.store.clone()
    }

    /// The in-process engine behind the store, when tests run against it.
    pub fn in_memory(&self) -> Option<&InMemoryStore> {
        self.in_memory.as_ref()
    }

    /// A course repository over this context's collection.
    pub fn repository(&self) -> Repository<Course> {
        Repository::new(self.store(), &self.collection, Course::from_primitives)
    }

    pub fn repository_with_config(&self, config: RepositoryConfig) -> Repository<Course> {
        Repository::with_config(self.store(), &self.collection, Course::from_primitives, config)
    }
}

/// A collection name unique to one test run.
pub fn random_collection() -> String {
    format!("courses_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(all(feature = "memory", not(feature = "elastic")))]
pub async fn create_test_context() -> DocketResult<TestContext> {
    use docket::store::memory::InMemoryStoreConfig;

    let engine = InMemoryStore::new(InMemoryStoreConfig::new());
    let store = DocumentStore::new(engine.clone());
    Ok(TestContext::new(random_collection(), store, Some(engine)))
}

#[cfg(feature = "elastic")]
pub async fn create_test_context() -> DocketResult<TestContext> {
    use docket_elastic_adapter::{ElasticConfig, ElasticStore};

    let config = ElasticConfig::from_env()?;
    let engine = ElasticStore::connect(config).await?;
    Ok(TestContext::new(random_collection(), DocumentStore::new(engine), None))
}

/// Drops the context's collection.
pub async fn cleanup(ctx: TestContext) -> DocketResult<()> {
    ctx.store.drop_collection(ctx.collection()).await
}
