use docket::operation::{eventually_visible, search_timeout, wait_for_visibility};
use docket_int_test::fixtures::Course;
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[tokio::test]
async fn test_wait_for_visibility_is_read_after_write() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::random();
            repository
                .persist_with_options(&course, &wait_for_visibility())
                .await?;

            assert_eq!(repository.search_all().await?, vec![course]);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[cfg(all(feature = "memory", not(feature = "elastic")))]
#[tokio::test]
async fn test_eventual_write_is_visible_after_refresh() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::random();
            repository
                .persist_with_options(&course, &eventually_visible())
                .await?;

            let engine = ctx.in_memory().expect("in-memory engine");
            assert!(repository.search_all().await?.is_empty());

            engine.refresh(ctx.collection());
            assert_eq!(repository.search_all().await?, vec![course]);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_search_with_generous_deadline() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::random();
            repository.persist(&course).await?;

            let options = search_timeout(std::time::Duration::from_secs(10));
            assert_eq!(repository.search_all_with_options(&options).await?, vec![course]);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[cfg(all(feature = "memory", not(feature = "elastic")))]
mod in_memory {
    use docket::docket_config::RepositoryConfig;
    use docket::errors::{ErrorKind, InfrastructureCause};
    use docket::operation::search_timeout;
    use docket::repository::{FromPrimitives, Repository};
    use docket::store::memory::{InMemoryStore, InMemoryStoreConfig};
    use docket::store::DocumentStore;
    use docket_int_test::fixtures::{sorted, Course};
    use docket_int_test::test_util::random_collection;
    use std::time::Duration;

    #[tokio::test]
    async fn test_slow_engine_hits_the_deadline() {
        let engine = InMemoryStore::new(
            InMemoryStoreConfig::new().with_latency(Duration::from_millis(200)),
        );
        let repository: Repository<Course> = Repository::new(
            DocumentStore::new(engine),
            &random_collection(),
            Course::from_primitives,
        );

        let err = repository
            .search_all_with_options(&search_timeout(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InfrastructureError(InfrastructureCause::Timeout)
        );
        assert_eq!(err.collection(), Some(repository.collection()));
    }

    #[tokio::test]
    async fn test_engine_failure_surfaces_as_infrastructure_error() {
        let engine = InMemoryStore::new(InMemoryStoreConfig::new());
        let repository: Repository<Course> = Repository::new(
            DocumentStore::new(engine.clone()),
            &random_collection(),
            Course::from_primitives,
        );
        repository.persist(&Course::random()).await.unwrap();

        engine.fail_next_request(InfrastructureCause::Status(503));
        let err = repository.search_all().await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        assert_eq!(repository.search_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_all_reads_past_max_result_window() {
        let engine = InMemoryStore::new(InMemoryStoreConfig::new().with_max_result_window(5));
        let config = RepositoryConfig::builder().page_size(2).build().unwrap();
        let repository: Repository<Course> = Repository::with_config(
            DocumentStore::new(engine.clone()),
            &random_collection(),
            Course::from_primitives,
            config,
        );
        let courses: Vec<Course> = (0..12).map(|_| Course::random()).collect();
        for course in &courses {
            repository.persist(course).await.unwrap();
        }

        let found = repository.search_all().await.unwrap();
        assert_eq!(sorted(found), sorted(courses));
        assert_eq!(engine.open_point_in_time_count(), 0);
    }
}
