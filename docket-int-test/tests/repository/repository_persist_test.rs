use docket::common::{Document, SortOrder};
use docket::criteria::{field, Criteria};
use docket::docket_config::RepositoryConfig;
use docket::errors::ErrorKind;
use docket::store::{DocumentStoreProvider, Hit, VisibilityMode};
use docket_int_test::fixtures::{sorted, Course};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[tokio::test]
async fn test_persisted_course_is_found() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::random();
            repository.persist(&course).await?;

            let found = repository.search_all().await?;
            assert!(found.contains(&course));
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_save_upserts_by_identity() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::with_name_and_duration("DDD in Rust", "5 days");
            repository.save(&course).await?;

            let renamed = Course::new(&course.id, "DDD in Rust, second edition", "6 days");
            repository.save(&renamed).await?;

            assert_eq!(repository.search_all().await?, vec![renamed]);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_decode_of_encode_round_trips() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let course = Course::random();
            let (id, document) = repository.codec().encode(&course)?;
            let decoded = repository.codec().decode(Hit::new(&id, document))?;
            assert_eq!(decoded, course);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_empty_identity_is_rejected() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let err = repository
                .persist(&Course::new("", "Nameless", "1 day"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedDocument);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_undecodable_document_fails_the_search() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            repository.persist(&Course::random()).await?;

            let mut broken = Document::new();
            broken.put("id", "broken")?;
            ctx.store()
                .write(ctx.collection(), "broken", &broken, VisibilityMode::Wait)
                .await?;

            let err = repository.search_all().await.unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedDocument);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_unpaginated_search_reads_every_page() {
    run_test(
        create_test_context,
        |ctx| async move {
            let config = RepositoryConfig::builder().page_size(3).build()?;
            let repository = ctx.repository_with_config(config);
            let courses: Vec<Course> = (0..10).map(|_| Course::random()).collect();
            for course in &courses {
                repository.persist(course).await?;
            }

            let found = repository.search_all().await?;
            assert_eq!(sorted(found), sorted(courses.clone()));

            let criteria = Criteria::new()
                .filter(field("duration").contains("days"))
                .order_by("id", SortOrder::Ascending);
            let found = repository.search_by_criteria(&criteria).await?;
            assert_eq!(found, sorted(courses));

            if let Some(engine) = ctx.in_memory() {
                // 4 pages for each of the two searches
                assert_eq!(engine.search_count(), 8);
            }
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_explicit_window_reads_one_page() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            for _ in 0..5 {
                repository.persist(&Course::random()).await?;
            }

            let criteria = Criteria::new().order_by("id", SortOrder::Ascending).paginate(3, 10);
            let found = repository.search_by_criteria(&criteria).await?;
            assert_eq!(found.len(), 2);

            if let Some(engine) = ctx.in_memory() {
                assert_eq!(engine.search_count(), 1);
            }
            Ok(())
        },
        cleanup,
    )
    .await;
}
