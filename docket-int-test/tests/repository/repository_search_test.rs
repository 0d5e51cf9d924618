use crate::repository::{ddd_courses, persist_all};
use docket::common::SortOrder;
use docket::criteria::{field, Criteria};
use docket::errors::ErrorKind;
use docket_int_test::fixtures::{sorted, Course};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[tokio::test]
async fn test_search_all_returns_existing_courses() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let courses = vec![Course::random(), Course::random()];
            persist_all(&repository, &courses).await?;

            let found = repository.search_all().await?;
            assert_eq!(sorted(found), sorted(courses));
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_search_on_never_written_collection_is_empty() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            assert!(repository.search_all().await?.is_empty());

            let criteria = Criteria::new().filter(field("name").contains("DDD"));
            assert!(repository.search_by_criteria(&criteria).await?.is_empty());
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_criteria_matching_nothing_is_empty() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            persist_all(&repository, &ddd_courses()).await?;

            let criteria = Criteria::new().filter(field("name").eq("Nothing like this"));
            assert!(repository.search_by_criteria(&criteria).await?.is_empty());
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_search_by_contains() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let courses = ddd_courses();
            persist_all(&repository, &courses).await?;

            let criteria = Criteria::new().filter(field("name").contains("DDD"));
            let found = repository.search_by_criteria(&criteria).await?;
            assert_eq!(sorted(found), sorted(courses[..2].to_vec()));
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_matching_name_and_duration() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let mut courses = ddd_courses();
            courses.push(Course::random());
            persist_all(&repository, &courses).await?;

            let criteria = Criteria::new()
                .filter(field("name").contains("DDD"))
                .filter(field("duration").contains("days"));
            let found = repository.matching(&criteria).await?;
            assert_eq!(found.len(), 2);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_criteria_from_primitives() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            persist_all(&repository, &ddd_courses()).await?;

            let criteria = Criteria::from_primitives(
                &[("name", "CONTAINS", "DDD"), ("duration", "!=", "3 days")],
                None,
                None,
                None,
                None,
            )?;
            let found = repository.search_by_criteria(&criteria).await?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].name, "DDD in Typescript");
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_order_and_pagination() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            persist_all(&repository, &ddd_courses()).await?;

            let criteria = Criteria::new()
                .order_by("name", SortOrder::Descending)
                .paginate(0, 2);
            let names: Vec<String> = repository
                .search_by_criteria(&criteria)
                .await?
                .into_iter()
                .map(|course| course.name)
                .collect();
            assert_eq!(names, vec!["Unrelated", "DDD in Typescript"]);

            let criteria = Criteria::new()
                .order_by("name", SortOrder::Descending)
                .paginate(2, 2);
            let rest = repository.search_by_criteria(&criteria).await?;
            assert_eq!(rest.len(), 1);
            assert_eq!(rest[0].name, "DDD in Golang");
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test]
async fn test_unsupported_operator_is_invalid_criteria() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let criteria = Criteria::new().where_field("name", "LIKE", "DDD%");

            let err = repository.search_by_criteria(&criteria).await.unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidCriteria);
            if let Some(engine) = ctx.in_memory() {
                assert_eq!(engine.request_count(), 0);
            }
            Ok(())
        },
        cleanup,
    )
    .await;
}
