use docket_int_test::fixtures::{sorted, Course};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_persists_of_distinct_courses() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let first = Course::random();
            let second = Course::random();

            let (a, b) = {
                let (r1, r2) = (repository.clone(), repository.clone());
                let (c1, c2) = (first.clone(), second.clone());
                tokio::join!(
                    tokio::spawn(async move { r1.persist(&c1).await }),
                    tokio::spawn(async move { r2.persist(&c2).await })
                )
            };
            a.expect("persist task panicked")?;
            b.expect("persist task panicked")?;

            let found = repository.search_all().await?;
            assert_eq!(sorted(found), sorted(vec![first, second]));
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_persists() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let courses: Vec<Course> = (0..50).map(|_| Course::random()).collect();

            let handles: Vec<_> = courses
                .iter()
                .cloned()
                .map(|course| {
                    let repository = repository.clone();
                    tokio::spawn(async move { repository.persist(&course).await })
                })
                .collect();
            for handle in handles {
                handle.await.expect("persist task panicked")?;
            }

            let found = repository.search_all().await?;
            assert_eq!(sorted(found), sorted(courses));
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sequential_persists_of_same_identity_keep_last() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let original = Course::with_name_and_duration("DDD in Typescript", "8 days");
            let updated = Course::new(&original.id, "DDD in Typescript", "10 days");

            let r1 = repository.clone();
            let c1 = original.clone();
            tokio::spawn(async move { r1.persist(&c1).await })
                .await
                .expect("persist task panicked")?;
            let r2 = repository.clone();
            let c2 = updated.clone();
            tokio::spawn(async move { r2.persist(&c2).await })
                .await
                .expect("persist task panicked")?;

            assert_eq!(repository.search_all().await?, vec![updated]);
            Ok(())
        },
        cleanup,
    )
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_persists_of_same_identity_keep_one() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repository = ctx.repository();
            let id = uuid::Uuid::new_v4().to_string();
            let left = Course::new(&id, "left", "1 days");
            let right = Course::new(&id, "right", "2 days");

            let (r1, r2) = (repository.clone(), repository.clone());
            let (c1, c2) = (left.clone(), right.clone());
            let (a, b) = tokio::join!(
                tokio::spawn(async move { r1.persist(&c1).await }),
                tokio::spawn(async move { r2.persist(&c2).await })
            );
            a.expect("persist task panicked")?;
            b.expect("persist task panicked")?;

            let found = repository.search_all().await?;
            assert_eq!(found.len(), 1);
            assert!(found[0] == left || found[0] == right);
            Ok(())
        },
        cleanup,
    )
    .await;
}
