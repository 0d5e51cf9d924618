use docket::criteria::{field, Criteria};
use docket::docket_config::RepositoryConfig;
use docket::errors::DocketResult;
use docket::operation::{eventually_visible, wait_for_visibility};
use docket_int_test::fixtures::Course;
use docket_int_test::test_util::{cleanup, create_test_context};

#[tokio::main]
async fn main() -> DocketResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context().await?;

    let count = 12_000;
    let config = RepositoryConfig::builder().page_size(500).build()?;
    let repo = ctx.repository_with_config(config);

    let start = std::time::Instant::now();
    for i in 0..count {
        let course = if i % 10 == 0 {
            Course::with_name_and_duration(&format!("DDD workshop {}", i), "3 days")
        } else {
            Course::random()
        };
        // the last write makes every earlier one visible too
        let options = if i == count - 1 {
            wait_for_visibility()
        } else {
            eventually_visible()
        };
        repo.persist_with_options(&course, &options).await?;
    }
    let elapsed = start.elapsed();
    println!("Persisted {} courses in {:?}", count, elapsed);

    let start = std::time::Instant::now();
    let all = repo.search_all().await?;
    println!("Read back {} courses in {:?}", all.len(), start.elapsed());

    let start = std::time::Instant::now();
    let criteria = Criteria::new().filter(field("name").contains("DDD"));
    let matching = repo.search_by_criteria(&criteria).await?;
    println!("Found {} DDD courses in {:?}", matching.len(), start.elapsed());

    cleanup(ctx).await
}
