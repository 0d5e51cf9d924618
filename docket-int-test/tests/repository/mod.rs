mod concurrency_test;
mod repository_persist_test;
mod repository_search_test;
mod visibility_test;

use docket_int_test::fixtures::Course;
use docket::repository::Repository;

/// The three courses of the substring scenario: two about DDD and one unrelated.
pub fn ddd_courses() -> Vec<Course> {
    vec![
        Course::with_name_and_duration("DDD in Typescript", "8 days"),
        Course::with_name_and_duration("DDD in Golang", "3 days"),
        Course::with_name_and_duration("Unrelated", "2 days"),
    ]
}

pub async fn persist_all(repository: &Repository<Course>, courses: &[Course]) -> docket::errors::DocketResult<()> {
    for course in courses {
        repository.persist(course).await?;
    }
    Ok(())
}
