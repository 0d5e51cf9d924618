use docket::common::Document;
use docket::doc;
use docket::errors::DocketResult;
use docket::repository::{Aggregate, FromPrimitives, PrimitiveReader};
use fake::faker::company::en::CatchPhrase;
use fake::Fake;

/// A backoffice course, the aggregate the integration tests persist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub duration: String,
}

impl Course {
    pub fn new(id: &str, name: &str, duration: &str) -> Self {
        Course {
            id: id.to_string(),
            name: name.to_string(),
            duration: duration.to_string(),
        }
    }

    /// A course with a random id, name and duration.
    pub fn random() -> Self {
        let name: String = CatchPhrase().fake();
        let days: u8 = (1..30).fake();
        Course::with_name_and_duration(&name, &format!("{} days", days))
    }

    /// A course with a random id and the given name and duration.
    pub fn with_name_and_duration(name: &str, duration: &str) -> Self {
        Course::new(&uuid::Uuid::new_v4().to_string(), name, duration)
    }
}

impl Aggregate for Course {
    fn identity(&self) -> String {
        self.id.clone()
    }

    fn to_primitives(&self) -> Document {
        doc! {
            "id": (&self.id),
            "name": (&self.name),
            "duration": (&self.duration),
        }
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

/// Sorts courses by id, the order tests compare results in.
pub fn sorted(mut courses: Vec<Course>) -> Vec<Course> {
    courses.sort_by(|a, b| a.id.cmp(&b.id));
    courses
}
