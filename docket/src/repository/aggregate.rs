use crate::common::{Document, Value};
use crate::errors::{DocketError, DocketResult, ErrorKind};

/// A domain aggregate that can be stored as a document.
///
/// # Purpose
/// The only contract the repository needs from a domain type: a stable identity
/// to key the stored document by, and a projection into primitives. Reading an
/// aggregate back is left to a factory passed to the repository, usually the
/// type's [FromPrimitives::from_primitives].
///
/// # Usage
/// ```ignore
/// struct Course { id: String, name: String, duration: String }
///
/// impl Aggregate for Course {
///     fn identity(&self) -> String {
///         self.id.clone()
///     }
///
///     fn to_primitives(&self) -> Document {
///         doc! { "id": (self.id.clone()), "name": (self.name.clone()), "duration": (self.duration.clone()) }
///     }
/// }
/// ```
pub trait Aggregate: Send + Sync {
    /// The key the aggregate is stored under. Must not be empty.
    fn identity(&self) -> String;

    /// Projects the aggregate into a flat field to primitive mapping.
    fn to_primitives(&self) -> Document;
}

/// Rebuilds an aggregate from the primitives it was stored as.
pub trait FromPrimitives: Sized {
    fn from_primitives(document: Document) -> DocketResult<Self>;
}

/// Typed field access for aggregate factories.
///
/// Every `required_*` accessor fails with `MalformedDocument` naming the field
/// when it is missing or has the wrong type.
pub trait PrimitiveReader {
    fn required_str(&self, field: &str) -> DocketResult<String>;

    fn required_i64(&self, field: &str) -> DocketResult<i64>;

    fn required_f64(&self, field: &str) -> DocketResult<f64>;

    fn required_bool(&self, field: &str) -> DocketResult<bool>;

    fn required_str_array(&self, field: &str) -> DocketResult<Vec<String>>;

    /// Like [required_str](Self::required_str) but a missing or null field is `None`.
    fn optional_str(&self, field: &str) -> DocketResult<Option<String>>;
}

impl PrimitiveReader for Document {
    fn required_str(&self, field: &str) -> DocketResult<String> {
        let value = required(self, field)?;
        value
            .as_string()
            .cloned()
            .ok_or_else(|| wrong_type(field, "a string", value))
    }

    fn required_i64(&self, field: &str) -> DocketResult<i64> {
        let value = required(self, field)?;
        value
            .as_i64()
            .ok_or_else(|| wrong_type(field, "an integer", value))
    }

    fn required_f64(&self, field: &str) -> DocketResult<f64> {
        let value = required(self, field)?;
        value
            .as_f64()
            .ok_or_else(|| wrong_type(field, "a number", value))
    }

    fn required_bool(&self, field: &str) -> DocketResult<bool> {
        let value = required(self, field)?;
        value
            .as_bool()
            .copied()
            .ok_or_else(|| wrong_type(field, "a boolean", value))
    }

    fn required_str_array(&self, field: &str) -> DocketResult<Vec<String>> {
        let value = required(self, field)?;
        let items = value
            .as_array()
            .ok_or_else(|| wrong_type(field, "an array", value))?;
        items
            .iter()
            .map(|item| {
                item.as_string()
                    .cloned()
                    .ok_or_else(|| wrong_type(field, "an array of strings", value))
            })
            .collect()
    }

    fn optional_str(&self, field: &str) -> DocketResult<Option<String>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(field, "a string", other)),
        }
    }
}

fn required<'a>(document: &'a Document, field: &str) -> DocketResult<&'a Value> {
    match document.get(field) {
        Some(Value::Null) | None => {
            log::error!("Required field {} is missing from {:?}", field, document);
            Err(DocketError::new(
                &format!("Required field {} is missing", field),
                ErrorKind::MalformedDocument,
            ))
        }
        Some(value) => Ok(value),
    }
}

fn wrong_type(field: &str, expected: &str, found: &Value) -> DocketError {
    log::error!("Field {} should be {}, found {}", field, expected, found);
    DocketError::new(
        &format!("Field {} should be {}, found {}", field, expected, found),
        ErrorKind::MalformedDocument,
    )
}
