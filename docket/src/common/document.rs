use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Formatter};

/// A flat mapping of field name to [Value].
///
/// `Document` is both what an aggregate projects itself into (`to_primitives`) and
/// what the engine stores. Keys keep their insertion order so a document prints
/// and serializes the way the aggregate wrote it, but equality ignores order:
/// the engine is free to hand fields back in a different order.
///
/// # Examples
///
/// ```ignore
/// let mut doc = Document::new();
/// doc.put("name", "DDD in Rust")?;
/// doc.put("duration", "8 days")?;
/// assert_eq!(doc.get("name"), Some(&Value::from("DDD in Rust")));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Associates a value with a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDocument` if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> DocketResult<()> {
        if key.is_empty() {
            log::error!("Document key cannot be empty");
            return Err(DocketError::new(
                "Document key cannot be empty",
                ErrorKind::MalformedDocument,
            ));
        }
        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.data.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Converts the document into a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .data
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<serde_json::Map<String, serde_json::Value>>();
        serde_json::Value::Object(map)
    }

    /// Builds a document from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDocument` if the JSON value is not an object.
    pub fn from_json(json: &serde_json::Value) -> DocketResult<Document> {
        match Value::from_json(json) {
            Value::Document(doc) => Ok(doc),
            other => {
                log::error!("Expected a JSON object for a document, found {}", other);
                Err(DocketError::new(
                    "Expected a JSON object for a document",
                    ErrorKind::MalformedDocument,
                ))
            }
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in &self.data {
            map.serialize_entry(key, &value.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Document::from_json(&json).map_err(|err| D::Error::custom(err.message().to_string()))
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

/// Creates a [Document] from key/value pairs.
///
/// Keys are identifiers or string literals; values are any expression convertible
/// into [Value], an array literal, or a nested `{ ... }` document.
///
/// ```ignore
/// let doc = doc! { "name": "DDD in Golang", "duration": "3 days", "tags": ["ddd", "go"] };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::common::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::common::Document::new();
            $(
                doc.put($crate::doc_key!($key), $crate::doc_value!($value))
                    .expect("document keys in doc! must not be empty");
            )*
            doc
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! doc_key {
    ($key:literal) => {
        $key
    };
    ($key:ident) => {
        stringify!($key)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
