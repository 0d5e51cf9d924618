use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::str::FromStr;

use crate::common::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind};

/// A raw stored document returned by a search, with the identifier the store
/// keys it by. Hits only live for the duration of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    id: String,
    source: Document,
    sort_values: Vec<Json>,
}

impl Hit {
    pub fn new(id: &str, source: Document) -> Self {
        Hit {
            id: id.to_string(),
            source,
            sort_values: Vec::new(),
        }
    }

    /// Attaches the values the store sorted this hit by.
    pub fn with_sort_values(mut self, sort_values: Vec<Json>) -> Self {
        self.sort_values = sort_values;
        self
    }

    /// Values the store sorted this hit by, in sort clause order. Empty for an
    /// unsorted search.
    pub fn sort_values(&self) -> &[Json] {
        &self.sort_values
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &Document {
        &self.source
    }

    pub fn into_source(self) -> Document {
        self.source
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    hits: Vec<Hit>,
    total: Option<u64>,
    point_in_time_id: Option<String>,
}

impl SearchResponse {
    pub fn new(hits: Vec<Hit>, total: Option<u64>) -> Self {
        SearchResponse {
            hits,
            total,
            point_in_time_id: None,
        }
    }

    pub fn with_point_in_time_id(mut self, id: &str) -> Self {
        self.point_in_time_id = Some(id.to_string());
        self
    }

    /// The point-in-time id the next scan page must use, when the store renewed it.
    pub fn point_in_time_id(&self) -> Option<&str> {
        self.point_in_time_id.as_deref()
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }

    /// Total number of matches across all pages, when the store reports it.
    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

/// Visibility guarantee a write is made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Return only once the written document is visible to subsequent searches.
    #[default]
    Wait,
    /// Return as soon as the store acknowledges the write.
    Eventual,
}

impl VisibilityMode {
    /// The engine's refresh parameter for this mode.
    pub fn refresh_param(&self) -> &'static str {
        match self {
            VisibilityMode::Wait => "wait_for",
            VisibilityMode::Eventual => "false",
        }
    }
}

impl Display for VisibilityMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VisibilityMode::Wait => write!(f, "wait"),
            VisibilityMode::Eventual => write!(f, "eventual"),
        }
    }
}

impl FromStr for VisibilityMode {
    type Err = DocketError;

    fn from_str(s: &str) -> DocketResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wait" | "wait_for" => Ok(VisibilityMode::Wait),
            "eventual" | "false" => Ok(VisibilityMode::Eventual),
            other => Err(DocketError::new(
                &format!("Unknown visibility mode: {}", other),
                ErrorKind::InvalidConfiguration,
            )),
        }
    }
}
