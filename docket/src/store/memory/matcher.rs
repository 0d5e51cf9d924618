use regex::Regex;
use serde_json::Value as Json;
use std::cmp::Ordering;

use crate::common::{Document, Value};
use crate::errors::{DocketError, DocketResult, ErrorKind, InfrastructureCause};
use crate::query::SHARD_DOC_FIELD;

/// Evaluates a query clause against one stored document.
///
/// Supports the subset of the engine DSL the translator emits: `match_all`,
/// `bool` (`must`, `filter`, `must_not`, `should`), `term`, `terms`, `range` and
/// `wildcard`. Anything else is rejected the way the engine rejects an unknown
/// query, with a 400 status.
pub(crate) fn matches(query: &Json, doc: &Document) -> DocketResult<bool> {
    let (kind, body) = single_entry(query)?;
    match kind.as_str() {
        "match_all" => Ok(true),
        "bool" => match_bool(body, doc),
        "term" => {
            let (field, expected) = single_entry(body)?;
            let expected = match expected {
                Json::Object(options) => options.get("value").ok_or_else(|| bad_request("[term] query is missing [value]"))?,
                other => other,
            };
            let expected = Value::from_json(expected);
            Ok(field_values(doc, field).any(|value| *value == expected))
        }
        "terms" => {
            let (field, expected) = single_entry(body)?;
            let expected: Vec<Value> = expected
                .as_array()
                .ok_or_else(|| bad_request("[terms] query needs an array of values"))?
                .iter()
                .map(Value::from_json)
                .collect();
            Ok(field_values(doc, field).any(|value| expected.contains(value)))
        }
        "range" => {
            let (field, bounds) = single_entry(body)?;
            let bounds = bounds
                .as_object()
                .ok_or_else(|| bad_request("[range] query needs an object of bounds"))?;
            Ok(field_values(doc, field).any(|value| within(value, bounds)))
        }
        "wildcard" => {
            let (field, pattern) = single_entry(body)?;
            let pattern = match pattern {
                Json::Object(options) => options.get("value").and_then(Json::as_str),
                other => other.as_str(),
            }
            .ok_or_else(|| bad_request("[wildcard] query needs a string [value]"))?;
            let regex = wildcard_regex(pattern)?;
            Ok(field_values(doc, field).any(|value| {
                value.as_string().map(|s| regex.is_match(s)).unwrap_or(false)
            }))
        }
        other => Err(bad_request(&format!("unknown query [{}]", other))),
    }
}

/// One parsed sort clause.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SortField {
    field: String,
    descending: bool,
}

impl SortField {
    pub(crate) fn new(field: &str, descending: bool) -> Self {
        SortField {
            field: field.to_string(),
            descending,
        }
    }

    pub(crate) fn field(&self) -> &str {
        &self.field
    }
}

pub(crate) fn parse_sort(sort: &[Json]) -> DocketResult<Vec<SortField>> {
    sort.iter()
        .map(|clause| sort_clause(clause).map(|(field, descending)| SortField { field, descending }))
        .collect()
}

/// The values a document sorts by, one per field. [SHARD_DOC_FIELD] resolves to
/// the document's position in the collection.
pub(crate) fn sort_values(fields: &[SortField], doc: &Document, position: u64) -> Vec<Json> {
    fields
        .iter()
        .map(|field| {
            if field.field == SHARD_DOC_FIELD {
                Json::from(position)
            } else {
                doc.get(&field.field).map(Value::to_json).unwrap_or(Json::Null)
            }
        })
        .collect()
}

/// Orders two lists of sort values. Missing values sort last in either direction.
pub(crate) fn compare_sort_values(fields: &[SortField], a: &[Json], b: &[Json]) -> Ordering {
    for (index, field) in fields.iter().enumerate() {
        let ordering = match (present(a.get(index)), present(b.get(index))) {
            (Some(x), Some(y)) => {
                let ordering = Value::from_json(x)
                    .compare(&Value::from_json(y))
                    .unwrap_or(Ordering::Equal);
                if field.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn present(value: Option<&Json>) -> Option<&Json> {
    value.filter(|value| !value.is_null())
}

fn sort_clause(clause: &Json) -> DocketResult<(String, bool)> {
    match clause {
        Json::String(field) => Ok((field.clone(), false)),
        Json::Object(_) => {
            let (field, options) = single_entry(clause)?;
            let order = match options {
                Json::String(order) => order.as_str(),
                Json::Object(options) => options.get("order").and_then(Json::as_str).unwrap_or("asc"),
                _ => return Err(bad_request("malformed sort clause")),
            };
            match order {
                "asc" => Ok((field.clone(), false)),
                "desc" => Ok((field.clone(), true)),
                other => Err(bad_request(&format!("unknown sort order [{}]", other))),
            }
        }
        _ => Err(bad_request("malformed sort clause")),
    }
}

fn match_bool(body: &Json, doc: &Document) -> DocketResult<bool> {
    let clauses = body
        .as_object()
        .ok_or_else(|| bad_request("[bool] query needs an object"))?;

    for key in clauses.keys() {
        if !matches!(key.as_str(), "must" | "filter" | "must_not" | "should") {
            return Err(bad_request(&format!("[bool] query does not support [{}]", key)));
        }
    }

    for key in ["must", "filter"] {
        for clause in clause_list(clauses.get(key)) {
            if !matches(clause, doc)? {
                return Ok(false);
            }
        }
    }

    for clause in clause_list(clauses.get("must_not")) {
        if matches(clause, doc)? {
            return Ok(false);
        }
    }

    let should = clause_list(clauses.get("should"));
    let scoring_only = clauses.contains_key("must") || clauses.contains_key("filter");
    if !should.is_empty() && !scoring_only {
        for clause in should {
            if matches(clause, doc)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    Ok(true)
}

fn clause_list(clauses: Option<&Json>) -> Vec<&Json> {
    match clauses {
        Some(Json::Array(items)) => items.iter().collect(),
        Some(single @ Json::Object(_)) => vec![single],
        _ => Vec::new(),
    }
}

fn single_entry(json: &Json) -> DocketResult<(&String, &Json)> {
    let object = json
        .as_object()
        .ok_or_else(|| bad_request("query clause must be an object"))?;
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(bad_request("query clause must have exactly one key")),
    }
}

fn field_values<'a>(doc: &'a Document, field: &str) -> Box<dyn Iterator<Item = &'a Value> + 'a> {
    match doc.get(field) {
        Some(Value::Array(values)) => Box::new(values.iter()),
        Some(value) => Box::new(std::iter::once(value)),
        None => Box::new(std::iter::empty()),
    }
}

fn within(value: &Value, bounds: &serde_json::Map<String, Json>) -> bool {
    bounds.iter().all(|(bound, limit)| {
        let ordering = match value.compare(&Value::from_json(limit)) {
            Some(ordering) => ordering,
            None => return false,
        };
        match bound.as_str() {
            "gt" => ordering == Ordering::Greater,
            "gte" => ordering != Ordering::Less,
            "lt" => ordering == Ordering::Less,
            "lte" => ordering != Ordering::Greater,
            _ => false,
        }
    })
}

fn wildcard_regex(pattern: &str) -> DocketResult<Regex> {
    let mut expression = String::from("(?s)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    expression.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            other => expression.push_str(&regex::escape(&other.to_string())),
        }
    }
    expression.push('$');
    Regex::new(&expression).map_err(|err| bad_request(&format!("invalid wildcard pattern: {}", err)))
}

pub(crate) fn bad_request(reason: &str) -> DocketError {
    log::error!("In-memory store rejected query: {}", reason);
    DocketError::new(
        &format!("Query rejected: {}", reason),
        ErrorKind::InfrastructureError(InfrastructureCause::Status(400)),
    )
}
