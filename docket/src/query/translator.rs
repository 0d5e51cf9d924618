use serde_json::{json, Map, Value as Json};

use crate::common::Value;
use crate::criteria::{Criteria, Filter, Operator, Pagination};
use crate::errors::{DocketError, DocketResult, ErrorKind};

use super::{NativeQuery, PageWindow};

/// Translates a [Criteria] into the engine's query DSL.
///
/// | operator               | native predicate                     | placement  |
/// |------------------------|--------------------------------------|------------|
/// | `=` scalar / sequence  | `term` / `terms`                     | `must`     |
/// | `!=` scalar / sequence | `term` / `terms`                     | `must_not` |
/// | `>` `>=` `<` `<=`      | `range` with `gt`/`gte`/`lt`/`lte`   | `must`     |
/// | `CONTAINS`             | `wildcard` `*value*`                 | `must`     |
/// | `NOT_CONTAINS`         | `wildcard` `*value*`                 | `must_not` |
///
/// Criteria without filters becomes `match_all`. Translation is all-or-nothing:
/// one invalid filter fails the whole criteria with `InvalidCriteria`.
pub struct CriteriaTranslator;

impl CriteriaTranslator {
    pub fn translate(criteria: &Criteria) -> DocketResult<NativeQuery> {
        let query = if criteria.has_filters() {
            Self::bool_query(criteria.filters())?
        } else {
            json!({ "match_all": {} })
        };

        let sort = match criteria.order() {
            Some(order) => {
                if order.field().is_empty() {
                    return Err(invalid("Sort field name cannot be empty"));
                }
                vec![json!({ order.field(): { "order": order.direction().as_str() } })]
            }
            None => Vec::new(),
        };

        let window = criteria.pagination().map(Self::page_window).transpose()?;

        let native = NativeQuery::new(query, sort, window);
        log::debug!("Translated criteria {} into {}", criteria, native.to_body());
        Ok(native)
    }

    fn bool_query(filters: &[Filter]) -> DocketResult<Json> {
        let mut must = Vec::new();
        let mut must_not = Vec::new();

        for filter in filters {
            let predicate = Self::predicate(filter)?;
            if filter.operator().is_negated() {
                must_not.push(predicate);
            } else {
                must.push(predicate);
            }
        }

        let mut clauses = Map::new();
        if !must.is_empty() {
            clauses.insert("must".to_string(), Json::Array(must));
        }
        if !must_not.is_empty() {
            clauses.insert("must_not".to_string(), Json::Array(must_not));
        }
        Ok(json!({ "bool": clauses }))
    }

    fn predicate(filter: &Filter) -> DocketResult<Json> {
        let field = filter.field();
        if field.is_empty() {
            return Err(invalid(&format!("Filter {} has an empty field name", filter)));
        }

        match filter.operator() {
            Operator::Equal | Operator::NotEqual => Self::term_predicate(filter),
            Operator::Gt => Self::range_predicate(filter, "gt"),
            Operator::Gte => Self::range_predicate(filter, "gte"),
            Operator::Lt => Self::range_predicate(filter, "lt"),
            Operator::Lte => Self::range_predicate(filter, "lte"),
            Operator::Contains | Operator::NotContains => Self::wildcard_predicate(filter),
            Operator::Unsupported(token) => Err(invalid(&format!(
                "Unsupported operator {} in filter {}",
                token, filter
            ))),
        }
    }

    fn term_predicate(filter: &Filter) -> DocketResult<Json> {
        match filter.value() {
            Value::Array(values) => {
                if values.is_empty() {
                    return Err(invalid(&format!("Filter {} has an empty value list", filter)));
                }
                let terms = values
                    .iter()
                    .map(|value| Self::scalar(filter, value))
                    .collect::<DocketResult<Vec<Json>>>()?;
                Ok(json!({ "terms": { filter.field(): terms } }))
            }
            value => {
                let term = Self::scalar(filter, value)?;
                Ok(json!({ "term": { filter.field(): term } }))
            }
        }
    }

    fn range_predicate(filter: &Filter, bound: &str) -> DocketResult<Json> {
        let value = filter.value();
        if !value.is_comparable() {
            return Err(invalid(&format!(
                "Filter {} needs a number or string bound",
                filter
            )));
        }
        Ok(json!({ "range": { filter.field(): { bound: value.to_json() } } }))
    }

    fn wildcard_predicate(filter: &Filter) -> DocketResult<Json> {
        let needle = filter
            .value()
            .as_string()
            .ok_or_else(|| invalid(&format!("Filter {} needs a string value", filter)))?;
        let pattern = format!("*{}*", escape_wildcard(needle));
        Ok(json!({ "wildcard": { filter.field(): { "value": pattern } } }))
    }

    fn scalar(filter: &Filter, value: &Value) -> DocketResult<Json> {
        match value {
            Value::Bool(_) | Value::I64(_) | Value::U64(_) | Value::F64(_) | Value::String(_) => {
                Ok(value.to_json())
            }
            _ => Err(invalid(&format!(
                "Filter {} needs scalar values, found {}",
                filter, value
            ))),
        }
    }

    fn page_window(pagination: Pagination) -> DocketResult<PageWindow> {
        if pagination.limit() == 0 {
            return Err(invalid("Pagination limit must be greater than zero"));
        }
        Ok(PageWindow::new(pagination.offset(), pagination.limit()))
    }
}

fn escape_wildcard(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn invalid(message: &str) -> DocketError {
    log::error!("{}", message);
    DocketError::new(message, ErrorKind::InvalidCriteria)
}
