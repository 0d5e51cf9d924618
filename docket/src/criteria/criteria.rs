use std::fmt::{Display, Formatter};

use crate::common::{SortOrder, Value};
use crate::errors::DocketResult;

use super::Filter;

/// Sort clause of a [Criteria].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    field: String,
    direction: SortOrder,
}

impl Order {
    pub fn new(field: &str, direction: SortOrder) -> Self {
        Order {
            field: field.to_string(),
            direction,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortOrder {
        self.direction
    }
}

/// Page window of a [Criteria]: skip `offset` matches, return at most `limit`.
///
/// A zero limit is representable but rejected when the criteria is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: u64,
    limit: u64,
}

impl Pagination {
    pub fn new(offset: u64, limit: u64) -> Self {
        Pagination { offset, limit }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// An engine-agnostic description of a query.
///
/// `Criteria` is plain data: a list of filters combined with AND, an optional
/// order and an optional page window. It does not look at field names or values;
/// the translator decides whether they make a valid native query.
///
/// Without an order the result order is whatever the store returns and must not
/// be relied upon. Without a page window a search returns every match.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::criteria::{field, Criteria};
/// use docket::common::SortOrder;
///
/// let criteria = Criteria::new()
///     .filter(field("name").contains("DDD"))
///     .filter(field("duration").contains("days"))
///     .order_by("name", SortOrder::Ascending)
///     .paginate(0, 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filters: Vec<Filter>,
    order: Option<Order>,
    pagination: Option<Pagination>,
}

impl Criteria {
    /// Creates a criteria matching every document.
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Creates a criteria from a list of filters.
    pub fn with_filters(filters: Vec<Filter>) -> Self {
        Criteria {
            filters,
            order: None,
            pagination: None,
        }
    }

    /// Builds a criteria from the primitives an application layer receives.
    ///
    /// `filters` are `(field, operator, value)` string triples; values are read as
    /// literals per [Filter::from_values]. `order_type` accepts
    /// `asc`/`desc`; `none` or an absent `order_by` leaves the criteria unordered.
    /// A page window is set only when `limit` is given; `offset` defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCriteria` for an unknown `order_type`.
    pub fn from_primitives(
        filters: &[(&str, &str, &str)],
        order_by: Option<&str>,
        order_type: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> DocketResult<Self> {
        let filters = filters
            .iter()
            .map(|(field, operator, value)| Filter::from_values(field, operator, value))
            .collect();

        let order = match (order_by, order_type) {
            (Some(field), Some(kind)) if kind.eq_ignore_ascii_case("none") || field.is_empty() => None,
            (Some(field), Some(kind)) => Some(Order::new(field, kind.parse()?)),
            (Some(field), None) if !field.is_empty() => Some(Order::new(field, SortOrder::Ascending)),
            _ => None,
        };

        let pagination = limit.map(|limit| Pagination::new(offset.unwrap_or(0), limit));

        Ok(Criteria {
            filters,
            order,
            pagination,
        })
    }

    /// Adds a filter, conjoined with the existing ones.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a filter on `field` from an operator token and a value.
    pub fn where_field<T: Into<Value>>(self, field: &str, operator: &str, value: T) -> Self {
        self.filter(Filter::new(field, operator.into(), value))
    }

    pub fn order_by(mut self, field: &str, direction: SortOrder) -> Self {
        self.order = Some(Order::new(field, direction));
        self
    }

    pub fn paginate(mut self, offset: u64, limit: u64) -> Self {
        self.pagination = Some(Pagination::new(offset, limit));
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.filters.is_empty() {
            write!(f, "(all)")?;
        } else {
            let parts: Vec<String> = self.filters.iter().map(|filter| filter.to_string()).collect();
            write!(f, "{}", parts.join(" && "))?;
        }
        if let Some(order) = &self.order {
            write!(f, " order by {} {}", order.field(), order.direction())?;
        }
        if let Some(page) = &self.pagination {
            write!(f, " offset {} limit {}", page.offset(), page.limit())?;
        }
        Ok(())
    }
}
