use crate::common::Value;

use super::{Filter, Operator};

/// Creates a fluent filter builder for the specified field name.
///
/// ```ignore
/// let criteria = Criteria::new()
///     .filter(field("name").contains("DDD"))
///     .filter(field("duration").ne("1 day"));
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for a [Filter] on a specific field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Field equals the value; a sequence value matches any of its members.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::Equal, value)
    }

    /// Field differs from the value; a sequence value excludes all of its members.
    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::NotEqual, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::Gt, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::Gte, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::Lt, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.field_name, Operator::Lte, value)
    }

    /// Field contains the given substring.
    #[inline]
    pub fn contains(self, value: &str) -> Filter {
        Filter::new(&self.field_name, Operator::Contains, value)
    }

    /// Field does not contain the given substring.
    #[inline]
    pub fn not_contains(self, value: &str) -> Filter {
        Filter::new(&self.field_name, Operator::NotContains, value)
    }
}
