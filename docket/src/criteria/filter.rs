use std::fmt::{Display, Formatter};

use crate::common::Value;

/// Comparison a [Filter] applies between a field and its value.
///
/// Operators are usually parsed from the tokens an application layer receives
/// (`=`, `!=`, `>`, `>=`, `<`, `<=`, `CONTAINS`, `NOT_CONTAINS`). A token that is
/// not recognised is kept as [Operator::Unsupported] so the criteria can still be
/// built; translating it fails with `InvalidCriteria`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    /// A token no native predicate exists for.
    Unsupported(String),
}

impl Operator {
    /// Returns the wire token for this operator.
    pub fn token(&self) -> &str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT_CONTAINS",
            Operator::Unsupported(raw) => raw,
        }
    }

    /// Returns true for operators whose native predicate is negated.
    pub fn is_negated(&self) -> bool {
        matches!(self, Operator::NotEqual | Operator::NotContains)
    }
}

impl From<&str> for Operator {
    fn from(token: &str) -> Self {
        match token.trim() {
            "=" | "==" => Operator::Equal,
            "!=" | "<>" => Operator::NotEqual,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            word => match word.to_ascii_uppercase().as_str() {
                "EQUAL" => Operator::Equal,
                "NOT_EQUAL" => Operator::NotEqual,
                "GT" => Operator::Gt,
                "GTE" => Operator::Gte,
                "LT" => Operator::Lt,
                "LTE" => Operator::Lte,
                "CONTAINS" => Operator::Contains,
                "NOT_CONTAINS" => Operator::NotContains,
                _ => Operator::Unsupported(token.to_string()),
            },
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A single condition on one field of the stored documents.
///
/// Field names are opaque: they refer to keys of the aggregate's primitive
/// projection and are not checked against any schema here.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    operator: Operator,
    value: Value,
}

impl Filter {
    pub fn new<T: Into<Value>>(field: &str, operator: Operator, value: T) -> Self {
        Filter {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    /// Builds a filter from the string triple an application layer receives.
    ///
    /// The value is read as a literal: `true`/`false` become booleans, integers
    /// and decimals become numbers, anything else stays a string. Quote a value
    /// (`"10"`) to keep it a string. `CONTAINS`/`NOT_CONTAINS` values are always
    /// taken verbatim as substrings.
    pub fn from_values(field: &str, operator: &str, value: &str) -> Self {
        let operator = Operator::from(operator);
        let value = match operator {
            Operator::Contains | Operator::NotContains => Value::from(value),
            _ => parse_literal(value),
        };
        Filter::new(field, operator, value)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn parse_literal(value: &str) -> Value {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Value::from(&trimmed[1..trimmed.len() - 1]);
    }
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(number) = trimmed.parse::<i64>() {
        return Value::I64(number);
    }
    if let Ok(number) = trimmed.parse::<u64>() {
        return Value::U64(number);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && trimmed.contains(|c: char| c.is_ascii_digit()) => {
            Value::F64(number)
        }
        _ => Value::from(value),
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field, self.operator, self.value)
    }
}
