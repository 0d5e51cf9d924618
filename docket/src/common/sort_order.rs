use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{DocketError, DocketResult, ErrorKind};

/// Specifies the direction for sorting search results.
///
/// # Variants
/// - `Ascending`: smallest to largest (A to Z, 0 to 9)
/// - `Descending`: largest to smallest (Z to A, 9 to 0)
///
/// # Usage
/// ```text
/// let criteria = Criteria::new().order_by("name", SortOrder::Ascending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Sort in ascending order
    #[default]
    Ascending,
    /// Sort in descending order
    Descending,
}

impl SortOrder {
    /// The engine's token for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DocketError;

    fn from_str(s: &str) -> DocketResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => {
                log::error!("Unknown sort direction {}", other);
                Err(DocketError::new(
                    &format!("Unknown sort direction: {}", other),
                    ErrorKind::InvalidCriteria,
                ))
            }
        }
    }
}
