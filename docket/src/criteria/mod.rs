//! Engine-agnostic query descriptions.
//!
//! A [Criteria] is a conjunction of [Filter]s plus an optional [Order] and
//! [Pagination]. Domain and application code build one; the repository hands it
//! to the translator untouched.
//!
//! # Creating Criteria
//!
//! ```rust,ignore
//! use docket::criteria::{field, Criteria};
//!
//! let criteria = Criteria::new()
//!     .filter(field("name").contains("DDD"))
//!     .filter(field("price").lte(100));
//!
//! // or from the string triples an HTTP layer hands over
//! let criteria = Criteria::from_primitives(&[("name", "CONTAINS", "DDD")], None, None, None, None)?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `=`, `!=` (a sequence value means any-of / none-of)
//! - **Range**: `>`, `>=`, `<`, `<=`
//! - **Substring**: `CONTAINS`, `NOT_CONTAINS`
//!
//! Filters are always combined with AND; there is no OR or nested grouping.

mod criteria;
mod filter;
mod fluent;

pub use criteria::*;
pub use filter::*;
pub use fluent::*;
