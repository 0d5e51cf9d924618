//! Native query representation and the criteria translator.
//!
//! The translator is a pure function from [Criteria](crate::criteria::Criteria)
//! to [NativeQuery]; it performs no I/O and produces the same query for the
//! same criteria every time.

mod native_query;
mod translator;

pub use native_query::*;
pub use translator::*;
