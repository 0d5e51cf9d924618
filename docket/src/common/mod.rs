//! Common types shared across Docket: the primitive [Value] vocabulary, the
//! [Document] mapping aggregates are projected into, and [SortOrder].

mod document;
mod sort_order;
mod value;

pub use document::*;
pub use sort_order::*;
pub use value::*;

/// Keys the engine attaches to a stored document that are not part of the
/// aggregate's own projection.
pub const STORE_METADATA_FIELDS: &[&str] = &[
    "_id",
    "_index",
    "_score",
    "_version",
    "_seq_no",
    "_primary_term",
];
