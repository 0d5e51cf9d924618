//! Aggregate persistence.
//!
//! [Repository] ties the pieces together: criteria translation, query execution
//! against a [DocumentStore](crate::store::DocumentStore) and decoding through an
//! [AggregateCodec].

mod aggregate;
mod codec;
mod repository;

pub use aggregate::*;
pub use codec::*;
pub use repository::*;
