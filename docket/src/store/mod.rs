//! Document store abstractions.
//!
//! [DocumentStoreProvider] is the engine seam, [DocumentStore] the shared handle
//! repositories hold. The [memory] module provides an in-process engine.

mod document_store;
mod hit;
pub mod memory;

pub use document_store::*;
pub use hit::*;
