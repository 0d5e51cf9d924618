//! # Docket - Aggregate persistence over a search engine
//!
//! Docket maps domain aggregates to and from documents stored in a search
//! engine, so domain code can query and persist aggregates without depending on
//! the engine's query language.
//!
//! ## Key Features
//!
//! - **Engine-agnostic criteria**: filters, ordering and pagination as plain data
//! - **Full translation**: criteria become native engine queries, or fail up front
//! - **Exhaustive reads**: unpaginated searches page through every match
//! - **Absent collections**: a collection nobody wrote to reads as empty
//! - **Visibility control**: writes wait until searchable or return immediately
//! - **Pluggable engines**: an in-memory engine here, an HTTP engine in
//!   `docket_elastic_adapter`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docket::criteria::{field, Criteria};
//! use docket::repository::Repository;
//! use docket::store::memory::{InMemoryStore, InMemoryStoreConfig};
//! use docket::store::DocumentStore;
//!
//! let store = DocumentStore::new(InMemoryStore::new(InMemoryStoreConfig::new()));
//! let repository = Repository::new(store, "backoffice_courses", Course::from_primitives);
//!
//! repository.persist(&course).await?;
//!
//! let criteria = Criteria::new().filter(field("name").contains("DDD"));
//! let courses = repository.search_by_criteria(&criteria).await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Documents, values and sort order
//! - [`criteria`] - Engine-agnostic search criteria
//! - [`docket_config`] - Repository configuration
//! - [`errors`] - Error types and result definitions
//! - [`operation`] - Query and write execution
//! - [`query`] - Native queries and the criteria translator
//! - [`repository`] - Aggregates, codec and the generic repository
//! - [`store`] - Document store abstraction and the in-memory engine

pub mod common;
pub mod criteria;
pub mod docket_config;
pub mod errors;
pub mod operation;
pub mod query;
pub mod repository;
pub mod store;

#[cfg(test)]
mod tests {
    // Setup only one time throughout the crate.
    #[ctor::ctor]
    fn init() {
        colog::init();
    }
}
