//! HTTP document store for Docket.
//!
//! [ElasticStore] talks to an Elasticsearch-compatible engine over its REST API
//! and plugs into a Docket repository through
//! [DocumentStore](docket::store::DocumentStore):
//!
//! ```rust,ignore
//! let config = ElasticConfig::from_env()?;
//! let store = DocumentStore::new(ElasticStore::connect(config).await?);
//! let repository = Repository::new(store, "backoffice_courses", Course::from_primitives);
//! ```

mod config;
mod error;
mod store;

pub use config::*;
pub use error::*;
pub use store::*;
