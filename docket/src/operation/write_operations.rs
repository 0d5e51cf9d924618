use super::PersistOptions;
use crate::common::Document;
use crate::docket_config::RepositoryConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind, InfrastructureCause};
use crate::store::DocumentStore;

/// Writes documents to a store under a deadline.
///
/// A write is an upsert keyed by id: the stored document is replaced whole.
/// Every store failure reaches the caller as an `InfrastructureError`.
#[derive(Clone)]
pub struct WriteExecutor {
    store: DocumentStore,
    config: RepositoryConfig,
}

impl WriteExecutor {
    pub fn new(store: DocumentStore, config: RepositoryConfig) -> Self {
        WriteExecutor { store, config }
    }

    pub async fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &PersistOptions,
    ) -> DocketResult<()> {
        let visibility = options
            .get_visibility()
            .unwrap_or_else(|| self.config.default_visibility());
        let deadline = options
            .get_timeout()
            .unwrap_or_else(|| self.config.request_timeout());

        let write = self.store.write(collection, id, document, visibility);
        match tokio::time::timeout(deadline, write).await {
            Ok(Ok(())) => {
                log::debug!("Persisted {} in {} ({})", id, collection, visibility);
                Ok(())
            }
            Ok(Err(err)) => {
                log::error!("Failed to persist {} in {}: {}", id, collection, err);
                Err(write_failure(err, id, collection))
            }
            Err(elapsed) => {
                log::error!("Persisting {} in {} exceeded its deadline of {:?}", id, collection, deadline);
                Err(DocketError::from(elapsed).with_collection(collection))
            }
        }
    }
}

fn write_failure(err: DocketError, id: &str, collection: &str) -> DocketError {
    match err.kind() {
        ErrorKind::InfrastructureError(_) => err.with_collection(collection),
        _ => DocketError::new_with_cause(
            &format!("Store failed to write {} to {}", id, collection),
            ErrorKind::InfrastructureError(InfrastructureCause::Protocol),
            err,
        )
        .with_collection(collection),
    }
}
