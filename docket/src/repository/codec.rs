use super::Aggregate;
use crate::common::{Document, STORE_METADATA_FIELDS};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::Hit;
use std::sync::Arc;

/// Function that rebuilds an aggregate from its primitives.
pub type AggregateFactory<T> = Arc<dyn Fn(Document) -> DocketResult<T> + Send + Sync>;

/// Converts between aggregates and stored documents.
///
/// Decoding strips the keys the engine adds to a stored document before handing
/// it to the factory, so the factory sees exactly what `to_primitives` wrote.
pub struct AggregateCodec<T> {
    factory: AggregateFactory<T>,
}

impl<T> Clone for AggregateCodec<T> {
    fn clone(&self) -> Self {
        AggregateCodec {
            factory: self.factory.clone(),
        }
    }
}

impl<T: Aggregate> AggregateCodec<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(Document) -> DocketResult<T> + Send + Sync + 'static,
    {
        AggregateCodec {
            factory: Arc::new(factory),
        }
    }

    /// Rebuilds one aggregate from a hit.
    ///
    /// # Errors
    ///
    /// Any factory failure is reported as `MalformedDocument` naming the hit id,
    /// with the factory's error as its cause.
    pub fn decode(&self, hit: Hit) -> DocketResult<T> {
        let id = hit.id().to_string();
        let mut source = hit.into_source();
        for field in STORE_METADATA_FIELDS {
            source.remove(field);
        }

        (self.factory)(source).map_err(|err| {
            log::error!("Failed to decode document {}: {}", id, err);
            DocketError::new_with_cause(
                &format!("Document {} could not be decoded", id),
                ErrorKind::MalformedDocument,
                err,
            )
        })
    }

    /// Decodes hits in order, stopping at the first failure.
    pub fn decode_many(&self, hits: Vec<Hit>) -> DocketResult<Vec<T>> {
        hits.into_iter().map(|hit| self.decode(hit)).collect()
    }

    /// Projects an aggregate into the id and document it is stored as.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDocument` if the aggregate's identity is empty.
    pub fn encode(&self, aggregate: &T) -> DocketResult<(String, Document)> {
        let identity = aggregate.identity();
        if identity.is_empty() {
            log::error!("Cannot store an aggregate with an empty identity");
            return Err(DocketError::new(
                "Aggregate identity cannot be empty",
                ErrorKind::MalformedDocument,
            ));
        }
        Ok((identity, aggregate.to_primitives()))
    }
}
