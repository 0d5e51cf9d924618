use super::SearchOptions;
use crate::docket_config::RepositoryConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind, InfrastructureCause};
use crate::query::{NativeQuery, PointInTime, ScanPage};
use crate::store::{DocumentStore, Hit};
use serde_json::Value as Json;
use std::time::Duration;

/// Runs native queries against a store.
///
/// A query with a page window is sent once. A query without one is scanned: the
/// executor opens a point-in-time over the collection and requests pages of
/// `page_size` hits, each resuming after the sort values of the previous page's
/// last hit, until a page comes back short. The scan sees the collection as it
/// was when the point-in-time opened and is not bounded by the engine's maximum
/// result window.
///
/// A collection the store does not know is an empty result, not an error.
#[derive(Clone)]
pub struct QueryExecutor {
    store: DocumentStore,
    config: RepositoryConfig,
}

impl QueryExecutor {
    pub fn new(store: DocumentStore, config: RepositoryConfig) -> Self {
        QueryExecutor { store, config }
    }

    /// Executes `query` against `collection` and returns the hits in store order.
    ///
    /// The deadline covers the whole call, every page request included.
    ///
    /// # Errors
    ///
    /// Returns `InfrastructureError` with the collection attached when the store
    /// fails or the deadline passes.
    pub async fn execute(
        &self,
        collection: &str,
        query: &NativeQuery,
        options: &SearchOptions,
    ) -> DocketResult<Vec<Hit>> {
        let deadline = options
            .get_timeout()
            .unwrap_or_else(|| self.config.request_timeout());

        match tokio::time::timeout(deadline, self.fetch(collection, query)).await {
            Ok(Ok(hits)) => {
                log::debug!("Search on {} returned {} hits", collection, hits.len());
                Ok(hits)
            }
            Ok(Err(err)) if err.kind() == &ErrorKind::CollectionAbsent => {
                log::debug!("Collection {} does not exist, returning no hits", collection);
                Ok(Vec::new())
            }
            Ok(Err(err)) => Err(search_failure(err, collection)),
            Err(elapsed) => {
                log::error!("Search on {} exceeded its deadline of {:?}", collection, deadline);
                Err(DocketError::from(elapsed).with_collection(collection))
            }
        }
    }

    async fn fetch(&self, collection: &str, query: &NativeQuery) -> DocketResult<Vec<Hit>> {
        if query.window().is_some() {
            let response = self.store.search(collection, query).await?;
            return Ok(response.into_hits());
        }

        let keep_alive = self.config.scan_keep_alive();
        let mut point_in_time = self.store.open_point_in_time(collection, keep_alive).await?;
        let scanned = self
            .scan(collection, query, &mut point_in_time, keep_alive)
            .await;
        // an unclosed point-in-time expires with its keep-alive
        if let Err(err) = self.store.close_point_in_time(&point_in_time).await {
            log::warn!("Failed to close point in time on {}: {}", collection, err);
        }
        scanned
    }

    async fn scan(
        &self,
        collection: &str,
        query: &NativeQuery,
        point_in_time: &mut String,
        keep_alive: Duration,
    ) -> DocketResult<Vec<Hit>> {
        let page_size = self.config.page_size();
        let mut hits = Vec::new();
        let mut search_after: Option<Vec<Json>> = None;
        loop {
            let page = query.with_scan(ScanPage::new(
                page_size,
                PointInTime::new(point_in_time, keep_alive),
                search_after.take(),
            ));
            let response = self.store.search(collection, &page).await?;
            if let Some(renewed) = response.point_in_time_id() {
                *point_in_time = renewed.to_string();
            }

            let page_hits = response.into_hits();
            let returned = page_hits.len() as u64;
            let resume = page_hits.last().map(|hit| hit.sort_values().to_vec());
            hits.extend(page_hits);

            if returned < page_size {
                break;
            }
            match resume {
                Some(values) if !values.is_empty() => search_after = Some(values),
                _ => {
                    return Err(DocketError::new(
                        "Store returned a full scan page without sort values",
                        ErrorKind::InfrastructureError(InfrastructureCause::Protocol),
                    ))
                }
            }
        }
        Ok(hits)
    }
}

fn search_failure(err: DocketError, collection: &str) -> DocketError {
    log::error!("Search on {} failed: {}", collection, err);
    match err.kind() {
        ErrorKind::InfrastructureError(_) => err.with_collection(collection),
        _ => DocketError::new_with_cause(
            &format!("Store failed to search {}", collection),
            ErrorKind::InfrastructureError(InfrastructureCause::Protocol),
            err,
        )
        .with_collection(collection),
    }
}
