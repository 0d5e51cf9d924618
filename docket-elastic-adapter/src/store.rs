use crate::{ElasticConfig, ElasticError};
use async_trait::async_trait;
use docket::common::Document;
use docket::errors::{DocketError, DocketResult};
use docket::query::NativeQuery;
use docket::store::{DocumentStoreProvider, Hit, SearchResponse, VisibilityMode};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Document store backed by an Elasticsearch-compatible engine.
///
/// # Characteristics
/// - **Collections are indices**: a collection name is used as the index name
/// - **Upserts**: writes index the document under its id, replacing it whole
/// - **Visibility**: `Wait` writes use `refresh=wait_for`, `Eventual` writes
///   `refresh=false`
/// - **Absent indices**: a search on a missing index reports `CollectionAbsent`
/// - **Scans**: points in time map onto the engine's `_pit` API; a scan page is
///   sent to `/_search` without an index, as the engine requires
///
/// Cloning is cheap; clones share one HTTP connection pool.
#[derive(Clone)]
pub struct ElasticStore {
    inner: Arc<ElasticStoreInner>,
}

impl ElasticStore {
    /// Connects to the engine and checks it answers.
    ///
    /// # Errors
    ///
    /// Returns `InfrastructureError` if the engine cannot be reached within the
    /// connect timeout or answers with a failure status.
    pub async fn connect(config: ElasticConfig) -> DocketResult<ElasticStore> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| DocketError::from(ElasticError::from(err)))?;

        let store = ElasticStore {
            inner: Arc::new(ElasticStoreInner { client, config }),
        };
        store.ping().await?;
        Ok(store)
    }

    pub fn config(&self) -> &ElasticConfig {
        &self.inner.config
    }

    /// Checks the engine answers within the connect timeout.
    pub async fn ping(&self) -> DocketResult<()> {
        let config = &self.inner.config;
        let base_url = config.base_url();
        let request = self.inner.client.get(format!("{}/", base_url)).send();

        let response = match tokio::time::timeout(config.connect_timeout(), request).await {
            Ok(response) => response.map_err(ElasticError::from),
            Err(_) => Err(ElasticError::Timeout(base_url.clone())),
        };
        let info = match response {
            Ok(response) => check(response).await,
            Err(err) => Err(err),
        }
        .map_err(|err| {
            log::error!("Engine at {} is not available: {}", base_url, err);
            DocketError::from(err)
        })?;

        let version = info
            .json::<ClusterInfo>()
            .await
            .ok()
            .and_then(|info| info.version)
            .map(|version| version.number)
            .unwrap_or_else(|| "unknown".to_string());
        log::info!("Connected to engine {} at {}", version, base_url);
        Ok(())
    }
}

#[async_trait]
impl DocumentStoreProvider for ElasticStore {
    async fn search(&self, collection: &str, query: &NativeQuery) -> DocketResult<SearchResponse> {
        self.inner.search(collection, query).await.map_err(|err| {
            if !err.is_index_not_found() {
                log::error!("Search on {} failed: {}", collection, err);
            }
            DocketError::from(err).with_collection(collection)
        })
    }

    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        visibility: VisibilityMode,
    ) -> DocketResult<()> {
        self.inner
            .write(collection, id, document, visibility)
            .await
            .map_err(|err| {
                log::error!("Write of {} to {} failed: {}", id, collection, err);
                DocketError::from(err).with_collection(collection)
            })
    }

    async fn drop_collection(&self, collection: &str) -> DocketResult<()> {
        self.inner.drop_collection(collection).await.map_err(|err| {
            log::error!("Dropping {} failed: {}", collection, err);
            DocketError::from(err).with_collection(collection)
        })
    }

    async fn open_point_in_time(&self, collection: &str, keep_alive: Duration) -> DocketResult<String> {
        self.inner
            .open_point_in_time(collection, keep_alive)
            .await
            .map_err(|err| {
                if !err.is_index_not_found() {
                    log::error!("Opening a point in time on {} failed: {}", collection, err);
                }
                DocketError::from(err).with_collection(collection)
            })
    }

    async fn close_point_in_time(&self, id: &str) -> DocketResult<()> {
        self.inner.close_point_in_time(id).await.map_err(|err| {
            log::error!("Closing point in time failed: {}", err);
            DocketError::from(err)
        })
    }
}

struct ElasticStoreInner {
    client: Client,
    config: ElasticConfig,
}

impl ElasticStoreInner {
    fn index_url(&self, collection: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url(),
            urlencoding::encode(collection)
        )
    }

    async fn search(
        &self,
        collection: &str,
        query: &NativeQuery,
    ) -> Result<SearchResponse, ElasticError> {
        let url = match query.scan() {
            Some(_) => format!("{}/_search", self.config.base_url()),
            None => format!("{}/_search", self.index_url(collection)),
        };
        let body = query.to_body();
        log::debug!("POST {} {}", url, body);

        let response = self.client.post(&url).json(&body).send().await?;
        let response = check(response).await?;
        let text = response.text().await?;
        let parsed: SearchBody = serde_json::from_str(&text)?;

        let total = parsed.hits.total.map(|total| match total {
            TotalBody::Count(count) => count,
            TotalBody::Object { value } => value,
        });
        let hits = parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let source = match hit.source {
                    Some(source) => Document::from_json(&source).map_err(|_| {
                        ElasticError::Protocol(format!("_source of {} is not an object", hit.id))
                    })?,
                    None => Document::new(),
                };
                Ok(Hit::new(&hit.id, source).with_sort_values(hit.sort))
            })
            .collect::<Result<Vec<Hit>, ElasticError>>()?;

        log::debug!("Search on {} returned {} hits", collection, hits.len());
        let response = SearchResponse::new(hits, total);
        Ok(match parsed.pit_id {
            Some(id) => response.with_point_in_time_id(&id),
            None => response,
        })
    }

    async fn open_point_in_time(
        &self,
        collection: &str,
        keep_alive: Duration,
    ) -> Result<String, ElasticError> {
        let url = format!("{}/_pit", self.index_url(collection));
        let keep_alive = format!("{}ms", keep_alive.as_millis());
        log::debug!("POST {} (keep_alive={})", url, keep_alive);

        let response = self
            .client
            .post(&url)
            .query(&[("keep_alive", keep_alive.as_str())])
            .send()
            .await?;
        let response = check(response).await?;
        let text = response.text().await?;
        let parsed: PointInTimeBody = serde_json::from_str(&text)?;
        Ok(parsed.id)
    }

    async fn close_point_in_time(&self, id: &str) -> Result<(), ElasticError> {
        let url = format!("{}/_pit", self.config.base_url());
        log::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .json(&json!({ "id": id }))
            .send()
            .await?;
        match check(response).await {
            Ok(_) => Ok(()),
            Err(err) if err.status() == Some(404) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        visibility: VisibilityMode,
    ) -> Result<(), ElasticError> {
        let url = format!(
            "{}/_doc/{}",
            self.index_url(collection),
            urlencoding::encode(id)
        );
        log::debug!("PUT {} (refresh={})", url, visibility.refresh_param());

        let response = self
            .client
            .put(&url)
            .query(&[("refresh", visibility.refresh_param())])
            .json(&document.to_json())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), ElasticError> {
        let url = self.index_url(collection);
        log::debug!("DELETE {}", url);

        let response = self.client.delete(&url).send().await?;
        match check(response).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_index_not_found() || err.status() == Some(404) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

async fn check(response: Response) -> Result<Response, ElasticError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ElasticError::from_response(status.as_u16(), &body))
}

#[derive(Deserialize)]
struct ClusterInfo {
    version: Option<VersionInfo>,
}

#[derive(Deserialize)]
struct VersionInfo {
    number: String,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    pit_id: Option<String>,
    hits: HitsBody,
}

#[derive(Deserialize)]
struct PointInTimeBody {
    id: String,
}

#[derive(Deserialize)]
struct HitsBody {
    #[serde(default)]
    total: Option<TotalBody>,
    #[serde(default)]
    hits: Vec<HitBody>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalBody {
    Count(u64),
    Object { value: u64 },
}

#[derive(Deserialize)]
struct HitBody {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Option<serde_json::Value>,
    #[serde(default)]
    sort: Vec<serde_json::Value>,
}
