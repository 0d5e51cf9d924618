use docket::errors::{DocketError, DocketResult, ErrorKind};
use parking_lot::RwLock;
use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the engine's base URL.
pub const ELASTIC_URL_ENV: &str = "DOCKET_ELASTIC_URL";
/// Environment variable holding the connect timeout in milliseconds.
pub const ELASTIC_CONNECT_TIMEOUT_ENV: &str = "DOCKET_ELASTIC_CONNECT_TIMEOUT_MS";
/// Environment variable holding the request timeout in milliseconds.
pub const ELASTIC_REQUEST_TIMEOUT_ENV: &str = "DOCKET_ELASTIC_REQUEST_TIMEOUT_MS";

pub const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings of an [ElasticStore](crate::ElasticStore).
///
/// Cloneable and thread-safe; clones share the same settings.
///
/// ```rust,ignore
/// let config = ElasticConfig::builder()
///     .base_url("http://search.internal:9200")
///     .connect_timeout(Duration::from_secs(2))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct ElasticConfig {
    inner: Arc<ElasticConfigInner>,
}

impl ElasticConfig {
    /// Creates a configuration pointing at a local engine.
    pub fn new() -> ElasticConfig {
        ElasticConfig {
            inner: Arc::new(ElasticConfigInner::new()),
        }
    }

    pub fn builder() -> ElasticConfigBuilder {
        ElasticConfigBuilder::new()
    }

    /// Reads the configuration from `DOCKET_ELASTIC_URL` and the optional
    /// `DOCKET_ELASTIC_CONNECT_TIMEOUT_MS` / `DOCKET_ELASTIC_REQUEST_TIMEOUT_MS`.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a variable is set to an unusable value.
    pub fn from_env() -> DocketResult<ElasticConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> DocketResult<ElasticConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ElasticConfig::builder();
        if let Some(url) = lookup(ELASTIC_URL_ENV) {
            builder = builder.base_url(&url);
        }
        if let Some(millis) = lookup(ELASTIC_CONNECT_TIMEOUT_ENV) {
            builder = builder.connect_timeout(parse_millis(ELASTIC_CONNECT_TIMEOUT_ENV, &millis)?);
        }
        if let Some(millis) = lookup(ELASTIC_REQUEST_TIMEOUT_ENV) {
            builder = builder.request_timeout(parse_millis(ELASTIC_REQUEST_TIMEOUT_ENV, &millis)?);
        }
        builder.build()
    }

    /// Base URL of the engine, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.inner.base_url.read().clone()
    }

    /// Sets the engine's base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the URL cannot be parsed or is not http(s).
    pub fn set_base_url(&self, base_url: &str) -> DocketResult<()> {
        let url = Url::parse(base_url).map_err(|err| {
            invalid(&format!("Invalid engine URL {}: {}", base_url, err))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(&format!(
                "Engine URL {} must use http or https",
                base_url
            )));
        }
        *self.inner.base_url.write() = base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.connect_timeout_ms.load(Ordering::Relaxed))
    }

    pub fn set_connect_timeout(&self, timeout: Duration) -> DocketResult<()> {
        let millis = positive_millis("Connect timeout", timeout)?;
        self.inner.connect_timeout_ms.store(millis, Ordering::Relaxed);
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.request_timeout_ms.load(Ordering::Relaxed))
    }

    pub fn set_request_timeout(&self, timeout: Duration) -> DocketResult<()> {
        let millis = positive_millis("Request timeout", timeout)?;
        self.inner.request_timeout_ms.store(millis, Ordering::Relaxed);
        Ok(())
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        ElasticConfig::new()
    }
}

#[derive(Debug)]
struct ElasticConfigInner {
    base_url: RwLock<String>,
    connect_timeout_ms: AtomicU64,
    request_timeout_ms: AtomicU64,
}

impl ElasticConfigInner {
    fn new() -> ElasticConfigInner {
        ElasticConfigInner {
            base_url: RwLock::new(DEFAULT_ELASTIC_URL.to_string()),
            connect_timeout_ms: AtomicU64::new(DEFAULT_CONNECT_TIMEOUT.as_millis() as u64),
            request_timeout_ms: AtomicU64::new(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64),
        }
    }
}

/// Builder for [ElasticConfig]. The first invalid setting is reported by `build`.
pub struct ElasticConfigBuilder {
    error: Option<DocketError>,
    config: ElasticConfig,
}

impl ElasticConfigBuilder {
    pub fn new() -> ElasticConfigBuilder {
        ElasticConfigBuilder {
            error: None,
            config: ElasticConfig::new(),
        }
    }

    pub fn base_url(self, base_url: &str) -> Self {
        self.apply(|config| config.set_base_url(base_url))
    }

    pub fn connect_timeout(self, timeout: Duration) -> Self {
        self.apply(|config| config.set_connect_timeout(timeout))
    }

    pub fn request_timeout(self, timeout: Duration) -> Self {
        self.apply(|config| config.set_request_timeout(timeout))
    }

    pub fn build(self) -> DocketResult<ElasticConfig> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.config),
        }
    }

    fn apply<F>(mut self, setting: F) -> Self
    where
        F: FnOnce(&ElasticConfig) -> DocketResult<()>,
    {
        if self.error.is_none() {
            if let Err(err) = setting(&self.config) {
                self.error = Some(err);
            }
        }
        self
    }
}

impl Default for ElasticConfigBuilder {
    fn default() -> Self {
        ElasticConfigBuilder::new()
    }
}

fn parse_millis(variable: &str, raw: &str) -> DocketResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|err| invalid(&format!("{} must be a number of milliseconds: {}", variable, err)))
}

fn positive_millis(name: &str, timeout: Duration) -> DocketResult<u64> {
    let millis = timeout.as_millis();
    if millis == 0 {
        return Err(invalid(&format!("{} must be at least one millisecond", name)));
    }
    Ok(u64::try_from(millis).unwrap_or(u64::MAX))
}

fn invalid(message: &str) -> DocketError {
    log::error!("{}", message);
    DocketError::new(message, ErrorKind::InvalidConfiguration)
}
