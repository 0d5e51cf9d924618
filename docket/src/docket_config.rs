//! Configuration of repositories.

use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::VisibilityMode;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Page size the executor uses when scanning a collection to exhaustion.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Deadline applied to a repository call when none is given per call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the engine keeps a scan's point-in-time open between two pages.
pub const DEFAULT_SCAN_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Repository configuration.
///
/// Cloning is cheap and clones share state: a setting changed through one
/// handle is seen by every repository built from it.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::docket_config::RepositoryConfig;
///
/// let config = RepositoryConfig::builder()
///     .page_size(500)
///     .request_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct RepositoryConfig {
    inner: Arc<RepositoryConfigInner>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        RepositoryConfig {
            inner: Arc::new(RepositoryConfigInner::new()),
        }
    }

    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::new()
    }

    /// Number of hits requested per page when no page window is given.
    pub fn page_size(&self) -> u64 {
        self.inner.page_size.load(Ordering::Relaxed)
    }

    /// Sets the page size used by exhaustive scans.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `page_size` is zero.
    pub fn set_page_size(&self, page_size: u64) -> DocketResult<()> {
        if page_size == 0 {
            return Err(invalid("Page size must be greater than zero"));
        }
        self.inner.page_size.store(page_size, Ordering::Relaxed);
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.request_timeout_ms.load(Ordering::Relaxed))
    }

    /// Sets the default deadline of a repository call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the timeout is shorter than a millisecond.
    pub fn set_request_timeout(&self, timeout: Duration) -> DocketResult<()> {
        let millis = timeout.as_millis();
        if millis == 0 {
            return Err(invalid("Request timeout must be at least one millisecond"));
        }
        let millis = u64::try_from(millis).unwrap_or(u64::MAX);
        self.inner.request_timeout_ms.store(millis, Ordering::Relaxed);
        Ok(())
    }

    /// Keep-alive requested for the point-in-time an exhaustive scan reads from.
    pub fn scan_keep_alive(&self) -> Duration {
        Duration::from_millis(self.inner.scan_keep_alive_ms.load(Ordering::Relaxed))
    }

    /// Sets the scan keep-alive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the keep-alive is shorter than a millisecond.
    pub fn set_scan_keep_alive(&self, keep_alive: Duration) -> DocketResult<()> {
        let millis = keep_alive.as_millis();
        if millis == 0 {
            return Err(invalid("Scan keep-alive must be at least one millisecond"));
        }
        let millis = u64::try_from(millis).unwrap_or(u64::MAX);
        self.inner.scan_keep_alive_ms.store(millis, Ordering::Relaxed);
        Ok(())
    }

    pub fn default_visibility(&self) -> VisibilityMode {
        *self.inner.default_visibility.read()
    }

    pub fn set_default_visibility(&self, visibility: VisibilityMode) {
        *self.inner.default_visibility.write() = visibility;
    }
}

#[derive(Debug)]
struct RepositoryConfigInner {
    page_size: AtomicU64,
    request_timeout_ms: AtomicU64,
    scan_keep_alive_ms: AtomicU64,
    default_visibility: RwLock<VisibilityMode>,
}

impl RepositoryConfigInner {
    fn new() -> Self {
        RepositoryConfigInner {
            page_size: AtomicU64::new(DEFAULT_PAGE_SIZE),
            request_timeout_ms: AtomicU64::new(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64),
            scan_keep_alive_ms: AtomicU64::new(DEFAULT_SCAN_KEEP_ALIVE.as_millis() as u64),
            default_visibility: RwLock::new(VisibilityMode::default()),
        }
    }
}

/// Builder for [RepositoryConfig].
///
/// Captures the first invalid setting and reports it from [build](Self::build).
#[derive(Default)]
pub struct RepositoryConfigBuilder {
    error: Option<DocketError>,
    config: RepositoryConfig,
}

impl RepositoryConfigBuilder {
    pub fn new() -> Self {
        RepositoryConfigBuilder {
            error: None,
            config: RepositoryConfig::new(),
        }
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.config.set_page_size(page_size) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.config.set_request_timeout(timeout) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn scan_keep_alive(mut self, keep_alive: Duration) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.config.set_scan_keep_alive(keep_alive) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn default_visibility(self, visibility: VisibilityMode) -> Self {
        self.config.set_default_visibility(visibility);
        self
    }

    pub fn build(self) -> DocketResult<RepositoryConfig> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.config),
        }
    }
}

fn invalid(message: &str) -> DocketError {
    log::error!("{}", message);
    DocketError::new(message, ErrorKind::InvalidConfiguration)
}
