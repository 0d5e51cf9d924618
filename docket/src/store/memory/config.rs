use std::time::Duration;

/// Result window the engine serves when a search names no `size`.
pub const DEFAULT_SEARCH_SIZE: u64 = 10;

/// Largest `from + size` the engine accepts for one search.
pub const DEFAULT_MAX_RESULT_WINDOW: u64 = 10_000;

/// Configuration for an [InMemoryStore](super::InMemoryStore).
///
/// The defaults mirror the limits of a stock search engine so code exercised
/// against the in-memory store pages the same way it would against a live
/// cluster. `latency` delays every request, which lets deadline handling be
/// tested without a network.
///
/// ```text
/// let config = InMemoryStoreConfig::new()
///     .with_max_result_window(100)
///     .with_latency(Duration::from_millis(50));
/// let store = InMemoryStore::new(config);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStoreConfig {
    default_search_size: u64,
    max_result_window: u64,
    latency: Option<Duration>,
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            default_search_size: DEFAULT_SEARCH_SIZE,
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
            latency: None,
        }
    }

    pub fn with_default_search_size(mut self, size: u64) -> Self {
        self.default_search_size = size;
        self
    }

    pub fn with_max_result_window(mut self, window: u64) -> Self {
        self.max_result_window = window;
        self
    }

    /// Delays every search and write by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn default_search_size(&self) -> u64 {
        self.default_search_size
    }

    pub fn max_result_window(&self) -> u64 {
        self.max_result_window
    }

    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        InMemoryStoreConfig::new()
    }
}
