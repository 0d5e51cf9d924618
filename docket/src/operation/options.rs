use crate::store::VisibilityMode;
use std::time::Duration;

/// Per-call options of a search.
///
/// Unset values fall back to the repository's configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::operation::SearchOptions;
///
/// let options = SearchOptions::new().timeout(Duration::from_secs(2));
/// let courses = repository.search_all_with_options(&options).await?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    timeout: Option<Duration>,
}

impl SearchOptions {
    pub fn new() -> Self {
        SearchOptions { timeout: None }
    }

    /// Sets the deadline of the whole search, including every page request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Per-call options of a persist.
///
/// Unset values fall back to the repository's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOptions {
    visibility: Option<VisibilityMode>,
    timeout: Option<Duration>,
}

impl PersistOptions {
    pub fn new() -> Self {
        PersistOptions {
            visibility: None,
            timeout: None,
        }
    }

    pub fn visibility(mut self, visibility: VisibilityMode) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_visibility(&self) -> Option<VisibilityMode> {
        self.visibility
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Creates `PersistOptions` that return once the write is visible to searches.
pub fn wait_for_visibility() -> PersistOptions {
    PersistOptions::new().visibility(VisibilityMode::Wait)
}

/// Creates `PersistOptions` that return as soon as the store acknowledges the write.
pub fn eventually_visible() -> PersistOptions {
    PersistOptions::new().visibility(VisibilityMode::Eventual)
}

/// Creates `SearchOptions` with the given deadline.
pub fn search_timeout(timeout: Duration) -> SearchOptions {
    SearchOptions::new().timeout(timeout)
}
