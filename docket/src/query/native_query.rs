use serde_json::{json, Map, Value as Json};
use std::time::Duration;

/// Sort field that orders documents by their position in the engine. Scans use
/// it when the query has no sort of its own.
pub const SHARD_DOC_FIELD: &str = "_shard_doc";

/// Page window of a native query: `from` matches are skipped, at most `size` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    from: u64,
    size: u64,
}

impl PageWindow {
    pub fn new(from: u64, size: u64) -> Self {
        PageWindow { from, size }
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// A point-in-time view of a collection, opened by the store for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointInTime {
    id: String,
    keep_alive: Duration,
}

impl PointInTime {
    pub fn new(id: &str, keep_alive: Duration) -> Self {
        PointInTime {
            id: id.to_string(),
            keep_alive,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }
}

/// One page of a scan: up to `size` hits sorting after `search_after`, read
/// from a point-in-time.
///
/// Unlike a [PageWindow] a scan page is not bounded by the engine's maximum
/// result window, so a scan can read a collection of any size.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    size: u64,
    point_in_time: PointInTime,
    search_after: Option<Vec<Json>>,
}

impl ScanPage {
    pub fn new(size: u64, point_in_time: PointInTime, search_after: Option<Vec<Json>>) -> Self {
        ScanPage {
            size,
            point_in_time,
            search_after,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn point_in_time(&self) -> &PointInTime {
        &self.point_in_time
    }

    /// Sort values of the last hit of the previous page; `None` on the first page.
    pub fn search_after(&self) -> Option<&[Json]> {
        self.search_after.as_deref()
    }
}

/// A query in the engine's own query DSL.
///
/// Produced by the translator and passed through the executor to the store. The
/// executor only ever touches the paging (window or scan page); the query clause
/// is opaque to it.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeQuery {
    query: Json,
    sort: Vec<Json>,
    window: Option<PageWindow>,
    scan: Option<ScanPage>,
}

impl NativeQuery {
    pub(crate) fn new(query: Json, sort: Vec<Json>, window: Option<PageWindow>) -> Self {
        NativeQuery {
            query,
            sort,
            window,
            scan: None,
        }
    }

    /// A query matching every document, unsorted and unwindowed.
    pub fn match_all() -> Self {
        NativeQuery::new(json!({ "match_all": {} }), Vec::new(), None)
    }

    /// The query clause.
    pub fn query(&self) -> &Json {
        &self.query
    }

    /// The sort clauses, in priority order.
    pub fn sort(&self) -> &[Json] {
        &self.sort
    }

    /// The page window, if the caller asked for one.
    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    /// The scan page, if this query is one step of a scan.
    pub fn scan(&self) -> Option<&ScanPage> {
        self.scan.as_ref()
    }

    /// Returns a copy of this query restricted to the given page window.
    pub fn with_window(&self, window: PageWindow) -> NativeQuery {
        NativeQuery {
            query: self.query.clone(),
            sort: self.sort.clone(),
            window: Some(window),
            scan: None,
        }
    }

    /// Returns a copy of this query as one page of a scan.
    ///
    /// A query without sort clauses is sorted by [SHARD_DOC_FIELD] so every hit
    /// carries sort values the next page can resume after.
    pub fn with_scan(&self, scan: ScanPage) -> NativeQuery {
        let sort = if self.sort.is_empty() {
            vec![json!({ SHARD_DOC_FIELD: { "order": "asc" } })]
        } else {
            self.sort.clone()
        };
        NativeQuery {
            query: self.query.clone(),
            sort,
            window: None,
            scan: Some(scan),
        }
    }

    /// Renders the search request body.
    pub fn to_body(&self) -> Json {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.clone());
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), Json::Array(self.sort.clone()));
        }
        if let Some(window) = self.window {
            body.insert("from".to_string(), json!(window.from()));
            body.insert("size".to_string(), json!(window.size()));
        }
        if let Some(scan) = &self.scan {
            body.insert("size".to_string(), json!(scan.size()));
            if let Some(after) = scan.search_after() {
                body.insert("search_after".to_string(), Json::Array(after.to_vec()));
            }
            let pit = scan.point_in_time();
            body.insert(
                "pit".to_string(),
                json!({ "id": pit.id(), "keep_alive": format!("{}ms", pit.keep_alive().as_millis()) }),
            );
        }
        Json::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_all_body() {
        assert_eq!(NativeQuery::match_all().to_body(), json!({ "query": { "match_all": {} } }));
    }

    #[test]
    fn with_window_adds_from_and_size() {
        let query = NativeQuery::match_all().with_window(PageWindow::new(1000, 500));
        assert_eq!(
            query.to_body(),
            json!({ "query": { "match_all": {} }, "from": 1000, "size": 500 })
        );
    }

    #[test]
    fn first_scan_page_sorts_by_position() {
        let pit = PointInTime::new("pit-1", Duration::from_secs(60));
        let query = NativeQuery::match_all().with_scan(ScanPage::new(500, pit, None));
        assert_eq!(
            query.to_body(),
            json!({
                "query": { "match_all": {} },
                "sort": [{ "_shard_doc": { "order": "asc" } }],
                "size": 500,
                "pit": { "id": "pit-1", "keep_alive": "60000ms" }
            })
        );
    }

    #[test]
    fn later_scan_page_resumes_after_sort_values() {
        let sorted = NativeQuery::new(
            json!({ "match_all": {} }),
            vec![json!({ "name": { "order": "desc" } })],
            None,
        );
        let pit = PointInTime::new("pit-2", Duration::from_millis(1500));
        let query = sorted.with_scan(ScanPage::new(2, pit, Some(vec![json!("b"), json!(7)])));
        let body = query.to_body();
        assert_eq!(body["sort"], json!([{ "name": { "order": "desc" } }]));
        assert_eq!(body["search_after"], json!(["b", 7]));
        assert!(body.get("from").is_none());
    }

    #[test]
    fn window_and_scan_exclude_each_other() {
        let pit = PointInTime::new("pit-3", Duration::from_secs(1));
        let scanned = NativeQuery::match_all()
            .with_window(PageWindow::new(10, 10))
            .with_scan(ScanPage::new(5, pit, None));
        assert!(scanned.window().is_none());
        assert!(scanned.with_window(PageWindow::new(0, 1)).scan().is_none());
    }

    #[test]
    fn sort_is_rendered_in_order() {
        let query = NativeQuery::new(
            json!({ "match_all": {} }),
            vec![json!({ "name": { "order": "asc" } })],
            None,
        );
        assert_eq!(query.to_body()["sort"], json!([{ "name": { "order": "asc" } }]));
    }
}
