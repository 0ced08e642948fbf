use crate::model::{Links, PaginationInfo};
use serde_json::{json, Map, Value};

/// Pagination links in `self, first, last, prev, next` order; absent
/// directions are skipped
pub fn pagination_links(info: &PaginationInfo) -> Links {
    let mut links = Links::new();
    let candidates = [
        ("self", &info.self_link),
        ("first", &info.first),
        ("last", &info.last),
        ("prev", &info.prev),
        ("next", &info.next),
    ];
    for (name, url) in candidates {
        if let Some(url) = url {
            links.insert(name, url.as_str());
        }
    }
    links
}

/// Counters merged into the top-level `meta`
pub fn pagination_meta(info: &PaginationInfo) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("record_count".to_string(), json!(info.record_count));
    meta.insert("page_count".to_string(), json!(info.page_count));
    meta.insert("page_limit".to_string(), json!(info.page_limit));
    meta
}

fn page_url(base_path: &str, page: u64, limit: u64) -> String {
    let separator = if base_path.contains('?') { '&' } else { '?' };
    format!("{}{}page={}&limit={}", base_path, separator, page, limit)
}

/// Pagination details for `page` (1-based) of a result set of `total`
/// records. There is always at least one page.
pub fn paginate(base_path: &str, page: u64, limit: u64, total: u64) -> PaginationInfo {
    let limit = limit.max(1);
    let page_count = total.div_ceil(limit).max(1);
    let page = page.clamp(1, page_count);

    PaginationInfo {
        self_link: Some(page_url(base_path, page, limit)),
        first: Some(page_url(base_path, 1, limit)),
        last: Some(page_url(base_path, page_count, limit)),
        prev: (page > 1).then(|| page_url(base_path, page - 1, limit)),
        next: (page < page_count).then(|| page_url(base_path, page + 1, limit)),
        record_count: total,
        page_count,
        page_limit: limit,
    }
}
