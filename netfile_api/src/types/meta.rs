use serde::{Deserialize, Deserializer};

/// One page of results, normalized across both API generations.
///
/// The current generation reports `hasNextPage`/`totalCount`/`limit`/`offset`;
/// the older one reports `totalMatchingCount`/`totalMatchingPages` and may put
/// its records under `filings` or `filers` instead of `results`.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub has_next_page: bool,
    pub total_count: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default = "Vec::new", alias = "filings", alias = "filers")]
    results: Vec<T>,
    has_next_page: Option<bool>,
    #[serde(alias = "totalMatchingCount")]
    total_count: Option<u64>,
    total_matching_pages: Option<u64>,
    current_page_number: Option<u64>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<T> From<Envelope<T>> for Page<T> {
    fn from(env: Envelope<T>) -> Self {
        let has_next_page = match env.has_next_page {
            Some(flag) => flag,
            None => match (env.offset, env.current_page_number, env.total_matching_pages) {
                (Some(offset), _, _) => env
                    .total_count
                    .is_some_and(|total| offset + (env.results.len() as u64) < total),
                // Older generation without offsets: 1-based page counter.
                (None, Some(page), Some(pages)) => page < pages,
                (None, _, _) => env
                    .total_count
                    .is_some_and(|total| (env.results.len() as u64) < total),
            },
        };
        Page {
            results: env.results,
            has_next_page,
            total_count: env.total_count,
            limit: env.limit,
            offset: env.offset,
        }
    }
}

impl<'de, T> Deserialize<'de> for Page<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Envelope::<T>::deserialize(deserializer).map(Page::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn current_generation_envelope() {
        let page: Page<Value> = serde_json::from_value(json!({
            "results": [{"id": 1}, {"id": 2}],
            "hasNextPage": true,
            "totalCount": 2500,
            "limit": 1000,
            "offset": 0,
            "pageNumber": 0,
            "count": 2
        }))
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert!(page.has_next_page);
        assert_eq!(page.total_count, Some(2500));
        assert_eq!(page.limit, Some(1000));
        assert_eq!(page.offset, Some(0));
    }

    #[test]
    fn older_generation_envelope_with_named_collection() {
        let page: Page<Value> = serde_json::from_value(json!({
            "filers": [{"id": 1}],
            "totalMatchingCount": 3,
            "totalMatchingPages": 3,
            "currentPageNumber": 1
        }))
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.total_count, Some(3));
        assert!(page.has_next_page);
    }

    #[test]
    fn older_generation_last_page_stops() {
        let page: Page<Value> = serde_json::from_value(json!({
            "filers": [{"id": 2001}],
            "totalMatchingCount": 2001,
            "totalMatchingPages": 3,
            "currentPageNumber": 3
        }))
        .unwrap();
        assert_eq!(page.total_count, Some(2001));
        assert!(!page.has_next_page);
    }

    #[test]
    fn derives_last_page_from_offset_and_total() {
        let page: Page<Value> = serde_json::from_value(json!({
            "results": [{"id": 1}],
            "totalCount": 11,
            "offset": 10,
            "limit": 10
        }))
        .unwrap();
        assert!(!page.has_next_page);
    }

    #[test]
    fn missing_results_is_empty_page() {
        let page: Page<Value> = serde_json::from_value(json!({"hasNextPage": false})).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_next_page);
    }
}
