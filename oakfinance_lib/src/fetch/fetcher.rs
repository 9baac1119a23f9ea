use std::time::Duration;

use async_trait::async_trait;
use netfile_api::types::Page;
use netfile_api::{Client, Query};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use super::cursor::{next_cursor, Cursor, PageMeta};
use super::retry::{with_retry, FetchTracker, RetryPolicy};
use super::FetchError;

/// Anything that can serve one page of a collection.
///
/// [`Client`] is the production implementation; tests script their own.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page<T, Q>(&self, query: &Q) -> Result<Page<T>, netfile_api::Error>
    where
        T: DeserializeOwned + Send,
        Q: Query + Send + Sync;
}

#[async_trait]
impl PageSource for Client {
    async fn fetch_page<T, Q>(&self, query: &Q) -> Result<Page<T>, netfile_api::Error>
    where
        T: DeserializeOwned + Send,
        Q: Query + Send + Sync,
    {
        self.get_page(query).await
    }
}

/// Walks paginated collections to completion, one request at a time.
pub struct PaginatedFetcher<S> {
    source: S,
    policy: RetryPolicy,
    page_size: u64,
    page_delay: Duration,
    tracker: FetchTracker,
}

impl<S: PageSource> PaginatedFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: RetryPolicy::default(),
            page_size: netfile_api::DEFAULT_LIMIT,
            page_delay: Duration::ZERO,
            tracker: FetchTracker::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pause between consecutive requests of a pull.
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn tracker(&self) -> &FetchTracker {
        &self.tracker
    }

    /// Fetches every page of `query`'s collection, in API order.
    ///
    /// If the server rejects the query while `parts=All` is set, the flag is
    /// dropped for the rest of this pull and the page is requested once more.
    pub async fn fetch_all<T, Q>(&self, query: Q) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Send,
        Q: Query + Send + Sync,
    {
        let mut query = query;
        let mut cursor = Cursor::start(self.page_size);
        let mut downgraded = false;
        let mut pages = 0u64;
        let mut records: Vec<T> = Vec::new();

        loop {
            if pages > 0 && !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
            let request = query
                .clone()
                .with_offset(cursor.offset)
                .with_limit(cursor.limit);

            let page = match with_retry(&self.policy, &self.tracker, Q::ENDPOINT, || {
                self.source.fetch_page::<T, Q>(&request)
            })
            .await
            {
                Ok(page) => page,
                Err(FetchError::Rejected { endpoint, source })
                    if !downgraded && request.common().parts =>
                {
                    tracing::warn!(
                        "{} rejected parts=All ({}), continuing without it",
                        endpoint,
                        source
                    );
                    self.tracker.record_downgrade();
                    downgraded = true;
                    query = query.without_parts();
                    continue;
                }
                Err(e) => return Err(e),
            };

            pages += 1;
            let meta = PageMeta::from(&page);
            tracing::debug!(
                "{} offset {}: {} records (total {:?})",
                Q::ENDPOINT,
                cursor.offset,
                meta.result_count,
                meta.total_count
            );
            records.extend(page.results);

            match next_cursor(cursor, &meta) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        tracing::info!(
            "{}: {} records in {} pages",
            Q::ENDPOINT,
            records.len(),
            pages
        );
        Ok(records)
    }

    /// Runs one full pull per parent ID and concatenates the results in
    /// `parent_ids` order. IDs on `skip_list` are skipped without a request.
    pub async fn fetch_by_parents<T, Q>(
        &self,
        query: Q,
        parent_ids: &[String],
        skip_list: &[String],
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Send,
        Q: Query + Send + Sync,
    {
        let mut records = Vec::new();
        let mut requested = 0usize;
        for parent_id in parent_ids {
            if skip_list.iter().any(|skipped| skipped == parent_id) {
                tracing::warn!("Skipping {} for {} (skip list)", Q::ENDPOINT, parent_id);
                self.tracker.record_skip();
                continue;
            }
            if requested > 0 && !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
            requested += 1;
            let mut batch: Vec<T> = self
                .fetch_all(query.clone().with_parent_id(parent_id))
                .await?;
            records.append(&mut batch);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use netfile_api::{FilingElementQuery, FilingQuery, QueryCommon};
    use serde_json::{json, Value};

    /// Serves canned responses in order and records every request.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value, netfile_api::Error>>>,
        requests: Mutex<Vec<QueryCommon>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Value, netfile_api::Error>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<QueryCommon> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page<T, Q>(&self, query: &Q) -> Result<Page<T>, netfile_api::Error>
        where
            T: DeserializeOwned + Send,
            Q: Query + Send + Sync,
        {
            self.requests.lock().unwrap().push(*query.common());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of responses");
            next.map(|body| serde_json::from_value(body).unwrap())
        }
    }

    fn page(range: std::ops::Range<u64>, total: u64) -> Value {
        let results: Vec<Value> = range.clone().map(|n| json!({ "n": n })).collect();
        json!({
            "results": results,
            "hasNextPage": range.end < total,
            "totalCount": total,
            "offset": range.start,
            "limit": 1000
        })
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            jitter: false,
        }
    }

    #[tokio::test]
    async fn pagination_completeness() {
        let source = ScriptedSource::new(vec![
            Ok(page(0..1000, 2500)),
            Ok(page(1000..2000, 2500)),
            Ok(page(2000..2500, 2500)),
        ]);
        let fetcher = PaginatedFetcher::new(source);
        let records: Vec<Value> = fetcher.fetch_all(FilingQuery::default()).await.unwrap();

        assert_eq!(records.len(), 2500);
        assert_eq!(records[0]["n"], 0);
        assert_eq!(records[2499]["n"], 2499);
        let offsets: Vec<u64> = fetcher.source.requests().iter().map(|q| q.offset).collect();
        assert_eq!(offsets, vec![0, 1000, 2000]);
        assert_eq!(fetcher.tracker().summary().requests_made, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_inside_a_pull_keep_the_offset() {
        let source = ScriptedSource::new(vec![
            Ok(page(0..1000, 1500)),
            Err(netfile_api::Error::Timeout),
            Err(netfile_api::Error::HttpStatus {
                status: 502,
                body: String::new(),
            }),
            Ok(page(1000..1500, 1500)),
        ]);
        let fetcher = PaginatedFetcher::new(source).with_policy(quick_policy());
        let records: Vec<Value> = fetcher.fetch_all(FilingQuery::default()).await.unwrap();

        assert_eq!(records.len(), 1500);
        let offsets: Vec<u64> = fetcher.source.requests().iter().map(|q| q.offset).collect();
        assert_eq!(offsets, vec![0, 1000, 1000, 1000]);
        assert_eq!(fetcher.tracker().summary().requests_retried, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_pull_returns_no_partial_results() {
        let mut script = vec![Ok(page(0..1000, 2000))];
        script.extend((0..5).map(|_| Err(netfile_api::Error::Timeout)));
        let fetcher = PaginatedFetcher::new(ScriptedSource::new(script)).with_policy(quick_policy());

        let result: Result<Vec<Value>, _> = fetcher.fetch_all(FilingQuery::default()).await;
        assert!(matches!(
            result,
            Err(FetchError::Exhausted { attempts: 5, .. })
        ));
    }

    #[tokio::test]
    async fn rejected_parts_is_dropped_once() {
        let source = ScriptedSource::new(vec![
            Err(netfile_api::Error::HttpStatus {
                status: 400,
                body: "bad parts".into(),
            }),
            Ok(page(0..1000, 1200)),
            Ok(page(1000..1200, 1200)),
        ]);
        let fetcher = PaginatedFetcher::new(source);
        let records: Vec<Value> = fetcher
            .fetch_all(FilingElementQuery::default().with_parts())
            .await
            .unwrap();

        assert_eq!(records.len(), 1200);
        let parts: Vec<bool> = fetcher.source.requests().iter().map(|q| q.parts).collect();
        assert_eq!(parts, vec![true, false, false]);
        assert_eq!(fetcher.tracker().summary().queries_downgraded, 1);
    }

    #[tokio::test]
    async fn second_rejection_is_fatal() {
        let rejected = || {
            Err(netfile_api::Error::HttpStatus {
                status: 422,
                body: String::new(),
            })
        };
        let source = ScriptedSource::new(vec![rejected(), rejected()]);
        let fetcher = PaginatedFetcher::new(source);
        let result: Result<Vec<Value>, _> = fetcher
            .fetch_all(FilingElementQuery::default().with_parts())
            .await;

        assert!(matches!(result, Err(FetchError::Rejected { .. })));
        assert_eq!(fetcher.source.requests().len(), 2);
    }

    #[tokio::test]
    async fn by_parents_skips_listed_ids() {
        let source = ScriptedSource::new(vec![Ok(page(0..2, 2)), Ok(page(0..3, 3))]);
        let fetcher = PaginatedFetcher::new(source);
        let parents = vec!["a".to_string(), "bad".to_string(), "b".to_string()];
        let skip = vec!["bad".to_string()];

        let records: Vec<Value> = fetcher
            .fetch_by_parents(FilingElementQuery::default(), &parents, &skip)
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(fetcher.source.requests().len(), 2);
        assert_eq!(fetcher.tracker().summary().parents_skipped, 1);
    }
}
