use std::time::Duration;

use netfile_api::{Client, Credentials, FilingElementQuery, FilingQuery, Query};
use oakfinance_lib::fetch::{FetchError, PaginatedFetcher, RetryPolicy};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        jitter: false,
    }
}

fn fetcher_for(server: &MockServer, max_attempts: u32) -> PaginatedFetcher<Client> {
    let client =
        Client::with_base_url(&server.uri(), Credentials::new("key", "secret"), "COAK").unwrap();
    PaginatedFetcher::new(client).with_policy(fast_policy(max_attempts))
}

fn page(offset: u64, count: u64, total: u64) -> Value {
    let results: Vec<Value> = (offset..offset + count)
        .map(|n| json!({"filingNid": n.to_string()}))
        .collect();
    json!({
        "results": results,
        "hasNextPage": offset + count < total,
        "totalCount": total,
        "limit": 1000,
        "offset": offset,
    })
}

#[tokio::test]
async fn pulls_every_page_in_order() {
    let server = MockServer::start().await;
    for (offset, count) in [(0u64, 1000u64), (1000, 1000), (2000, 500)] {
        Mock::given(method("GET"))
            .and(path("/filing/v101/filings"))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(offset, count, 2500)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = fetcher_for(&server, 5);
    let records: Vec<Value> = fetcher.fetch_all(FilingQuery::default()).await.unwrap();

    assert_eq!(records.len(), 2500);
    assert_eq!(records[0]["filingNid"], "0");
    assert_eq!(records[2499]["filingNid"], "2499");
    let summary = fetcher.tracker().summary();
    assert_eq!(summary.requests_made, 3);
    assert_eq!(summary.requests_succeeded, 3);
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/filing/v101/filings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(4)
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filing/v101/filings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 3, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 5);
    let records: Vec<Value> = fetcher.fetch_all(FilingQuery::default()).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(fetcher.tracker().summary().requests_retried, 4);
}

#[tokio::test]
async fn gives_up_after_the_attempt_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/filing/v101/filings"))
        .respond_with(ResponseTemplate::new(502))
        .expect(5)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 5);
    let err = fetcher
        .fetch_all::<Value, _>(FilingQuery::default())
        .await
        .unwrap_err();

    match err {
        FetchError::Exhausted { attempts, .. } => assert_eq!(attempts, 5),
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn rejected_parts_flag_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/filing/v101/filing-elements"))
        .and(query_param("parts", "All"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parts not supported"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filing/v101/filing-elements"))
        .and(query_param_is_missing("parts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"elementNid": "e-1", "filingNid": "f-1"}],
            "hasNextPage": false,
            "totalCount": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 5);
    let records: Vec<Value> = fetcher
        .fetch_all(FilingElementQuery::default().with_parts())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(fetcher.tracker().summary().queries_downgraded, 1);
}

#[tokio::test]
async fn per_filing_pull_honors_skip_list() {
    let server = MockServer::start().await;
    for filing in ["f-1", "f-3"] {
        Mock::given(method("GET"))
            .and(path("/filing/v101/filing-elements"))
            .and(query_param("filingNid", filing))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"elementNid": format!("{}-a", filing), "filingNid": filing}],
                "hasNextPage": false,
                "totalCount": 1,
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/filing/v101/filing-elements"))
        .and(query_param("filingNid", "f-2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 5);
    let parents = vec!["f-1".to_string(), "f-2".to_string(), "f-3".to_string()];
    let skip = vec!["f-2".to_string()];
    let records: Vec<Value> = fetcher
        .fetch_by_parents(FilingElementQuery::default(), &parents, &skip)
        .await
        .unwrap();

    let ids: Vec<&str> = records
        .iter()
        .filter_map(|r| r["elementNid"].as_str())
        .collect();
    assert_eq!(ids, vec!["f-1-a", "f-3-a"]);
    assert_eq!(fetcher.tracker().summary().parents_skipped, 1);
}
