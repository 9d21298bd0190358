//! Integration tests for `SerperClient` using wiremock HTTP mocks.

use marketscope_providers::{ProviderError, RetryPolicy, SearchProvider, SearchQuery, SerperClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SerperClient {
    SerperClient::with_base_url("test-key", 5, RetryPolicy::none(), base_url)
        .expect("client construction should not fail")
}

fn austin_query() -> SearchQuery {
    SearchQuery::new("we buy houses", "Austin", "TX")
}

#[tokio::test]
async fn search_posts_query_and_parses_organic_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "test-key"))
        .and(body_json(serde_json::json!({
            "q": "we buy houses Austin, TX",
            "num": 10,
            "gl": "us",
            "hl": "en",
            "autocorrect": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "searchParameters": { "q": "we buy houses Austin, TX" },
            "organic": [
                { "title": "Sell Your House Fast", "link": "https://www.opendoor.com/sell", "position": 1 },
                { "title": "Cash Offer Today", "link": "https://sub.austincashbuyers.com/offer", "position": 2 },
                { "title": "UK Buyer", "link": "https://www.homes.co.uk/austin", "position": 3 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client
        .search_organic(&austin_query())
        .await
        .expect("should parse results");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].domain, "opendoor.com");
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[0].title, "Sell Your House Fast");
    assert_eq!(results[1].domain, "austincashbuyers.com");
    assert_eq!(results[1].rank, 2);
    assert_eq!(results[2].domain, "homes.co.uk");
    assert_eq!(results[2].rank, 3);
}

#[tokio::test]
async fn missing_organic_section_yields_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "searchParameters": { "q": "we buy houses Austin, TX" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client.search_organic(&austin_query()).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn rate_limit_surfaces_as_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_organic(&austin_query()).await.unwrap_err();
    assert!(
        matches!(err, ProviderError::RateLimited { provider: "serper" }),
        "expected RateLimited, got {err:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_organic(&austin_query()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Deserialize { .. }));
}

#[tokio::test]
async fn server_errors_are_retried_then_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic": [ { "title": "Opendoor", "link": "https://opendoor.com/" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 1,
    };
    let client = SerperClient::with_base_url("test-key", 5, retry, &server.uri()).unwrap();
    let results = client.search_organic(&austin_query()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].domain, "opendoor.com");
}

#[tokio::test]
async fn provider_trait_degrades_to_empty_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client.search(&austin_query()).await;
    assert!(results.is_empty());
}
