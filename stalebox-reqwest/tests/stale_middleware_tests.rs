//! Integration tests for StaleIfErrorMiddleware using wiremock.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::Extensions;
use pretty_assertions::assert_eq;
use reqwest::{Client, Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use stalebox_reqwest::{
    CacheDirectives, StaleFallbackPolicy, StaleIfErrorMiddleware, StaleUnit,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, thiserror::Error)]
#[error("cached response not available")]
struct CacheMiss;

#[derive(Debug, Clone, Copy)]
enum StubAnswer {
    Serve(&'static str),
    GatewayTimeout,
    Raise,
}

/// Stands in for an HTTP cache middleware: answers cache-only requests
/// itself and forwards everything else.
#[derive(Clone)]
struct StubCache {
    answer: StubAnswer,
    seen: Arc<Mutex<Vec<(String, Option<Vec<u8>>)>>>,
}

impl StubCache {
    fn new(answer: StubAnswer) -> Self {
        Self {
            answer,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Vec<(String, Option<Vec<u8>>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Middleware for StubCache {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let directives = CacheDirectives::from_headers(req.headers());
        if !directives.only_if_cached {
            return next.run(req, extensions).await;
        }

        let body = req
            .body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| bytes.to_vec());
        self.seen.lock().unwrap().push((directives.to_string(), body));

        match self.answer {
            StubAnswer::Serve(body) => Ok(http::Response::builder()
                .status(200)
                .body(body)
                .unwrap()
                .into()),
            StubAnswer::GatewayTimeout => Ok(http::Response::builder()
                .status(504)
                .body("")
                .unwrap()
                .into()),
            StubAnswer::Raise => Err(reqwest_middleware::Error::middleware(CacheMiss)),
        }
    }
}

fn client(middleware: StaleIfErrorMiddleware, cache: &StubCache) -> ClientWithMiddleware {
    ClientBuilder::new(Client::new())
        .with(middleware)
        .with(cache.clone())
        .build()
}

/// Test 1: successful network response passes through, cache untouched
#[tokio::test]
async fn test_network_success_bypasses_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("live"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Serve("cached"));
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let response = client
        .get(format!("{}/data", mock_server.uri()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-stale-fallback").unwrap(), "NETWORK");
    assert_eq!(response.text().await.unwrap(), "live");
    assert!(cache.seen().is_empty());
}

/// Test 2: server error falls back to the cache with the default bound
#[tokio::test]
async fn test_server_error_falls_back_to_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Serve("cached"));
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let response = client
        .get(format!("{}/data", mock_server.uri()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-stale-fallback").unwrap(), "CACHE");
    assert_eq!(response.text().await.unwrap(), "cached");
    assert_eq!(
        cache.seen(),
        vec![("only-if-cached, max-stale=2419200".to_owned(), None)]
    );
}

/// Test 3: connection failure falls back to the cache
#[tokio::test]
async fn test_connection_error_falls_back_to_cache() {
    // Nothing listens on port 1.
    let url = "http://127.0.0.1:1/data";

    let cache = StubCache::new(StubAnswer::Serve("stale"));
    let policy = StaleFallbackPolicy::new(4, StaleUnit::Seconds).unwrap();
    let client = client(StaleIfErrorMiddleware::new(policy), &cache);

    let response = client.get(url).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "stale");
    assert_eq!(cache.seen()[0].0, "only-if-cached, max-stale=4");
}

/// Test 4: cache failure is the error the caller sees
#[tokio::test]
async fn test_cache_error_is_propagated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Raise);
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let error = client
        .get(format!("{}/data", mock_server.uri()))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(error, reqwest_middleware::Error::Middleware(_)));
    assert_eq!(error.to_string(), "cached response not available");
}

/// Test 5: synthetic 504 from the cache is returned, not raised
#[tokio::test]
async fn test_cache_gateway_timeout_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::GatewayTimeout);
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let response = client
        .get(format!("{}/data", mock_server.uri()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 504);
    assert_eq!(response.headers().get("x-stale-fallback").unwrap(), "CACHE");
}

/// Test 6: request body is replayed against the cache
#[tokio::test]
async fn test_request_body_is_replayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Serve("cached"));
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let response = client
        .post(format!("{}/search", mock_server.uri()))
        .body("query=rust")
        .send()
        .await
        .unwrap();

    assert_eq!(response.text().await.unwrap(), "cached");
    assert_eq!(cache.seen()[0].1.as_deref(), Some(b"query=rust".as_slice()));
}

/// Test 7: custom and disabled status headers
#[tokio::test]
async fn test_status_header_configuration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Serve("cached"));
    let renamed = StaleIfErrorMiddleware::builder()
        .status_header(http::HeaderName::from_static("x-source"))
        .build();
    let response = client(renamed, &cache)
        .get(mock_server.uri())
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-source").unwrap(), "NETWORK");
    assert!(response.headers().get("x-stale-fallback").is_none());

    let silent = StaleIfErrorMiddleware::builder()
        .without_status_header()
        .build();
    let response = client(silent, &cache)
        .get(mock_server.uri())
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("x-stale-fallback").is_none());
}

/// Test 8: streaming request bodies cannot be replayed and skip the fallback
#[tokio::test]
async fn test_streaming_body_skips_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("origin down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = StubCache::new(StubAnswer::Serve("cached"));
    let client = client(StaleIfErrorMiddleware::default(), &cache);

    let chunks = futures::stream::iter(vec![
        Ok::<_, std::io::Error>("first "),
        Ok("second"),
    ]);
    let response = client
        .post(format!("{}/upload", mock_server.uri()))
        .body(reqwest::Body::wrap_stream(chunks))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert!(response.headers().get("x-stale-fallback").is_none());
    assert_eq!(response.text().await.unwrap(), "origin down");
    assert!(cache.seen().is_empty());
}
