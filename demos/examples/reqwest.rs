//! Stale-if-error with reqwest-middleware.
//!
//! A toy in-memory cache sits behind `StaleIfErrorMiddleware`. The origin at
//! `127.0.0.1:9` refuses connections, so every request falls back to the
//! cache, which serves the seeded entry only while it is within max-stale.
//!
//! Fallback counters are exported through a Prometheus recorder and printed
//! at the end.
//!
//! Run:
//!   RUST_LOG=info,stalebox=debug cargo run -p stalebox-demos --example reqwest

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Extensions, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::{Client, Request, Response};
use reqwest_middleware::{ClientBuilder, Middleware, Next, Result};
use stalebox_reqwest::{CacheDirectives, StaleConfig, StaleFallbackPolicy, StaleIfErrorMiddleware};
use tracing::info;
use tracing_subscriber::EnvFilter;

const URL: &str = "http://127.0.0.1:9/quote";

#[derive(Clone)]
struct Entry {
    stored_at: Instant,
    ttl: Duration,
    body: Bytes,
}

/// Caches successful GET bodies and answers `only-if-cached` requests.
#[derive(Clone, Default)]
struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    fn seed(&self, url: &str, age: Duration, ttl: Duration, body: &'static str) {
        let stored_at = Instant::now().checked_sub(age).unwrap_or_else(Instant::now);
        self.entries.lock().unwrap().insert(
            url.to_owned(),
            Entry {
                stored_at,
                ttl,
                body: Bytes::from_static(body.as_bytes()),
            },
        );
    }

    fn lookup(&self, url: &str, directives: &CacheDirectives) -> Response {
        let entry = self.entries.lock().unwrap().get(url).cloned();
        let allowed = Duration::from_secs(directives.max_stale.unwrap_or(0).into());
        let (status, body) = match entry {
            Some(entry) if entry.stored_at.elapsed().saturating_sub(entry.ttl) <= allowed => {
                info!(%url, max_stale = ?directives.max_stale, "serving stored entry");
                (StatusCode::OK, entry.body)
            }
            _ => {
                info!(%url, max_stale = ?directives.max_stale, "no usable entry");
                (StatusCode::GATEWAY_TIMEOUT, Bytes::new())
            }
        };
        let response = http::Response::builder()
            .status(status)
            .body(reqwest::Body::from(body))
            .unwrap();
        Response::from(response)
    }
}

#[async_trait]
impl Middleware for MemoryCache {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let url = req.url().to_string();
        let directives = CacheDirectives::from_headers(req.headers());
        if directives.only_if_cached {
            return Ok(self.lookup(&url, &directives));
        }

        let response = next.run(req, extensions).await?;
        if !response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.bytes().await?;
        info!(%url, bytes = body.len(), "storing response");
        self.entries.lock().unwrap().insert(
            url,
            Entry {
                stored_at: Instant::now(),
                ttl: Duration::from_secs(60),
                body: body.clone(),
            },
        );
        let response = http::Response::builder()
            .status(status)
            .body(reqwest::Body::from(body))
            .unwrap();
        Ok(Response::from(response))
    }
}

async fn fetch(policy: StaleFallbackPolicy, cache: &MemoryCache) -> Result<()> {
    let client = ClientBuilder::new(Client::new())
        .with(StaleIfErrorMiddleware::new(policy))
        .with(cache.clone())
        .build();

    let response = client.get(URL).send().await?;
    let source = response
        .headers()
        .get("x-stale-fallback")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    println!("max-stale: {}", policy.max_stale());
    println!("Status: {}", response.status());
    println!("Source: {source}");
    println!("Body: {}\n", response.text().await?);
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,stalebox=debug")),
        )
        .init();
    let metrics = PrometheusBuilder::new().install_recorder()?;

    // Expired 30 seconds ago.
    let cache = MemoryCache::default();
    cache.seed(
        URL,
        Duration::from_secs(90),
        Duration::from_secs(60),
        "Premature optimization is the root of all evil.",
    );

    println!("=== Within the stale bound ===");
    let config = StaleConfig::from_yaml("amount: 5\nunit: minutes\n")?;
    fetch(StaleFallbackPolicy::try_from(config)?, &cache).await?;

    println!("=== Beyond the stale bound ===");
    fetch(StaleFallbackPolicy::new(10, stalebox_reqwest::StaleUnit::Seconds)?, &cache).await?;

    println!("=== Metrics ===");
    println!("{}", metrics.render());

    Ok(())
}
