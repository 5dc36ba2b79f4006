//! Stale-if-error with a Tower client stack.
//!
//! The inner service plays both roles: requests carrying `only-if-cached`
//! are answered from a fixed cache entry, everything else goes to a flaky
//! origin that fails every other call.
//!
//! Fallback counters are exported through a Prometheus recorder and printed
//! at the end.
//!
//! Run:
//!   RUST_LOG=info,stalebox=debug cargo run -p stalebox-demos --example tower

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::{Request, Response, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;
use stalebox::CacheDirectives;
use stalebox_tower::{StaleFallbackPolicy, StaleIfError, StaleUnit};
use tower::{ServiceBuilder, ServiceExt, service_fn};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

async fn origin(calls: Arc<AtomicUsize>, req: Request<String>) -> Result<Response<String>, Infallible> {
    let directives = CacheDirectives::from_headers(req.headers());
    if directives.only_if_cached {
        let response = Response::builder()
            .status(StatusCode::OK)
            .body(format!("cached {} (max-stale={:?})", req.uri().path(), directives.max_stale))
            .unwrap();
        return Ok(response);
    }

    let n = calls.fetch_add(1, Ordering::SeqCst);
    let response = if n % 2 == 0 {
        info!(call = n, "origin answering");
        Response::builder()
            .status(StatusCode::OK)
            .body(format!("live {} #{n}", req.uri().path()))
            .unwrap()
    } else {
        warn!(call = n, "origin unavailable");
        Response::builder()
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .body(String::new())
            .unwrap()
    };
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,stalebox=debug")),
        )
        .init();
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let calls = Arc::new(AtomicUsize::new(0));
    let inner = service_fn(move |req| origin(Arc::clone(&calls), req));

    let service = ServiceBuilder::new()
        .layer(StaleIfError::new(StaleFallbackPolicy::new(12, StaleUnit::Hours)?))
        .service(inner);

    for _ in 0..4 {
        let request = Request::get("http://localhost/time").body(String::new())?;
        let response = service.clone().oneshot(request).await?;
        println!(
            "{} [{}] {}",
            response.status(),
            response
                .headers()
                .get("x-stale-fallback")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-"),
            response.body()
        );
    }

    println!("{}", metrics.render());
    Ok(())
}
