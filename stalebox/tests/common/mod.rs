//! In-memory cache double honouring `only-if-cached` and `max-stale`.

#![allow(dead_code)]

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use http::{Request, Response, StatusCode};
use stalebox::CacheDirectives;

/// Raised by [`TestCache`] when no stored entry satisfies the request.
#[derive(Debug, thiserror::Error)]
#[error("no cached response satisfies `{directives}`")]
pub struct CacheUnavailable {
    pub directives: CacheDirectives,
}

/// How [`TestCache`] reports an unsatisfiable cache-only request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissBehavior {
    /// Fail with [`CacheUnavailable`].
    Raise,
    /// Answer with a synthetic `504 Gateway Timeout`.
    GatewayTimeout,
}

/// A stored response with an explicit age.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub status: StatusCode,
    pub body: String,
    pub max_age: Duration,
    pub age: Duration,
}

impl StoredEntry {
    /// An entry still within its freshness lifetime.
    pub fn fresh(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_owned(),
            max_age: Duration::from_secs(2),
            age: Duration::from_secs(1),
        }
    }

    /// An entry whose freshness lifetime ended `overdue` ago.
    pub fn expired_by(body: &str, overdue: Duration) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_owned(),
            max_age: Duration::from_secs(1),
            age: Duration::from_secs(1) + overdue,
        }
    }

    fn staleness(&self) -> Duration {
        self.age.saturating_sub(self.max_age)
    }
}

pub struct TestCache {
    entry: Option<StoredEntry>,
    on_miss: MissBehavior,
    seen: Mutex<Vec<CacheDirectives>>,
}

impl TestCache {
    pub fn new(entry: StoredEntry, on_miss: MissBehavior) -> Self {
        Self {
            entry: Some(entry),
            on_miss,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn empty(on_miss: MissBehavior) -> Self {
        Self {
            entry: None,
            on_miss,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn execute(
        &self,
        request: Request<String>,
    ) -> Result<Response<String>, CacheUnavailable> {
        let directives = CacheDirectives::from_headers(request.headers());
        self.seen.lock().unwrap().push(directives);
        assert!(
            directives.only_if_cached,
            "test cache only serves cache-only requests"
        );

        let max_stale = Duration::from_secs(directives.max_stale.unwrap_or(0).into());
        match &self.entry {
            Some(entry) if entry.staleness() <= max_stale => Ok(Response::builder()
                .status(entry.status)
                .body(entry.body.clone())
                .unwrap()),
            _ => match self.on_miss {
                MissBehavior::Raise => Err(CacheUnavailable { directives }),
                MissBehavior::GatewayTimeout => Ok(Response::builder()
                    .status(StatusCode::GATEWAY_TIMEOUT)
                    .body(String::from("Unsatisfiable Request (only-if-cached)"))
                    .unwrap()),
            },
        }
    }

    /// Number of cache-only requests served.
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Directives of every cache-only request served.
    pub fn seen(&self) -> Vec<CacheDirectives> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn get(uri: &str) -> Request<String> {
    Request::get(uri).body(String::new()).unwrap()
}

pub fn respond(status: StatusCode, body: &str) -> Response<String> {
    Response::builder()
        .status(status)
        .body(body.to_owned())
        .unwrap()
}

pub fn connection_refused() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused")
}
