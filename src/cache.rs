//! Cache-policy classification and header stamping.
//!
//! Assets are classified by naming convention: a path containing `.cache.`
//! carries a content hash and may be cached forever, a path containing
//! `.nocache.` must be revalidated on every load, and everything else passes
//! through untouched. The classification depends only on the request path and
//! is recomputed fresh per request.

use http::{HeaderName, HeaderValue, Request, Response, header};
use std::{
    task::{Context, Poll},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::{Layer, Service};

/// One year, the conventional ceiling for `max-age`.
pub const YEAR_IN_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Cache classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    /// Content-hashed asset (`.cache.` in the name), cacheable for a year.
    Immutable,
    /// Bootstrap asset (`.nocache.` in the name), never cacheable.
    NoCache,
    /// Neither marker; no cache headers are written.
    Default,
}

/// Classifies `path` by substring presence. `.nocache.` wins over `.cache.`
/// because every `.nocache.` path also contains `.cache.` as a substring.
pub fn classify(path: &str) -> CacheClass {
    if path.contains(".nocache.") {
        CacheClass::NoCache
    } else if path.contains(".cache.") {
        CacheClass::Immutable
    } else {
        CacheClass::Default
    }
}

/// Produces the header set for a classification at time `now`.
///
/// - [`CacheClass::Immutable`]: far-future `Expires`, a one-year immutable
///   `Cache-Control`, and a cleared `Pragma`.
/// - [`CacheClass::NoCache`]: `Date` and `Last-Modified` stamped with `now`,
///   `Expires` at the epoch, `Pragma: no-cache`, and a must-revalidate
///   `Cache-Control`. `no-store` is deliberately absent: it would disable
///   offline application storage in some browsers.
/// - [`CacheClass::Default`]: empty.
pub fn headers_for(class: CacheClass, now: SystemTime) -> Vec<(HeaderName, HeaderValue)> {
    match class {
        CacheClass::Immutable => {
            let expires = now + Duration::from_secs(YEAR_IN_SECONDS);
            vec![
                (header::EXPIRES, http_date(expires)),
                (
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("max-age=31536000, public, immutable"),
                ),
                (header::PRAGMA, HeaderValue::from_static("")),
            ]
        }
        CacheClass::NoCache => vec![
            (header::DATE, http_date(now)),
            (header::LAST_MODIFIED, http_date(now)),
            (header::EXPIRES, http_date(UNIX_EPOCH)),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, must-revalidate, pre-check=0, post-check=0"),
            ),
        ],
        CacheClass::Default => Vec::new(),
    }
}

fn http_date(time: SystemTime) -> HeaderValue {
    // fmt_http_date output is always valid ASCII
    HeaderValue::from_str(&httpdate::fmt_http_date(time))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Layer that stamps cache-policy headers on every response.
///
/// Mount this outside the content dispatcher: the two write disjoint header
/// sets and the dispatcher never alters `Cache-Control`, so ordering between
/// them cannot race, but the policy must cover forwarded responses too.
#[derive(Debug, Clone, Default)]
pub struct CacheControlLayer;

impl CacheControlLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CacheControlLayer {
    type Service = CacheControlService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheControlService { inner }
    }
}

/// Service produced by [`CacheControlLayer`].
#[derive(Debug, Clone)]
pub struct CacheControlService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CacheControlService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let class = classify(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            if class != CacheClass::Default {
                tracing::debug!(?class, "stamping cache-policy headers");
                for (name, value) in headers_for(class, SystemTime::now()) {
                    response.headers_mut().insert(name, value);
                }
            }
            Ok(response)
        })
    }
}
