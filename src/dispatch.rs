//! Content dispatch: substituting pre-encoded sibling files.
//!
//! For each request the dispatcher walks one decision chain: is an encoding
//! accepted, is the path exempt, does the source file exist, is the request
//! already for an encoded name, does the sibling exist, is the MIME type
//! resolvable. Exactly one of three outcomes is chosen: forward the request
//! unchanged, serve the sibling in place of the original, or redirect the
//! client to the sibling's own URL. Forwarding is the fallback at every
//! decision point; the dispatcher never produces an error response.

use crate::{
    ignore::IgnoreList,
    mime::MimeTable,
    negotiate::{EncodingCandidate, negotiate},
    resolve::PathResolver,
};
use axum::{body::Body, extract::Request, response::Response};
use http::{HeaderMap, HeaderValue, StatusCode, header, uri::PathAndQuery};
use serde::Deserialize;
use std::{
    path::Path,
    sync::Arc,
    task::{Context, Poll},
    time::SystemTime,
};
use tokio_util::io::ReaderStream;
use tower::{Layer, Service};

/// How a matched sibling is delivered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Serve the sibling's bytes under the original URL by rewriting the
    /// request for the inner static handler and forcing the response
    /// headers afterwards.
    #[default]
    Include,
    /// Redirect the client to the sibling's URL. The sibling request comes
    /// back through the dispatcher, which then streams the file directly.
    Redirect,
}

/// Immutable decision inputs shared by every request.
///
/// Built once at startup and shared via `Arc`; nothing here mutates during
/// steady-state traffic.
#[derive(Debug, Clone)]
pub struct PreEncodedSettings {
    pub resolver: PathResolver,
    pub candidates: Vec<EncodingCandidate>,
    pub ignore: IgnoreList,
    pub mime: MimeTable,
    pub mode: ServeMode,
}

impl PreEncodedSettings {
    /// Settings with the default candidate list (brotli preferred over
    /// gzip), the built-in ignore rules, the seeded MIME table, and include
    /// mode.
    pub fn new(doc_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(doc_root),
            candidates: vec![EncodingCandidate::brotli(), EncodingCandidate::gzip()],
            ignore: IgnoreList::new(),
            mime: MimeTable::new(),
            mode: ServeMode::Include,
        }
    }
}

/// Header overrides collected by the dispatcher before the inner static
/// handler runs.
///
/// The inner handler is not negotiation-aware: it sees a `.gz` path and
/// guesses a Content-Type from that extension. `ForcedHeaders` is the
/// explicit adapter around the response headers that makes the dispatcher
/// win: once applied, the Content-Type and Content-Encoding the inner
/// handler wrote are discarded and replaced. Use
/// [`force_content_type`](Self::force_content_type) to write the type that
/// must survive.
#[derive(Debug, Clone)]
pub struct ForcedHeaders {
    content_encoding: HeaderValue,
    content_type: Option<HeaderValue>,
}

impl ForcedHeaders {
    pub fn new(encoding_token: &str) -> Self {
        Self {
            content_encoding: HeaderValue::from_str(encoding_token)
                .unwrap_or_else(|_| HeaderValue::from_static("identity")),
            content_type: None,
        }
    }

    /// Records the Content-Type that will overwrite whatever the inner
    /// handler set.
    pub fn force_content_type(&mut self, mime_type: &str) {
        self.content_type = HeaderValue::from_str(mime_type).ok();
    }

    /// Applies the overrides, discarding conflicting writes made below this
    /// point in the stack.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::CONTENT_ENCODING, self.content_encoding.clone());
        if let Some(content_type) = &self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
    }
}

/// Layer that applies the pre-encoded dispatcher in front of a static file
/// service.
#[derive(Debug, Clone)]
pub struct PreEncodedLayer {
    settings: Arc<PreEncodedSettings>,
}

impl PreEncodedLayer {
    pub fn new(settings: PreEncodedSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl<S> Layer<S> for PreEncodedLayer {
    type Service = PreEncodedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PreEncodedService {
            inner,
            settings: self.settings.clone(),
        }
    }
}

/// Service produced by [`PreEncodedLayer`].
#[derive(Debug, Clone)]
pub struct PreEncodedService<S> {
    inner: S,
    settings: Arc<PreEncodedSettings>,
}

impl<S> Service<Request> for PreEncodedService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let settings = self.settings.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            let accept_encoding = req
                .headers()
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let Some(candidate) =
                negotiate(accept_encoding.as_deref(), &settings.candidates).cloned()
            else {
                tracing::debug!(%path, "no accepted encoding, forwarding");
                return inner.call(req).await;
            };

            if settings.ignore.is_ignored(&path) {
                tracing::debug!(%path, "path is ignored, forwarding");
                return inner.call(req).await;
            }

            match settings.mode {
                ServeMode::Include => {
                    dispatch_include(settings, candidate, path, req, inner).await
                }
                ServeMode::Redirect => {
                    dispatch_redirect(settings, candidate, path, req, inner).await
                }
            }
        })
    }
}

/// Include mode: rewrite the request to the sibling path, let the inner
/// static handler render it, then force the negotiated headers over
/// whatever it set.
async fn dispatch_include<S>(
    settings: Arc<PreEncodedSettings>,
    candidate: EncodingCandidate,
    path: String,
    req: Request,
    mut inner: S,
) -> Result<Response, S::Error>
where
    S: Service<Request, Response = Response> + Send,
    S::Future: Send,
{
    let Some(physical) = settings.resolver.resolve(&path, &candidate.suffix) else {
        tracing::debug!(%path, "no substitution source, forwarding");
        return inner.call(req).await;
    };
    if settings
        .resolver
        .sibling(&physical, &candidate.suffix)
        .is_none()
    {
        tracing::debug!(%path, suffix = %candidate.suffix, "no sibling, forwarding");
        return inner.call(req).await;
    }
    let Some(mime_type) = settings.mime.resolve(&path).map(str::to_owned) else {
        tracing::debug!(%path, "unresolved MIME type, forwarding");
        return inner.call(req).await;
    };

    let mut req = req;
    if !rewrite_to_sibling(&mut req, &candidate.suffix) {
        return inner.call(req).await;
    }

    let mut forced = ForcedHeaders::new(&candidate.token);
    forced.force_content_type(&mime_type);

    tracing::debug!(%path, encoding = %candidate.token, "including sibling");
    let mut response = inner.call(req).await?;
    forced.apply(response.headers_mut());
    Ok(response)
}

/// Redirect mode: send the client to the sibling URL; when the request
/// already names an encoded file, stream its bytes directly.
async fn dispatch_redirect<S>(
    settings: Arc<PreEncodedSettings>,
    candidate: EncodingCandidate,
    path: String,
    req: Request,
    mut inner: S,
) -> Result<Response, S::Error>
where
    S: Service<Request, Response = Response> + Send,
    S::Future: Send,
{
    let Some(physical) = settings.resolver.locate(&path) else {
        tracing::debug!(%path, "no physical file, forwarding");
        return inner.call(req).await;
    };

    if let Some(base) = path.strip_suffix(candidate.suffix.as_str()) {
        // Second pass: the redirect target itself. MIME is resolved from
        // the un-suffixed name; without a resolvable type the static
        // handler's own guess is as good as ours.
        let Some(mime_type) = settings.mime.resolve(base).map(str::to_owned) else {
            tracing::debug!(%path, "unresolved MIME type for encoded file, forwarding");
            return inner.call(req).await;
        };
        tracing::debug!(%path, encoding = %candidate.token, "streaming encoded file");
        match serve_alternate(&physical, &candidate.token, &mime_type).await {
            Some(response) => return Ok(response),
            None => return inner.call(req).await,
        }
    }

    if settings
        .resolver
        .sibling(&physical, &candidate.suffix)
        .is_none()
    {
        tracing::debug!(%path, suffix = %candidate.suffix, "no sibling, forwarding");
        return inner.call(req).await;
    }

    let location = match req.uri().query() {
        Some(query) => format!("{path}{}?{query}", candidate.suffix),
        None => format!("{path}{}", candidate.suffix),
    };
    let Ok(location) = HeaderValue::from_str(&location) else {
        return inner.call(req).await;
    };

    tracing::debug!(%path, ?location, "redirecting to sibling");
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

/// Streams an encoded file's bytes with explicit metadata headers,
/// bypassing the inner static handler entirely.
///
/// Returns `None` when the file cannot be opened; a read failure mid-copy
/// surfaces through the body stream as a transport fault, never as a
/// response to the client.
async fn serve_alternate(physical: &Path, token: &str, mime_type: &str) -> Option<Response> {
    let file = tokio::fs::File::open(physical).await.ok()?;
    let meta = file.metadata().await.ok()?;
    let len = meta.len();
    let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(
        header::CONTENT_ENCODING,
        HeaderValue::from_str(token).ok()?,
    );
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(mime_type).ok()?);
    headers.insert(header::DATE, http_date(SystemTime::now())?);
    headers.insert(header::LAST_MODIFIED, http_date(modified)?);
    Some(response)
}

fn http_date(time: SystemTime) -> Option<HeaderValue> {
    HeaderValue::from_str(&httpdate::fmt_http_date(time)).ok()
}

/// Rewrites the request URI to the sibling path in place, preserving the
/// query. Returns false when the rewritten path is not a valid URI, leaving
/// the request untouched.
fn rewrite_to_sibling(req: &mut Request, suffix: &str) -> bool {
    let rewritten = match req.uri().query() {
        Some(query) => format!("{}{suffix}?{query}", req.uri().path()),
        None => format!("{}{suffix}", req.uri().path()),
    };
    let Ok(path_and_query) = PathAndQuery::try_from(rewritten) else {
        return false;
    };
    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    match http::Uri::from_parts(parts) {
        Ok(uri) => {
            *req.uri_mut() = uri;
            true
        }
        Err(_) => false,
    }
}
