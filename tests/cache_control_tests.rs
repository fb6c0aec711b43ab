//! End-to-end cache-policy tests over the assembled router.

use axum::{Router, body::Body, http::Request};
use axum_preencoded::{Config, StaticSite};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::from_toml(
        r#"
        [assets]
        doc_root = "tests/fixtures"
        "#,
    )
    .unwrap();
    StaticSite::new(config).unwrap().into_router().unwrap()
}

fn get(uri: &str, accept_encoding: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(accept) = accept_encoding {
        builder = builder.header("accept-encoding", accept);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_cache_marker_gets_immutable_headers() {
    let response = app()
        .oneshot(get("/app/widget.cache.js", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["cache-control"],
        "max-age=31536000, public, immutable"
    );
    assert_eq!(response.headers()["pragma"], "");

    let expires = response.headers()["expires"].to_str().unwrap().to_owned();
    let parsed = httpdate::parse_http_date(&expires).unwrap();
    assert!(parsed > std::time::SystemTime::now());

    // substitution and cache policy are independent: the sibling is served
    assert_eq!(response.headers()["content-encoding"], "gzip");
}

#[tokio::test]
async fn test_nocache_marker_gets_revalidate_headers() {
    let response = app()
        .oneshot(get("/app/app.nocache.js", None))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["pragma"], "no-cache");
    assert_eq!(
        response.headers()["cache-control"],
        "no-cache, must-revalidate, pre-check=0, post-check=0"
    );
    assert_eq!(
        response.headers()["expires"],
        "Thu, 01 Jan 1970 00:00:00 GMT"
    );
    assert!(response.headers().contains_key("date"));
    assert!(response.headers().contains_key("last-modified"));
}

#[tokio::test]
async fn test_unmarked_path_gets_no_policy_headers() {
    let response = app().oneshot(get("/app/foo.js", None)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("cache-control").is_none());
    assert!(response.headers().get("pragma").is_none());
    assert!(response.headers().get("expires").is_none());
}

#[tokio::test]
async fn test_policy_headers_apply_even_to_missing_files() {
    // classification depends only on the request path
    let response = app()
        .oneshot(get("/app/ghost.nocache.js", None))
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["pragma"], "no-cache");
}
