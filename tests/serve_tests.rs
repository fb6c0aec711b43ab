//! Include-mode dispatch tests: siblings served in place under the original
//! URL, with forwarding on every mismatch.

use axum::{Router, body::Body, http::Request};
use axum_preencoded::{Config, StaticSite};
use tower::ServiceExt;

fn include_mode_app(extra_toml: &str) -> Router {
    let toml = format!(
        r#"
        [assets]
        doc_root = "tests/fixtures"
        mode = "include"
        {extra_toml}
        "#
    );
    let config = Config::from_toml(&toml).unwrap();
    StaticSite::new(config).unwrap().into_router().unwrap()
}

fn get(uri: &str, accept_encoding: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(accept) = accept_encoding {
        builder = builder.header("accept-encoding", accept);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn test_gzip_sibling_served_in_place() {
    let app = include_mode_app("");

    let response = app
        .oneshot(get("/app/foo.js", Some("gzip, deflate")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-encoding"], "gzip");
    assert_eq!(response.headers()["content-type"], "text/javascript");
    assert_eq!(body_string(response).await, "GZ-SIBLING-OF-FOO-JS\n");
}

#[tokio::test]
async fn test_brotli_preferred_over_gzip() {
    let app = include_mode_app("");

    // style.css has only a .br sibling; client accepts both
    let response = app
        .oneshot(get("/app/style.css", Some("gzip, br")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-encoding"], "br");
    assert_eq!(response.headers()["content-type"], "text/css");
    assert_eq!(body_string(response).await, "BR-SIBLING-OF-STYLE-CSS\n");
}

#[tokio::test]
async fn test_no_accept_encoding_forwards_unchanged() {
    let app = include_mode_app("");

    let response = app.oneshot(get("/app/foo.js", None)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "console.log('foo');\n");
}

#[tokio::test]
async fn test_unaccepted_encoding_forwards_unchanged() {
    let app = include_mode_app("");

    let response = app
        .oneshot(get("/app/foo.js", Some("zstd, deflate")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "console.log('foo');\n");
}

#[tokio::test]
async fn test_missing_sibling_behaves_like_no_encoding() {
    let app = include_mode_app("");

    let with_gzip = app
        .clone()
        .oneshot(get("/app/only.js", Some("gzip")))
        .await
        .unwrap();
    let without = app.oneshot(get("/app/only.js", None)).await.unwrap();

    assert_eq!(with_gzip.status(), 200);
    assert_eq!(without.status(), 200);
    assert!(with_gzip.headers().get("content-encoding").is_none());
    let a = body_string(with_gzip).await;
    let b = body_string(without).await;
    assert_eq!(a, b);
    assert_eq!(a, "console.log('lonely');\n");
}

#[tokio::test]
async fn test_already_suffixed_request_not_renegotiated() {
    let app = include_mode_app("");

    // Requesting the encoded name directly must not produce foo.js.gz.gz.
    let response = app
        .oneshot(get("/app/foo.js.gz", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "GZ-SIBLING-OF-FOO-JS\n");
}

#[tokio::test]
async fn test_builtin_web_inf_rule_suppresses_substitution() {
    let app = include_mode_app("");

    let response = app
        .oneshot(get("/WEB-INF/secret.txt", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "top secret\n");
}

#[tokio::test]
async fn test_configured_ignore_rules() {
    let app = include_mode_app(r#"ignore = "/app/raw.js, /vendor/*""#);

    // literal rule: raw.js has a sibling, but substitution is suppressed
    let response = app
        .clone()
        .oneshot(get("/app/raw.js", Some("gzip")))
        .await
        .unwrap();
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "console.log('raw');\n");

    // non-ignored path still negotiates
    let response = app
        .oneshot(get("/app/foo.js", Some("gzip")))
        .await
        .unwrap();
    assert_eq!(response.headers()["content-encoding"], "gzip");
}

#[tokio::test]
async fn test_unknown_extension_forward_policy() {
    let app = include_mode_app("");

    // data.xyz has a sibling, but .xyz resolves to no MIME type
    let response = app
        .oneshot(get("/app/data.xyz", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(body_string(response).await, "xyz-payload\n");
}

#[tokio::test]
async fn test_unknown_extension_fallback_policy() {
    let app = include_mode_app(
        r#"unknown_extension = "fallback"

        [assets.mime]
        fallback = ".txt"
        "#,
    );

    let response = app
        .oneshot(get("/app/data.xyz", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-encoding"], "gzip");
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(body_string(response).await, "GZ-SIBLING-OF-DATA-XYZ\n");
}

#[tokio::test]
async fn test_missing_file_returns_404() {
    let app = include_mode_app("");

    let response = app
        .oneshot(get("/app/nothing-here.js", Some("gzip")))
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_zero_quality_gzip_still_matches() {
    // Documented looseness: substring negotiation ignores q-values.
    let app = include_mode_app("");

    let response = app
        .oneshot(get("/app/foo.js", Some("identity;q=1, gzip;q=0")))
        .await
        .unwrap();

    assert_eq!(response.headers()["content-encoding"], "gzip");
    assert_eq!(body_string(response).await, "GZ-SIBLING-OF-FOO-JS\n");
}
