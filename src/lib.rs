//! # axum-preencoded
//!
//! Serve pre-compressed sibling files with content negotiation and
//! convention-driven cache-control headers, in front of an Axum static site.
//!
//! Build steps commonly emit `.br`/`.gz` siblings next to each asset
//! (`foo.js` and `foo.js.gz`). This crate decides, per request, whether such
//! a sibling should be served instead of the original, which headers must
//! accompany the response, and which paths are exempt, without compressing
//! anything at runtime.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum_preencoded::{Config, Result, StaticSite};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default();  // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     StaticSite::new(config)?
//!         .start("0.0.0.0:8080".parse().unwrap())
//!         .await
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [assets]
//! doc_root = "./public"
//! ignore = "/WEB-INF/*"
//! ```
//!
//! Run with `RUST_ENV=dev cargo run`.
//!
//! # What You Get
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | Sibling substitution | `foo.js.br`/`foo.js.gz` served for `foo.js` | brotli, then gzip |
//! | Delivery modes | in-place include or client-visible redirect | include |
//! | Ignore rules | literal and `*`-wildcard path exemptions | `/WEB-INF/*` built in |
//! | Cache policy | `.cache.` → immutable year, `.nocache.` → revalidate | Enabled |
//! | MIME table | extension → type, extensible, fallback policy | seeded |
//! | Request logging | `tower-http` tracing over every request | Enabled |
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration loading and validation ([`Config`]) |
//! | [`negotiate`] | Accept-Encoding candidate selection |
//! | [`ignore`] | Exemption rules ([`IgnoreList`]) |
//! | [`mime`] | Extension-to-MIME resolution ([`MimeTable`]) |
//! | [`cache`] | Cache classification and header stamping |
//! | [`resolve`] | Document-root path mapping ([`PathResolver`]) |
//! | [`dispatch`] | The substitution state machine ([`PreEncodedLayer`]) |
//! | [`router`] | Assembly onto an axum `Router` ([`StaticSite`]) |
//! | [`error`] | Error types and handling ([`Error`]) |
//!
//! # Layering by hand
//!
//! The layers compose with any tower stack; `StaticSite` is just the
//! packaged arrangement:
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum_preencoded::{CacheControlLayer, PreEncodedLayer, PreEncodedSettings};
//! use tower_http::services::ServeDir;
//!
//! let settings = PreEncodedSettings::new("./public");
//! let app: Router = Router::new()
//!     .fallback_service(ServeDir::new("./public"))
//!     .layer(PreEncodedLayer::new(settings))
//!     .layer(CacheControlLayer::new());
//! ```

mod config;
mod error;
mod utils;

pub mod cache;
pub mod dispatch;
pub mod ignore;
pub mod mime;
pub mod negotiate;
pub mod resolve;
pub mod router;

pub use cache::{CacheClass, CacheControlLayer, classify, headers_for};
pub use config::*;
pub use dispatch::{ForcedHeaders, PreEncodedLayer, PreEncodedSettings, ServeMode};
pub use error::*;
pub use ignore::{IgnoreList, IgnoreRule};
pub use mime::{MimeTable, UnknownExtension};
pub use negotiate::{EncodingCandidate, negotiate};
pub use resolve::PathResolver;
pub use router::StaticSite;
pub use utils::replace_handlebars_with_env;

pub type Result<T> = std::result::Result<T, Error>;
