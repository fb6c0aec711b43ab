//! Assembly of the asset pipeline onto an axum router.

use crate::{Config, Result, cache::CacheControlLayer, dispatch::PreEncodedLayer};
use axum::Router;
use std::net::SocketAddr;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// A configured static site: document root plus the negotiation and
/// cache-policy layers.
///
/// Layer order, outermost first: request tracing, cache-policy stamping,
/// pre-encoded dispatch, then the static file handler. The cache layer sits
/// outside the dispatcher so policy headers cover forwarded responses too;
/// the dispatcher never writes `Cache-Control`, so the two cannot collide.
///
/// # Example
///
/// ```rust,no_run
/// use axum_preencoded::{Config, Result, StaticSite};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let config = Config::default();
///     config.setup_tracing();
///
///     StaticSite::new(config)?
///         .start("0.0.0.0:8080".parse().unwrap())
///         .await
/// }
/// ```
pub struct StaticSite {
    config: Config,
}

impl StaticSite {
    /// Validates the configuration and builds the site.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Builds the axum router: a `ServeDir` over the document root wrapped
    /// by the dispatch and cache-policy layers.
    pub fn into_router(self) -> Result<Router> {
        let settings = self.config.assets.settings()?;
        let doc_root = settings.resolver.doc_root().to_path_buf();

        let router = Router::new()
            .fallback_service(ServeDir::new(doc_root))
            .layer(PreEncodedLayer::new(settings))
            .layer(CacheControlLayer::new())
            .layer(TraceLayer::new_for_http());
        Ok(router)
    }

    /// Binds `addr` and serves until the process is stopped.
    pub async fn start(self, addr: SocketAddr) -> Result<()> {
        const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
        const VERSION: &str = env!("CARGO_PKG_VERSION");

        let doc_root = self.config.assets.doc_root.clone();
        let router = self.into_router()?;

        tracing::info!("Starting {PACKAGE_NAME} version {VERSION}...");
        tracing::info!(%addr, %doc_root, "serving static assets");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_rejects_blank_doc_root() {
        let config = Config::default().with_doc_root("   ");
        assert!(StaticSite::new(config).is_err());
    }

    #[test]
    fn test_site_builds_router_from_default_config() {
        let config = Config::default().with_doc_root("tests/fixtures");
        let site = StaticSite::new(config).unwrap();
        assert!(site.into_router().is_ok());
    }
}
