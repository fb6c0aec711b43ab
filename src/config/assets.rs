use {
    crate::{
        Error, Result,
        dispatch::{PreEncodedSettings, ServeMode},
        ignore::IgnoreList,
        mime::{MimeTable, UnknownExtension},
        negotiate::EncodingCandidate,
        resolve::PathResolver,
    },
    serde::Deserialize,
    std::collections::HashMap,
};

/// Configuration for the pre-encoded asset pipeline.
///
/// Everything here is read once at startup and baked into an immutable
/// [`PreEncodedSettings`] value; there is no process-wide mutable state.
///
/// # Fields
///
/// - `doc_root`: directory the logical request paths map onto
/// - `mode`: how matched siblings are delivered (`include` or `redirect`)
/// - `ignore`: comma-separated exemption patterns, literal or `*`-suffixed,
///   case-insensitive
/// - `encodings`: ordered candidate list; first accepted match wins. When
///   empty, brotli-then-gzip defaults apply
/// - `unknown_extension`: what to do when a path's extension has no MIME
///   entry (`forward` the request untouched, or use the `fallback` entry)
/// - `mime`: extra MIME entries and the optional fallback extension
///
/// # Examples
///
/// In TOML configuration:
/// ```toml
/// [assets]
/// doc_root = "./public"
/// mode = "include"
/// ignore = "/WEB-INF/*, /private/keys.js"
///
/// [[assets.encodings]]
/// suffix = ".br"
/// token = "br"
///
/// [[assets.encodings]]
/// suffix = ".gz"
/// token = "gzip"
///
/// [assets.mime]
/// fallback = ".txt"
/// [assets.mime.types]
/// ".map" = "application/json"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Path to the document root the pipeline serves from.
    pub doc_root: String,

    /// Delivery mode for matched siblings.
    #[serde(default)]
    pub mode: ServeMode,

    /// Comma-separated ignore patterns. Blank entries are skipped, never an
    /// error: minor misconfiguration must not fail startup.
    #[serde(default)]
    pub ignore: String,

    /// Ordered encoding candidates. Empty means the built-in defaults.
    #[serde(default)]
    pub encodings: Vec<EncodingCandidate>,

    /// Policy for extensions with no MIME entry.
    #[serde(default)]
    pub unknown_extension: UnknownExtension,

    /// MIME table additions.
    #[serde(default)]
    pub mime: MimeConfig,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            doc_root: "./public".into(),
            mode: ServeMode::default(),
            ignore: String::new(),
            encodings: Vec::new(),
            unknown_extension: UnknownExtension::default(),
            mime: MimeConfig::default(),
        }
    }
}

/// Extra MIME entries layered over the seeded table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MimeConfig {
    /// Extension whose entry serves as the fallback type under the
    /// `fallback` unknown-extension policy.
    #[serde(default)]
    pub fallback: Option<String>,

    /// Extension → MIME type additions or overrides.
    #[serde(default)]
    pub types: HashMap<String, String>,
}

impl AssetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.doc_root.trim().is_empty() {
            return Err(Error::invalid_input(
                "Asset document root is required. Set [assets] doc_root = \"./public\" in config.",
            ));
        }
        Ok(())
    }

    /// Bakes the configuration into the immutable per-request settings.
    ///
    /// Parsing is permissive where the surface allows sloppiness: blank
    /// ignore entries and encoding candidates with an empty suffix or token
    /// are dropped silently.
    pub fn settings(&self) -> Result<PreEncodedSettings> {
        self.validate()?;

        let mut candidates: Vec<EncodingCandidate> = self
            .encodings
            .iter()
            .filter(|c| !c.suffix.trim().is_empty() && !c.token.trim().is_empty())
            .cloned()
            .collect();
        if candidates.is_empty() {
            candidates = vec![EncodingCandidate::brotli(), EncodingCandidate::gzip()];
        }

        let mut ignore = IgnoreList::new();
        ignore.add_list(&self.ignore);

        let mut mime = MimeTable::new();
        for (ext, mime_type) in &self.mime.types {
            mime.insert(ext, mime_type.clone());
        }
        if let Some(fallback) = &self.mime.fallback {
            mime.set_fallback(fallback);
        }
        mime.set_unknown_policy(self.unknown_extension);

        Ok(PreEncodedSettings {
            resolver: PathResolver::new(&self.doc_root),
            candidates,
            ignore,
            mime,
            mode: self.mode,
        })
    }
}
