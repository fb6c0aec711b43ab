//! Accept-Encoding negotiation against the configured candidate list.

use serde::Deserialize;

/// A pre-encoded variant the server knows how to substitute.
///
/// Pairs a file suffix with the wire token that names the encoding in
/// `Accept-Encoding` and `Content-Encoding`. Candidates are configured at
/// startup and never change afterwards; their order in the configuration
/// defines preference when a client accepts more than one encoding.
///
/// # Examples
///
/// In TOML configuration:
/// ```toml
/// [[assets.encodings]]
/// suffix = ".br"
/// token = "br"
///
/// [[assets.encodings]]
/// suffix = ".gz"
/// token = "gzip"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncodingCandidate {
    /// File suffix of the sibling artifact, including the leading dot.
    pub suffix: String,
    /// Encoding token as it appears on the wire.
    pub token: String,
}

impl EncodingCandidate {
    pub fn new(suffix: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            token: token.into(),
        }
    }

    /// The gzip candidate (`.gz` / `gzip`).
    pub fn gzip() -> Self {
        Self::new(".gz", "gzip")
    }

    /// The brotli candidate (`.br` / `br`).
    pub fn brotli() -> Self {
        Self::new(".br", "br")
    }
}

/// Picks the first configured candidate whose token appears in the
/// `Accept-Encoding` header value.
///
/// Returns `None` when the header is absent or no candidate token occurs in
/// it. Matching is a raw substring test with no quality-factor parsing: a
/// client sending `identity;q=0, gzip;q=0` is still treated as accepting
/// gzip. This looseness is intentional and preserved from long-standing
/// behavior; do not "fix" it to a full q-value parse.
pub fn negotiate<'a>(
    accept_encoding: Option<&str>,
    candidates: &'a [EncodingCandidate],
) -> Option<&'a EncodingCandidate> {
    let header = accept_encoding?;
    candidates.iter().find(|c| header.contains(&c.token))
}
