//! Extension-to-MIME resolution from a configurable table.

use serde::Deserialize;
use std::collections::HashMap;

/// Policy for paths whose extension has no table entry.
///
/// The two historical behaviors both survive as configuration: `Forward`
/// resolves to nothing (the dispatcher then forwards the request untouched),
/// `Fallback` resolves to the designated fallback entry's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownExtension {
    /// Unknown extension resolves to `None`; the request is forwarded as-is.
    #[default]
    Forward,
    /// Unknown extension resolves to the fallback entry, when one is set.
    Fallback,
}

/// Mapping from lowercase file extension (leading dot included) to MIME type.
///
/// Mutable while the configuration is being assembled, read-only during
/// request handling. Lookup keys are lowercased, so `.JS` and `.js` resolve
/// identically; table entries must be registered with lowercase keys.
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, String>,
    fallback: Option<String>,
    unknown: UnknownExtension,
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeTable {
    /// A table seeded with the common static-site types.
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for (ext, mime) in [
            (".html", "text/html"),
            (".htm", "text/html"),
            (".css", "text/css"),
            (".js", "text/javascript"),
            (".mjs", "text/javascript"),
            (".json", "application/json"),
            (".wasm", "application/wasm"),
            (".xml", "application/xml"),
            (".txt", "text/plain"),
            (".svg", "image/svg+xml"),
            (".png", "image/png"),
            (".gif", "image/gif"),
            (".jpg", "image/jpeg"),
            (".jpeg", "image/jpeg"),
            (".ico", "image/x-icon"),
            (".webp", "image/webp"),
            (".woff", "font/woff"),
            (".woff2", "font/woff2"),
            (".ttf", "font/ttf"),
            (".pdf", "application/pdf"),
        ] {
            types.insert(ext.to_string(), mime.to_string());
        }
        Self {
            types,
            fallback: None,
            unknown: UnknownExtension::Forward,
        }
    }

    /// An empty table with no seed entries. Useful in tests.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            fallback: None,
            unknown: UnknownExtension::Forward,
        }
    }

    /// Registers or replaces one entry. The key is lowercased and gains a
    /// leading dot if missing, so `js`, `.js` and `.JS` all land on `.js`.
    pub fn insert(&mut self, extension: &str, mime_type: impl Into<String>) {
        self.types
            .insert(normalize_extension(extension), mime_type.into());
    }

    /// Designates an existing extension entry as the fallback.
    pub fn set_fallback(&mut self, extension: &str) {
        self.fallback = Some(normalize_extension(extension));
    }

    /// Sets the unknown-extension policy.
    pub fn set_unknown_policy(&mut self, policy: UnknownExtension) {
        self.unknown = policy;
    }

    /// Resolves the MIME type for `path`.
    ///
    /// The extension is the substring from the last `.` to the end of the
    /// path, lowercased before lookup. A path with no dot, or an unknown
    /// extension under the [`UnknownExtension::Forward`] policy, resolves
    /// to `None`.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let hit = path
            .rfind('.')
            .map(|idx| path[idx..].to_ascii_lowercase())
            .and_then(|ext| self.types.get(&ext));
        match hit {
            Some(mime) => Some(mime.as_str()),
            None => match self.unknown {
                UnknownExtension::Forward => None,
                UnknownExtension::Fallback => self
                    .fallback
                    .as_ref()
                    .and_then(|ext| self.types.get(ext))
                    .map(String::as_str),
            },
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    let lowered = extension.trim().to_ascii_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{lowered}")
    }
}
