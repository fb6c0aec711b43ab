//! Logical-path to document-root resolution.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

/// Maps server-relative request paths onto a document root.
///
/// Resolution uses blocking `stat` calls on purpose: decisions are never
/// cached across requests, so each request trades one metadata lookup for
/// freshness and simplicity.
#[derive(Debug, Clone)]
pub struct PathResolver {
    doc_root: PathBuf,
}

impl PathResolver {
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        Self {
            doc_root: doc_root.into(),
        }
    }

    pub fn doc_root(&self) -> &Path {
        &self.doc_root
    }

    /// Maps `logical` onto the document root, yielding the physical path of
    /// an existing regular file.
    ///
    /// Returns `None` when the path escapes the root (any `..` segment),
    /// when nothing exists there, or when the entry is not a regular file
    /// (directories are never substitution sources).
    pub fn locate(&self, logical: &str) -> Option<PathBuf> {
        let mut physical = self.doc_root.clone();
        for segment in logical.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                other => physical.push(other),
            }
        }
        let meta = fs::metadata(&physical).ok()?;
        meta.is_file().then_some(physical)
    }

    /// Resolves the substitution source for `logical` given the candidate
    /// `suffix`.
    ///
    /// On top of [`locate`](Self::locate), returns `None` when the logical
    /// path already ends with the suffix, so an already-encoded request is
    /// never negotiated a second time.
    pub fn resolve(&self, logical: &str, suffix: &str) -> Option<PathBuf> {
        if logical.ends_with(suffix) {
            return None;
        }
        self.locate(logical)
    }

    /// Locates the pre-encoded sibling `<physical><suffix>`, if it exists
    /// and is a regular file.
    pub fn sibling(&self, physical: &Path, suffix: &str) -> Option<PathBuf> {
        let mut name = OsString::from(physical.as_os_str());
        name.push(suffix);
        let sibling = PathBuf::from(name);
        let meta = fs::metadata(&sibling).ok()?;
        meta.is_file().then_some(sibling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn fixture_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("preenc-resolve-{}", std::process::id()));
        let app = root.join("app");
        fs::create_dir_all(&app).unwrap();
        for (name, body) in [("foo.js", "console.log(1);"), ("foo.js.gz", "gz-bytes")] {
            let mut f = File::create(app.join(name)).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        }
        root
    }

    #[test]
    fn test_locate_existing_file() {
        let resolver = PathResolver::new(fixture_root());
        let physical = resolver.locate("/app/foo.js").unwrap();
        assert!(physical.ends_with("app/foo.js"));
    }

    #[test]
    fn test_locate_missing_file() {
        let resolver = PathResolver::new(fixture_root());
        assert_eq!(resolver.locate("/app/missing.js"), None);
    }

    #[test]
    fn test_locate_directory_is_not_a_file() {
        let resolver = PathResolver::new(fixture_root());
        assert_eq!(resolver.locate("/app"), None);
    }

    #[test]
    fn test_locate_rejects_traversal() {
        let resolver = PathResolver::new(fixture_root().join("app"));
        assert_eq!(resolver.locate("/../app/foo.js"), None);
    }

    #[test]
    fn test_resolve_skips_already_suffixed_request() {
        let resolver = PathResolver::new(fixture_root());
        assert!(resolver.resolve("/app/foo.js", ".gz").is_some());
        assert_eq!(resolver.resolve("/app/foo.js.gz", ".gz"), None);
    }

    #[test]
    fn test_sibling_lookup() {
        let resolver = PathResolver::new(fixture_root());
        let physical = resolver.locate("/app/foo.js").unwrap();
        let sibling = resolver.sibling(&physical, ".gz").unwrap();
        assert!(sibling.ends_with("app/foo.js.gz"));
        assert_eq!(resolver.sibling(&physical, ".br"), None);
    }
}
