//! Ignore rules exempting request paths from sibling substitution.

/// A single exemption pattern.
///
/// Either a literal path, compared case-insensitively for exact equality, or
/// a wildcard pattern ending in `*`, compared as a case-insensitive prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    pattern: String,
    is_wildcard: bool,
}

impl IgnoreRule {
    /// Parses a single pattern. Returns `None` for blank entries so that a
    /// sloppy comma-separated config list never fails startup.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return None;
        }
        let lowered = trimmed.to_ascii_lowercase();
        match lowered.strip_suffix('*') {
            Some(prefix) => Some(Self {
                pattern: prefix.to_string(),
                is_wildcard: true,
            }),
            None => Some(Self {
                pattern: lowered,
                is_wildcard: false,
            }),
        }
    }

    fn matches(&self, lowered_path: &str) -> bool {
        if self.is_wildcard {
            lowered_path.starts_with(&self.pattern)
        } else {
            lowered_path == self.pattern
        }
    }
}

/// The configured set of ignore rules.
///
/// Rules are append-only for the lifetime of the process. Matching is a
/// union: the order in which rules were added never changes the result.
/// Every list carries a built-in rule excluding the application's internal
/// metadata directory (`/WEB-INF/*`), which is never served pre-encoded.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    rules: Vec<IgnoreRule>,
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new()
    }
}

impl IgnoreList {
    pub fn new() -> Self {
        let builtin = IgnoreRule::parse("/web-inf/*").into_iter().collect();
        Self { rules: builtin }
    }

    /// Adds one pattern. Blank or lone-`*` entries are silently skipped.
    pub fn add(&mut self, pattern: &str) {
        if let Some(rule) = IgnoreRule::parse(pattern) {
            self.rules.push(rule);
        }
    }

    /// Adds all entries of a comma-separated pattern list, permissively.
    pub fn add_list(&mut self, patterns: &str) {
        for entry in patterns.split(',') {
            self.add(entry);
        }
    }

    /// Whether `path` is exempt from substitution.
    pub fn is_ignored(&self, path: &str) -> bool {
        let lowered = path.to_ascii_lowercase();
        self.rules.iter().any(|r| r.matches(&lowered))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_web_inf_rule() {
        let list = IgnoreList::new();
        assert!(list.is_ignored("/WEB-INF/secret.txt"));
        assert!(list.is_ignored("/web-inf/lib/app.jar"));
        assert!(!list.is_ignored("/app/foo.js"));
    }

    #[test]
    fn test_literal_rule_is_exact_and_case_insensitive() {
        let mut list = IgnoreList::new();
        list.add("/app/Special.js");
        assert!(list.is_ignored("/app/special.js"));
        assert!(list.is_ignored("/APP/SPECIAL.JS"));
        assert!(!list.is_ignored("/app/special.js.map"));
    }

    #[test]
    fn test_wildcard_rule_is_prefix_match() {
        let mut list = IgnoreList::new();
        list.add("/vendor/*");
        assert!(list.is_ignored("/vendor/lib.js"));
        assert!(list.is_ignored("/Vendor/deep/nested.css"));
        assert!(!list.is_ignored("/app/vendor.js"));
    }

    #[test]
    fn test_comma_list_parsing_is_permissive() {
        let mut list = IgnoreList::new();
        list.add_list(" /a.js , , /b/* ,, * ");
        // builtin + two valid entries; blanks and lone "*" dropped
        assert_eq!(list.len(), 3);
        assert!(list.is_ignored("/a.js"));
        assert!(list.is_ignored("/b/c.js"));
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut forward = IgnoreList::new();
        forward.add("/x.js");
        forward.add("/y/*");

        let mut backward = IgnoreList::new();
        backward.add("/y/*");
        backward.add("/x.js");

        for path in ["/x.js", "/y/z.js", "/z.js"] {
            assert_eq!(forward.is_ignored(path), backward.is_ignored(path));
        }
    }
}
