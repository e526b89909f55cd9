// src/extract/urls.rs
// =============================================================================
// Small, pure helpers that every extracted reference goes through:
//
// - normalize: turns "//cdn/x.js" and "/about" into absolute URLs
// - in_domain: keeps the crawl on the root URL (plain text prefix test)
// - is_asset: checks a URL against the configured asset patterns
// - Normalizer: bundles the rules above with optional RFC 3986 resolution
//
// All of these work on strings, not on parsed Url values. Two URLs are the
// "same" when their text is equal, which is what the visited set compares.
// =============================================================================

use url::{ParseError as UrlParseError, Url};

// Resolves a raw href/src value against a base URL.
//
// Rules:
//   "//cdn.example.com/a.js" -> scheme of base + raw  ("https://cdn.example.com/a.js")
//   "/about"                 -> base + raw, without doubling the slash
//   anything else            -> returned unchanged
//
// Example:
//   normalize("http://x.com/", "/about") == "http://x.com/about"
pub fn normalize(base: &str, raw: &str) -> String {
    if raw.starts_with("//") {
        // Everything up to and including the first ':' is the scheme
        let scheme = match base.find(':') {
            Some(idx) => &base[..=idx],
            None => "",
        };
        return format!("{}{}", scheme, raw);
    }

    if let Some(path) = raw.strip_prefix('/') {
        if base.ends_with('/') {
            return format!("{}{}", base, path);
        }
        return format!("{}{}", base, raw);
    }

    raw.to_string()
}

/// True when `candidate` starts with `root`.
///
/// This is a textual prefix check, not a host comparison: anything that
/// literally begins with the root text passes, sub-paths included.
pub fn in_domain(root: &str, candidate: &str) -> bool {
    candidate.starts_with(root)
}

/// True when any pattern is a substring of `candidate`.
pub fn is_asset<S: AsRef<str>>(candidate: &str, patterns: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| candidate.contains(pattern.as_ref()))
}

// References that never point at another document.
fn is_non_navigable(raw: &str) -> bool {
    raw.starts_with('#')
        || raw.starts_with("mailto:")
        || raw.starts_with("tel:")
        || raw.starts_with("javascript:")
        || raw.starts_with("data:")
}

/// Normalization rules for one crawl.
#[derive(Debug, Clone)]
pub struct Normalizer {
    root: String,
    resolve_relative: bool,
}

impl Normalizer {
    pub fn new(root: impl Into<String>, resolve_relative: bool) -> Self {
        Self {
            root: root.into(),
            resolve_relative,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    // Resolves `raw` as found on `page`.
    //
    // By default protocol- and root-relative references resolve against the
    // crawl root and everything else is left as written. With relative
    // resolution enabled every relative reference, root-relative ones
    // included, is joined onto the page URL following RFC 3986, so a root
    // with a path ("https://x.com/docs/") doesn't get its path doubled.
    pub fn resolve(&self, page: &str, raw: &str) -> String {
        if !self.resolve_relative || is_non_navigable(raw) {
            return self.literal(raw);
        }

        match Url::parse(raw) {
            // Already absolute
            Ok(_) => raw.to_string(),
            Err(UrlParseError::RelativeUrlWithoutBase) => Url::parse(page)
                .and_then(|base| base.join(raw))
                .map(|joined| joined.to_string())
                .unwrap_or_else(|_| self.literal(raw)),
            Err(_) => self.literal(raw),
        }
    }

    fn literal(&self, raw: &str) -> String {
        if raw.starts_with('/') {
            normalize(&self.root, raw)
        } else {
            raw.to_string()
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is this file called urls.rs and not url.rs?
//    - `url` is also the name of the crate we depend on
//    - A local module with the same name makes `use url::Url` ambiguous
//
// 2. What is Url::join?
//    - RFC 3986 reference resolution: "img/a.png" on "https://x.com/blog/post"
//      becomes "https://x.com/blog/img/a.png"
//    - A reference starting with '/' replaces the whole path
//
// 3. What does `impl AsRef<str>` / `S: AsRef<str>` buy us?
//    - is_asset accepts both &[String] and &[&str]
//    - .as_ref() turns either one into a &str
// -----------------------------------------------------------------------------
