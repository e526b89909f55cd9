// src/extract/document.rs
// =============================================================================
// A thin wrapper around scraper's Html that gives the rest of the crate the
// two queries it needs:
//
// - find_all(tag): every element with that tag name
// - attribute_values(tag, attr): the attribute of each such element, with
//   elements that don't carry the attribute skipped
//
// scraper (html5ever) never rejects markup, so the only parse failures are a
// response that declares a binary content type (image, PDF, ...) and a tag
// name that isn't a valid CSS selector.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response is not HTML (content-type: {0})")]
    NotHtml(String),

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    // Parses a response body.
    //
    // Only clearly binary content types are refused. Text of any kind, or no
    // content type at all, goes to the HTML parser, so a page served as
    // text/plain still yields its links and assets.
    pub fn parse(body: &str, content_type: Option<&str>) -> Result<Self, ParseError> {
        if let Some(content_type) = content_type {
            if is_binary(content_type) {
                return Err(ParseError::NotHtml(content_type.to_string()));
            }
        }

        Ok(Self {
            html: Html::parse_document(body),
        })
    }

    /// All elements named `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Result<Vec<ElementRef<'_>>, ParseError> {
        let selector = Selector::parse(tag).map_err(|_| ParseError::Selector(tag.to_string()))?;
        Ok(self.html.select(&selector).collect())
    }

    // The `attr` value of every `tag` element that has one.
    //
    // This is the single place attribute lookups happen, so "missing href"
    // and "missing src" are handled the same way everywhere: the element is
    // left out.
    pub fn attribute_values(&self, tag: &str, attr: &str) -> Result<Vec<String>, ParseError> {
        let values = self
            .find_all(tag)?
            .into_iter()
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect();

        Ok(values)
    }
}

// Media types that can't contain markup
fn is_binary(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    ["image/", "audio/", "video/", "font/"]
        .iter()
        .any(|prefix| mime.starts_with(prefix))
        || matches!(
            mime.as_str(),
            "application/pdf" | "application/octet-stream" | "application/zip" | "application/gzip"
        )
}
