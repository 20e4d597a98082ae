//! HTML link extraction
//!
//! This module parses fetched HTML and yields every candidate URL found in
//! `href` and `src` attributes of any element:
//! - anchors, `<link>` stylesheets and icons, `<area>`
//! - `<script src>`, `<img src>`, `<iframe src>`, `<source src>`, ...
//!
//! **Excluded:** empty values, `data:` and `javascript:` URIs, and links that
//! fail to resolve. Scope and depth filtering happen later, in the session.

use crate::url::resolve;
use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html};
use std::borrow::Cow;
use url::Url;

/// Attributes inspected on every element, in yield order
const LINK_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Schemes that never lead to a fetchable resource
const SKIPPED_PREFIXES: [&str; 2] = ["data:", "javascript:"];

/// A parsed HTML document
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    /// Returns a lazy iterator over the absolute links of the document
    ///
    /// Every call starts a fresh walk from the root element.
    pub fn links<'a>(&'a self, base: &'a Url) -> Links<'a> {
        Links {
            stack: vec![self.document.root_element()],
            pending: Vec::new(),
            base,
        }
    }
}

/// Depth-first walk over the element tree yielding resolved links
///
/// Uses an explicit stack, so deeply nested documents cannot overflow the
/// call stack.
pub struct Links<'a> {
    stack: Vec<ElementRef<'a>>,
    pending: Vec<&'a str>,
    base: &'a Url,
}

impl<'a> Iterator for Links<'a> {
    type Item = Url;

    fn next(&mut self) -> Option<Url> {
        loop {
            while let Some(raw) = self.pending.pop() {
                if let Some(url) = resolve_link(raw, self.base) {
                    return Some(url);
                }
            }

            let element = self.stack.pop()?;

            // Children pushed in reverse so the first child is visited next
            self.stack
                .extend(element.children().rev().filter_map(ElementRef::wrap));

            for attribute in LINK_ATTRIBUTES.iter().rev() {
                if let Some(value) = element.value().attr(attribute) {
                    self.pending.push(value);
                }
            }
        }
    }
}

/// Parses an HTML body
///
/// The body is decoded with the charset declared in `content_type`, falling
/// back to UTF-8 (a byte-order mark wins over both). Undecodable bytes are
/// replaced, so every body yields a document.
///
/// # Arguments
///
/// * `body` - The raw response body
/// * `content_type` - The Content-Type header value, possibly empty
pub fn parse_html(body: &[u8], content_type: &str) -> HtmlPage {
    let text = decode_body(body, content_type);

    HtmlPage {
        document: Html::parse_document(&text),
    }
}

/// Parses an HTML body of unknown charset and collects all of its links
///
/// # Example
///
/// ```
/// use mirrorcrawl::crawler::extract_links;
/// use url::Url;
///
/// let html = br#"<html><head><link rel="stylesheet" href="site.css"></head>
///     <body><a href="/about">About</a><img src="data:image/png;base64,AAAA"></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].as_str(), "https://example.com/site.css");
/// ```
pub fn extract_links(body: &[u8], base: &Url) -> Vec<Url> {
    parse_html(body, "").links(base).collect()
}

/// Decodes a body using the `charset` parameter of a Content-Type value
pub fn decode_body<'a>(body: &'a [u8], content_type: &str) -> Cow<'a, str> {
    let encoding = charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!("Replaced malformed {} sequences in HTML body", used.name());
    }
    text
}

/// The `charset` parameter of a Content-Type value, if any
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Resolves one attribute value, or None if it should be skipped
fn resolve_link(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    let skipped = SKIPPED_PREFIXES.iter().any(|prefix| {
        raw.get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
    });
    if skipped {
        return None;
    }

    match resolve(raw, base) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping malformed link on {}: {}", base, e);
            None
        }
    }
}
