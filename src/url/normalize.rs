use url::Url;

/// Computes the canonical string used to deduplicate URLs
///
/// # Canonicalization Steps
///
/// 1. Scheme and host are already lowercased by the URL parser
/// 2. Dot segments are already removed by the URL parser
/// 3. Remove fragment (everything after #)
/// 4. Remove empty query string (trailing ?)
///
/// Paths, trailing slashes and query parameters are otherwise kept as-is:
/// the server decides whether `/a` and `/a/` are the same resource.
///
/// # Examples
///
/// ```
/// use mirrorcrawl::url::canonicalize;
/// use url::Url;
///
/// let url = Url::parse("HTTPS://Example.COM/a/./b?#frag").unwrap();
/// assert_eq!(canonicalize(&url), "https://example.com/a/b");
/// ```
pub fn canonicalize(url: &Url) -> String {
    let mut url = url.clone();

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    url.into()
}
