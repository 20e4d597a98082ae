use url::Url;

/// Extensions of render-critical assets fetched regardless of crawl depth
///
/// Stylesheets, scripts, images and fonts. Matching trusts the URL suffix,
/// not the Content-Type the server later returns.
pub const RENDER_ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "avif", "bmp", "woff",
    "woff2", "ttf", "otf", "eot",
];

/// Returns true if the URL's last path segment has a render-asset extension
///
/// # Examples
///
/// ```
/// use mirrorcrawl::url::is_render_asset;
/// use url::Url;
///
/// assert!(is_render_asset(&Url::parse("https://example.com/a/site.CSS?v=3").unwrap()));
/// assert!(!is_render_asset(&Url::parse("https://example.com/about").unwrap()));
/// ```
pub fn is_render_asset(url: &Url) -> bool {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => RENDER_ASSET_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}
