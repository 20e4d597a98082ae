use std::path::{Path, PathBuf};
use url::Url;

/// File name used for directory-style URLs
const INDEX_FILE: &str = "index.html";

/// Maps a fetched URL to its location in the mirror
///
/// The path is `<output_root>/<host>/<url path>`. A URL path that is empty
/// or ends in `/` maps to `index.html` inside that directory. Query string
/// and fragment are ignored, so URLs differing only in those share a file
/// (last writer wins).
///
/// Path segments are kept percent-encoded, and empty, `.` and `..` segments
/// are skipped, so the result never escapes `<output_root>/<host>`.
///
/// # Examples
///
/// ```
/// use mirrorcrawl::url::mirror_path;
/// use std::path::Path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// let path = mirror_path(&url, Path::new("/tmp/out"));
/// assert_eq!(path, Path::new("/tmp/out/example.com/docs/index.html"));
/// ```
pub fn mirror_path(url: &Url, output_root: &Path) -> PathBuf {
    let mut path = output_root.join(url.host_str().unwrap_or_default());

    if let Some(segments) = url.path_segments() {
        for segment in segments.filter(|s| !matches!(*s, "" | "." | "..")) {
            path.push(segment);
        }
    }

    let url_path = url.path();
    if url_path.is_empty() || url_path.ends_with('/') {
        path.push(INDEX_FILE);
    }

    path
}
