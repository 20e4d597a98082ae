//! URL handling module for mirrorcrawl
//!
//! This module provides link resolution, origin scoping, canonicalization,
//! mirror path derivation and the render-asset depth exception.

mod assets;
mod mirror;
mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use assets::{is_render_asset, RENDER_ASSET_EXTENSIONS};
pub use mirror::mirror_path;
pub use normalize::canonicalize;

/// Resolves a possibly-relative link against a base URL
///
/// Absolute links are parsed as-is; relative references (including
/// protocol-relative `//host/path` and query-only `?q=1` links) are merged
/// with `base` following RFC 3986.
///
/// # Arguments
///
/// * `raw` - The link text as found in the document
/// * `base` - The URL of the document the link was found in
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL
/// * `Err(UrlError)` - The link could not be parsed
///
/// # Examples
///
/// ```
/// use mirrorcrawl::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// let url = resolve("../about", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn resolve(raw: &str, base: &Url) -> Result<Url, UrlError> {
    base.join(raw.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))
}

/// The single site a crawl is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
}

impl Origin {
    /// Builds the origin from the seed URL
    ///
    /// The seed must use `http` or `https` and carry a host.
    pub fn from_seed(seed: &Url) -> Result<Self, UrlError> {
        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(seed.scheme().to_string()));
        }

        let host = seed.host_str().ok_or(UrlError::MissingHost)?;

        Ok(Self {
            scheme: seed.scheme().to_string(),
            host: host.to_lowercase(),
        })
    }

    /// Lowercase host of the seed
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Scheme of the seed
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns true if the URL belongs to this crawl
    ///
    /// Only `http`/`https` URLs are fetchable. The host must be absent or
    /// equal to the seed host; the port is not compared.
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match url.host_str() {
            None | Some("") => true,
            Some(host) => host.eq_ignore_ascii_case(&self.host),
        }
    }
}
