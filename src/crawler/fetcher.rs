//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with user agent and timeouts
//! - Restricting redirects to the seed host
//! - GET requests returning the raw body bytes
//! - Error classification

use crate::config::HttpConfig;
use crate::state::JobState;
use crate::url::Origin;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Connect timeout, independent of the per-request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Non-2xx response
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The job state this error maps to
        state: JobState,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The job state this error maps to
        state: JobState,
    },
}

/// Returns true if a Content-Type header value denotes HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Builds the HTTP client shared by every worker of a crawl
///
/// Redirects are followed only while they stay on the seed host, at most
/// `MAX_REDIRECTS` hops. A redirect that would leave the host is returned
/// as-is and ends up as a non-2xx failure.
///
/// # Arguments
///
/// * `config` - The HTTP configuration
/// * `origin` - The origin the crawl is restricted to
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use mirrorcrawl::config::HttpConfig;
/// use mirrorcrawl::crawler::build_http_client;
/// use mirrorcrawl::url::Origin;
/// use url::Url;
///
/// let origin = Origin::from_seed(&Url::parse("https://example.com/").unwrap()).unwrap();
/// let client = build_http_client(&HttpConfig::default(), &origin).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, origin: &Origin) -> Result<Client, reqwest::Error> {
    let scope = origin.clone();
    let redirect_policy = Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if scope.contains(attempt.url()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(redirect_policy)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// # Error Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 404, 410 | HttpError → DeadLink |
/// | Other non-2xx (incl. unfollowed redirect) | HttpError → HttpError |
/// | Timeout, connection refused, DNS | NetworkError → Unreachable |
/// | Other transport error, body read error | NetworkError → Failed |
///
/// There is no retry.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(&e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            state: JobState::DeadLink,
        };
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            state: JobState::HttpError,
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => classify_transport_error(&e),
    }
}

/// Maps a reqwest error to a network failure
fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            state: JobState::Unreachable,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            state: JobState::Unreachable,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            state: JobState::Failed,
        }
    }
}
