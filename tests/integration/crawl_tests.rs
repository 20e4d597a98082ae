//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use mirrorcrawl::config::Config;
use mirrorcrawl::crawler::Downloader;
use mirrorcrawl::output::CrawlStatistics;
use mirrorcrawl::state::JobState;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `output`
fn create_test_config(output: &Path, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.workers = 4;
    config.http.timeout_secs = 5;
    config.http.user_agent = "MirrorTestBot/1.0".to_string();
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

/// An HTML response
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

/// Where a path of the mock server lands in the mirror
fn mirrored(output: &Path, url_path: &str) -> PathBuf {
    let mut file = output.join("127.0.0.1");
    for segment in url_path.split('/').filter(|s| !s.is_empty()) {
        file.push(segment);
    }
    if url_path.ends_with('/') {
        file.push("index.html");
    }
    file
}

/// Crawls the mock server from its root, failing the test if the run hangs
async fn crawl_server(server: &MockServer, config: &Config) -> CrawlStatistics {
    let seed = Url::parse(&format!("{}/", server.uri())).expect("Failed to parse seed");
    let downloader = Downloader::new(seed, config).expect("Failed to create downloader");

    tokio::time::timeout(Duration::from_secs(30), downloader.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed")
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "MirrorTestBot/1.0"))
        .respond_with(html(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="https://other.com/">Elsewhere</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html><body>About</body></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 0);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 1);
    assert_eq!(stats.mirrored(), 1);
    assert_eq!(stats.links_discovered, 2);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    assert!(mirrored(output.path(), "/").is_file());
    assert!(!mirrored(output.path(), "/about").exists());
}

#[tokio::test]
async fn test_stylesheet_bypasses_depth_limit() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><link rel="stylesheet" href="style.css"></head>
            <body><a href="/next">Next</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("body { color: black }", "text/css"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 0);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.mirrored(), 2);

    let css = std::fs::read_to_string(mirrored(output.path(), "/style.css")).unwrap();
    assert_eq!(css, "body { color: black }");
}

#[tokio::test]
async fn test_dead_link_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/missing">Missing</a><a href="/present">Present</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/present"))
        .respond_with(html("<p>here</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 3);
    assert_eq!(stats.mirrored(), 2);
    assert_eq!(stats.count(JobState::DeadLink), 1);

    assert!(!mirrored(output.path(), "/missing").exists());
    assert!(mirrored(output.path(), "/present").is_file());
}

#[tokio::test]
async fn test_latin1_page_links_are_followed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let body: &[u8] = b"<html><body><p>Caf\xe9 cr\xe8me</p><a href=\"/menu\">Menu</a></body></html>";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=iso-8859-1"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/menu"))
        .respond_with(html("<p>menu</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.mirrored(), 2);

    // The stored body keeps its original bytes
    let stored = std::fs::read(mirrored(output.path(), "/")).unwrap();
    assert_eq!(stored, body);
}

#[tokio::test]
async fn test_server_error_is_handled() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/broken">Broken</a>"#))
        .mount(&mock_server)
        .await;

    // No retry: exactly one request
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.count(JobState::HttpError), 1);
    assert!(!mirrored(output.path(), "/broken").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cyclic_links_fetched_once() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // Every page links to every page, itself included
    let all_links = r##"
        <a href="/">Home</a>
        <a href="/a">A</a>
        <a href="/b">B</a>
        <a href="/c">C</a>
        <a href="/a#fragment">A again</a>
    "##;

    for page in ["/", "/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(all_links))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(output.path(), 10);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 4);
    assert_eq!(stats.mirrored(), 4);
    assert_eq!(stats.urls_claimed, 4);
    assert_eq!(stats.jobs_dropped, 0);
}

#[tokio::test]
async fn test_depth_limit_on_link_chain() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/1">1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    for (page, next) in [("/1", "/2"), ("/2", "/3"), ("/3", "/4")] {
        let expected: u64 = if page == "/3" { 0 } else { 1 };
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(&format!(r#"<a href="{}">next</a>"#, next)))
            .expect(expected)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(output.path(), 2);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 3);
    assert!(mirrored(output.path(), "/2").is_file());
    assert!(!mirrored(output.path(), "/3").exists());
}

#[tokio::test]
async fn test_non_html_body_is_not_parsed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/hidden">not a link in plain text</a>"#,
            "text/plain",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("<p>hidden</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 3);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 1);
    assert_eq!(stats.links_discovered, 0);
}

#[tokio::test]
async fn test_full_queue_drops_jobs_and_terminates() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a>
            <a href="/p4">4</a><a href="/p5">5</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>leaf</p>"))
        .mount(&mock_server)
        .await;

    // One worker: while it processes the seed nobody drains the queue, so
    // only the first of the five links fits
    let mut config = create_test_config(output.path(), 1);
    config.crawler.workers = 1;
    config.crawler.queue_capacity = 1;

    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 2);
    assert_eq!(stats.jobs_dropped, 4);
    assert!(mirrored(output.path(), "/p1").is_file());
    assert!(!mirrored(output.path(), "/p2").exists());
}

#[tokio::test]
async fn test_same_host_redirect_followed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let new_location = format!("{}/new/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/old">Old</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", new_location.as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Relative links on the redirected page resolve against its final URL
    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<img src="logo.png">"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("PNG", "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.mirrored(), 3);

    // Stored under the requested URL, not the redirect target
    let body = std::fs::read_to_string(mirrored(output.path(), "/old")).unwrap();
    assert!(body.contains("logo.png"));
    assert!(mirrored(output.path(), "/new/logo.png").is_file());
}

#[tokio::test]
async fn test_off_host_redirect_not_followed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/leave">Leave</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leave"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "http://other.invalid/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.count(JobState::HttpError), 1);
    assert!(!mirrored(output.path(), "/leave").exists());
}

#[tokio::test]
async fn test_write_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;

    // The output root is a regular file, so no directory can be created in it
    let blocker = NamedTempFile::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/child">Child</a>"#))
        .mount(&mock_server)
        .await;

    // Links are still followed after a failed write
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html("<p>child</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(blocker.path(), 1);
    let stats = crawl_server(&mock_server, &config).await;

    assert_eq!(stats.total_jobs, 2);
    assert_eq!(stats.count(JobState::PersistFailed), 2);
    assert_eq!(stats.bytes_written, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_sessions_in_one_process() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;
    let first_output = TempDir::new().unwrap();
    let second_output = TempDir::new().unwrap();

    for server in [&first_server, &second_server] {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(r#"<a href="/shared">Shared</a>"#))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/shared"))
            .respond_with(html("<p>shared</p>"))
            .expect(1)
            .mount(server)
            .await;
    }

    let first_config = create_test_config(first_output.path(), 1);
    let second_config = create_test_config(second_output.path(), 1);

    let (first, second) = tokio::join!(
        crawl_server(&first_server, &first_config),
        crawl_server(&second_server, &second_config)
    );

    // Each session has its own visited set
    assert_eq!(first.mirrored(), 2);
    assert_eq!(second.mirrored(), 2);
    assert!(mirrored(first_output.path(), "/shared").is_file());
    assert!(mirrored(second_output.path(), "/shared").is_file());
}

#[tokio::test]
async fn test_crawl_entry_point_rejects_bad_seed() {
    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 1);

    let result = mirrorcrawl::crawl("not a url", config).await;
    assert!(result.is_err());
}
