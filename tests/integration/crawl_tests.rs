//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small sites and drive the crawl loop
//! end-to-end, checking scope, ceilings and error handling.

use site_scribe::config::FetchConfig;
use site_scribe::crawler::{build_http_client, CrawlLimits, CrawlSink, Crawler, StopReason};
use site_scribe::url::Scope;
use site_scribe::ScribeError;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Collects what the crawler reports
#[derive(Default)]
struct RecordingSink {
    pages: Vec<(String, Option<String>)>,
    progress: Vec<(usize, usize)>,
}

impl RecordingSink {
    fn urls(&self) -> Vec<String> {
        self.pages.iter().map(|(url, _)| url.clone()).collect()
    }
}

impl CrawlSink for RecordingSink {
    fn record_page(&mut self, url: &Url, title: Option<&str>) -> Result<(), ScribeError> {
        self.pages
            .push((url.to_string(), title.map(str::to_string)));
        Ok(())
    }

    fn report_progress(&mut self, visited: usize, max_urls: usize) -> Result<(), ScribeError> {
        self.progress.push((visited, max_urls));
        Ok(())
    }
}

fn crawler(max_urls: usize, max_crawl_time: Duration, request_delay: Duration) -> Crawler {
    let fetch = FetchConfig {
        timeout: 5,
        ..FetchConfig::default()
    };
    let client = build_http_client(&fetch).expect("Failed to build client");
    Crawler::new(
        client,
        CrawlLimits {
            max_urls,
            max_crawl_time,
            request_delay,
        },
    )
}

fn html_page(title: &str, links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
            title, title, anchors
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, page: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(page)
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse base URL")
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Home", &[format!("{}/page1", base), "/page2".to_string()]),
    )
    .await;
    mount_page(&server, "/page1", html_page("Page 1", &["/".to_string()])).await;
    mount_page(&server, "/page2", html_page("Page 2", &["page1".to_string()])).await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.pages_recorded, 3);
    assert_eq!(
        sink.urls(),
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
        ]
    );
    assert_eq!(sink.pages[0].1.as_deref(), Some("Home"));
    assert_eq!(sink.progress, vec![(1, 100), (2, 100), (3, 100)]);
}

#[tokio::test]
async fn test_same_host_scope_excludes_other_hosts() {
    let server = MockServer::start().await;
    let port = seed(&server).port().expect("mock server has a port");
    let external = format!("http://localhost:{}/external", port);

    mount_page(
        &server,
        "/",
        html_page("Home", &[external.clone(), "/local".to_string()]),
    )
    .await;
    mount_page(&server, "/local", html_page("Local", &[])).await;
    mount_page(&server, "/external", html_page("External", &[])).await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    let visited: Vec<String> = outcome.visited.iter().map(Url::to_string).collect();
    assert_eq!(visited.len(), 2);
    assert!(!visited.contains(&external));
}

#[tokio::test]
async fn test_follow_all_domains_visits_other_hosts() {
    let server = MockServer::start().await;
    let port = seed(&server).port().expect("mock server has a port");
    let external = format!("http://localhost:{}/external", port);

    mount_page(&server, "/", html_page("Home", &[external.clone()])).await;
    mount_page(&server, "/external", html_page("External", &[])).await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::AllDomains, &mut sink)
        .await
        .expect("Crawl failed");

    let visited: Vec<String> = outcome.visited.iter().map(Url::to_string).collect();
    assert!(visited.contains(&external));
}

#[tokio::test]
async fn test_max_urls_limits_visits() {
    let server = MockServer::start().await;
    let links: Vec<String> = (0..10).map(|i| format!("/page{}", i)).collect();

    mount_page(&server, "/", html_page("Home", &links)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(html_page("Child", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(1, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.stop_reason, StopReason::UrlLimit);
    assert_eq!(outcome.visited, vec![seed(&server)]);
    assert_eq!(outcome.pages_recorded, 1);
    assert_eq!(sink.progress, vec![(1, 1)]);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            &[
                "/about".to_string(),
                "/about#team".to_string(),
                "about".to_string(),
                "/".to_string(),
            ],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page("About", &["/#top".to_string(), "/about".to_string()]))
        .expect(1)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited.len(), 2);
    assert_eq!(outcome.pages_recorded, 2);
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            &[
                "/broken".to_string(),
                "/report.pdf".to_string(),
                "/ok".to_string(),
            ],
        ),
    )
    .await;
    mount_page(
        &server,
        "/broken",
        ResponseTemplate::new(500).set_body_raw("<html>oops</html>", "text/html"),
    )
    .await;
    mount_page(
        &server,
        "/report.pdf",
        ResponseTemplate::new(200).set_body_raw(vec![0x25, 0x50, 0x44, 0x46], "application/pdf"),
    )
    .await;
    mount_page(&server, "/ok", html_page("Ok", &[])).await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    let base = server.uri();
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.visited.len(), 4);
    assert_eq!(sink.urls(), vec![format!("{}/", base), format!("{}/ok", base)]);
}

#[tokio::test]
async fn test_unreachable_seed_records_nothing() {
    let mut sink = RecordingSink::default();
    let seed = Url::parse("http://127.0.0.1:9/").unwrap();

    let outcome = crawler(10, Duration::from_secs(10), Duration::ZERO)
        .crawl(&seed, Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.pages_recorded, 0);
    assert!(sink.pages.is_empty());
}

#[tokio::test]
async fn test_crawl_time_limit_is_respected() {
    let server = MockServer::start().await;
    let links: Vec<String> = (0..50).map(|i| format!("/page{}", i)).collect();

    mount_page(&server, "/", html_page("Home", &links)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(html_page("Child", &[]))
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let started = Instant::now();
    let outcome = crawler(1000, Duration::from_secs(1), Duration::from_millis(300))
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(outcome.stop_reason, StopReason::TimeLimit);
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
    assert!(outcome.visited.len() >= 2);
    assert!(outcome.visited.len() <= 5);
}

#[tokio::test]
async fn test_request_delay_spaces_fetches() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", &["/a".to_string(), "/b".to_string()]),
    )
    .await;
    mount_page(&server, "/a", html_page("A", &[])).await;
    mount_page(&server, "/b", html_page("B", &[])).await;

    let mut sink = RecordingSink::default();
    let started = Instant::now();
    let outcome = crawler(100, Duration::from_secs(30), Duration::from_millis(200))
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.pages_recorded, 3);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_seed_redirect_to_other_host_spelling_keeps_crawling() {
    let server = MockServer::start().await;
    let base = server.uri();
    let port = seed(&server).port().expect("mock server has a port");

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(301)
            .insert_header("location", format!("http://localhost:{}/home", port).as_str()),
    )
    .await;
    mount_page(&server, "/home", html_page("Home", &["/about".to_string()])).await;
    mount_page(&server, "/about", html_page("About", &[])).await;

    let mut sink = RecordingSink::default();
    let outcome = crawler(100, Duration::from_secs(30), Duration::ZERO)
        .crawl(&seed(&server), Scope::SameHost, &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        sink.urls(),
        vec![format!("{}/", base), format!("{}/about", base)]
    );
    assert_eq!(sink.pages[0].1.as_deref(), Some("Home"));
}
