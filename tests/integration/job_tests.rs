//! Integration tests for whole jobs
//!
//! Each test serves a small site from wiremock, runs a job through the
//! manager against an in-memory store and inspects the resulting archive.

use site_scribe::config::Config;
use site_scribe::job::Notifier;
use site_scribe::storage::SqliteStore;
use site_scribe::{JobManager, JobOptions, JobStatus, ScribeError};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::with_output(
        dir.path().join("scribe.db").to_string_lossy(),
        dir.path().join("jobs").to_string_lossy(),
    );
    config.crawler.request_delay = 0;
    config.crawler.max_crawl_time = 30;
    config.fetch.timeout = 5;
    config
}

fn manager(dir: &TempDir) -> JobManager<SqliteStore> {
    let store = SqliteStore::new_in_memory().expect("Failed to open store");
    JobManager::new(&test_config(dir), store).expect("Failed to build manager")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn archive_entries(archive_path: &Path) -> BTreeSet<String> {
    let archive = zip::ZipArchive::new(File::open(archive_path).expect("archive exists"))
        .expect("archive is a zip");
    archive.file_names().map(str::to_string).collect()
}

/// Text of `word/document.xml` for one document inside the job archive
fn document_xml(archive_path: &Path, entry: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let mut docx_bytes = Vec::new();
    archive
        .by_name(entry)
        .expect("document entry")
        .read_to_end(&mut docx_bytes)
        .unwrap();

    let mut docx = zip::ZipArchive::new(Cursor::new(docx_bytes)).expect("docx is a zip");
    let mut xml = String::new();
    docx.by_name("word/document.xml")
        .expect("document part")
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, job_id: &str, destination: &str, link: &str) -> Result<(), ScribeError> {
        self.sent.lock().unwrap().push((
            job_id.to_string(),
            destination.to_string(),
            link.to_string(),
        ));
        Ok(())
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _job_id: &str, _destination: &str, _link: &str) -> Result<(), ScribeError> {
        Err(ScribeError::Storage("mail relay unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_single_page_job_completes() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Welcome</title></head><body>
            <h1>Hello</h1><p>First paragraph of the page.</p>
            <a href="/other">Other</a></body></html>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(html("<p>never fetched</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let options = JobOptions {
        single_page_only: true,
        ..JobOptions::default()
    };

    let (job_id, handle) = manager.submit(&server.uri(), options).unwrap();
    assert_eq!(handle.await.unwrap(), JobStatus::Completed);

    let snapshot = manager.snapshot(&job_id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.total_pages, 1);
    assert_eq!(snapshot.processed_pages, 1);
    assert_eq!(
        snapshot.archive_url.as_deref(),
        Some(format!("/api/jobs/{}/download", job_id).as_str())
    );

    let pages = manager.pages(&job_id).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Welcome"));
    assert!(pages[0].document_path.is_some());

    let job = manager.job(&job_id).unwrap();
    assert!(job.completed_at.is_some());
    let archive_path = job.archive_path.expect("archive path recorded");
    let archive_path = Path::new(&archive_path);
    assert_eq!(archive_path, dir.path().join("jobs").join(&job_id).join("output.zip"));
    assert_eq!(
        archive_entries(archive_path),
        BTreeSet::from(["127_0_0_1/index.docx".to_string()])
    );

    let xml = document_xml(archive_path, "127_0_0_1/index.docx");
    assert!(xml.contains("Welcome"));
    assert!(xml.contains("First paragraph of the page."));
}

#[tokio::test]
async fn test_single_page_error_status_still_completes() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        ResponseTemplate::new(500)
            .set_body_raw("<html><body><p>Something broke</p></body></html>", "text/html"),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let options = JobOptions {
        single_page_only: true,
        ..JobOptions::default()
    };

    let seed = format!("{}/", server.uri());
    let (job_id, status) = manager.run_to_completion(&seed, options).await.unwrap();
    assert_eq!(status, JobStatus::Completed);

    let pages = manager.pages(&job_id).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some(seed.as_str()));

    let archive_path = manager.job(&job_id).unwrap().archive_path.unwrap();
    let xml = document_xml(Path::new(&archive_path), "127_0_0_1/index.docx");
    assert!(xml.contains("Something broke"));
}

#[tokio::test]
async fn test_crawl_job_end_to_end() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Home</title></head><body>
            <nav><a href="/about">About</a><a href="/blog/post.html">Post</a></nav>
            <main><h1>Home</h1><p>Welcome home.</p></main></body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/about",
        html(
            r#"<html><head><title>About</title></head><body>
            <main><h2>About us</h2><p>We write things.</p><a href="/">Home</a></main>
            </body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/blog/post.html",
        html(
            r#"<html><head><title>Post</title></head><body>
            <article><h1>A post</h1><ul><li>one</li><li>two</li></ul></article>
            </body></html>"#,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let store = SqliteStore::new_in_memory().unwrap();
    let manager = JobManager::new(&test_config(&dir), store)
        .unwrap()
        .with_notifier(notifier.clone());

    let options = JobOptions {
        notify: Some("ops@example.com".to_string()),
        ..JobOptions::default()
    };
    let (job_id, handle) = manager.submit(&server.uri(), options).unwrap();
    assert_eq!(handle.await.unwrap(), JobStatus::Completed);

    let snapshot = manager.snapshot(&job_id).unwrap();
    assert_eq!(snapshot.total_pages, 3);
    assert_eq!(snapshot.processed_pages, 3);
    assert_eq!(snapshot.progress, 100);

    let titles: Vec<Option<String>> = manager
        .pages(&job_id)
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(
        titles,
        vec![
            Some("Home".to_string()),
            Some("About".to_string()),
            Some("Post".to_string()),
        ]
    );

    let archive_path = manager.job(&job_id).unwrap().archive_path.unwrap();
    let archive_path = Path::new(&archive_path);
    assert_eq!(
        archive_entries(archive_path),
        BTreeSet::from([
            "127_0_0_1/index.docx".to_string(),
            "127_0_0_1/about/about.docx".to_string(),
            "127_0_0_1/blog/post.html/post.docx".to_string(),
        ])
    );

    let about = document_xml(archive_path, "127_0_0_1/about/about.docx");
    assert!(about.contains("About us"));
    assert!(about.contains("We write things."));

    let post = document_xml(archive_path, "127_0_0_1/blog/post.html/post.docx");
    assert!(post.contains("one"));
    assert!(post.contains("two"));

    let sent = notifier.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(
            job_id.clone(),
            "ops@example.com".to_string(),
            format!("/api/jobs/{}/download", job_id),
        )]
    );
}

#[tokio::test]
async fn test_content_selector_limits_document() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Selected</title></head><body>
            <div id="chrome"><p>Boilerplate banner</p></div>
            <div id="content"><p>The part that matters.</p></div></body></html>"#,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let options = JobOptions {
        single_page_only: true,
        content_selector: Some("#content".to_string()),
        ..JobOptions::default()
    };

    let (job_id, status) = manager.run_to_completion(&server.uri(), options).await.unwrap();
    assert_eq!(status, JobStatus::Completed);

    let archive_path = manager.job(&job_id).unwrap().archive_path.unwrap();
    let xml = document_xml(Path::new(&archive_path), "127_0_0_1/index.docx");
    assert!(xml.contains("The part that matters."));
    assert!(!xml.contains("Boilerplate banner"));
}

#[tokio::test]
async fn test_images_saved_beside_document() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Gallery</title></head><body><main>
            <p>Look at this.</p><img src="/logo.png" alt="Logo">
            <img src="/missing.gif" alt="Gone"></main></body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
    )
    .await;
    mount(&server, "/missing.gif", ResponseTemplate::new(404)).await;

    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let options = JobOptions {
        single_page_only: true,
        include_images: true,
        ..JobOptions::default()
    };

    let (job_id, status) = manager.run_to_completion(&server.uri(), options).await.unwrap();
    assert_eq!(status, JobStatus::Completed);

    let archive_path = manager.job(&job_id).unwrap().archive_path.unwrap();
    let archive_path = Path::new(&archive_path);
    assert_eq!(
        archive_entries(archive_path),
        BTreeSet::from([
            "127_0_0_1/index.docx".to_string(),
            "127_0_0_1/images/image_0.png".to_string(),
        ])
    );

    let xml = document_xml(archive_path, "127_0_0_1/index.docx");
    assert!(xml.contains("[Image: Logo - saved as images/image_0.png]"));
    assert!(!xml.contains("Gone"));
}

#[tokio::test]
async fn test_unreachable_site_fails_job() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let (job_id, handle) = manager
        .submit("http://127.0.0.1:9/", JobOptions::default())
        .unwrap();
    assert_eq!(handle.await.unwrap(), JobStatus::Failed);

    let snapshot = manager.snapshot(&job_id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Failed);
    assert!(snapshot.archive_url.is_none());
    assert!(manager.pages(&job_id).unwrap().is_empty());
    assert!(!dir.path().join("jobs").join(&job_id).join("output.zip").exists());
}

#[tokio::test]
async fn test_notification_failure_keeps_job_completed() {
    let server = MockServer::start().await;
    mount(&server, "/", html("<html><body><p>Hi</p></body></html>")).await;

    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new_in_memory().unwrap();
    let manager = JobManager::new(&test_config(&dir), store)
        .unwrap()
        .with_notifier(Arc::new(FailingNotifier));

    let options = JobOptions {
        single_page_only: true,
        notify: Some("ops@example.com".to_string()),
        ..JobOptions::default()
    };
    let (job_id, status) = manager.run_to_completion(&server.uri(), options).await.unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(manager.snapshot(&job_id).unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn test_jobs_are_isolated() {
    let server = MockServer::start().await;
    mount(&server, "/", html("<html><body><p>Shared site</p></body></html>")).await;

    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let options = JobOptions {
        single_page_only: true,
        ..JobOptions::default()
    };

    let (good_id, good) = manager.submit(&server.uri(), options.clone()).unwrap();
    let (bad_id, bad) = manager
        .submit("http://127.0.0.1:9/", JobOptions::default())
        .unwrap();

    assert_eq!(good.await.unwrap(), JobStatus::Completed);
    assert_eq!(bad.await.unwrap(), JobStatus::Failed);
    assert_ne!(good_id, bad_id);
    assert_eq!(manager.snapshot(&good_id).unwrap().status, JobStatus::Completed);
}
