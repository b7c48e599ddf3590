//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::time::{Duration, Instant};
use sumi_atlas::config::Config;
use sumi_atlas::crawler::{crawl, Crawler};
use sumi_atlas::output::{emit_sitemap, EmitTarget};
use sumi_atlas::state::UrlState;
use sumi_atlas::{AtlasError, ConfigError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay and no cooldown
fn create_test_config(root: &str, max_concurrency: usize) -> Config {
    let mut config = Config::new(root, max_concurrency);
    config.http.request_delay_ms = 0;
    config.http.request_timeout_secs = 10;
    config.crawler.retry_cooldown_secs = 0;
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>t</title></head><body>{}</body></html>",
            body
        ))
        .insert_header("content-type", "text/html")
}

/// Mounts a page that must be requested exactly once
async fn mount_once(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html_page(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_once(
        &mock_server,
        "/",
        &format!(
            r#"<link rel="stylesheet" href="/style.css">
            <script src="https://cdn.example.net/app.js"></script>
            <a href="{}/page1">Page 1</a>
            <a href="/page2?ref=home#top">Page 2</a>
            <a href="https://elsewhere.example.org/">External</a>"#,
            base_url
        ),
    )
    .await;
    mount_once(&mock_server, "/page1", r#"<img src="/logo.png"><a href="/">Home</a>"#).await;
    mount_once(&mock_server, "/page2", "Content 2").await;

    let crawler = Crawler::new(create_test_config(&base_url, 4)).expect("Failed to create crawler");
    let outcome = crawler.run().await;

    let root = format!("{}/", base_url);
    let page1 = format!("{}/page1", base_url);
    let page2 = format!("{}/page2", base_url);

    assert_eq!(outcome.sitemap.len(), 3);
    assert!(outcome.deferred.is_empty());

    let home = &outcome.sitemap[&root];
    assert!(home.is_root());
    assert_eq!(
        home.links.iter().cloned().collect::<Vec<_>>(),
        vec![page1.clone(), page2.clone()]
    );
    assert!(home.assets.contains(&format!("{}/style.css", base_url)));
    assert!(home.assets.contains("https://cdn.example.net/app.js"));

    assert_eq!(outcome.sitemap[&page1].parent, root);
    assert!(outcome.sitemap[&page1].assets.contains(&format!("{}/logo.png", base_url)));

    // A page without outbound links is still recorded
    assert!(outcome.sitemap[&page2].links.is_empty());
    assert_eq!(outcome.sitemap[&page2].parent, root);

    assert_eq!(outcome.report.pages_indexed, 3);
    assert_eq!(outcome.report.retry.attempted, 0);
}

#[tokio::test]
async fn test_cycle_terminates_without_duplicates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_once(&mock_server, "/a", r#"<a href="b">B</a>"#).await;
    mount_once(&mock_server, "/b", r#"<a href="/c">C</a>"#).await;
    mount_once(
        &mock_server,
        "/c",
        &format!(r#"<a href="{}/a">A</a>"#, base_url),
    )
    .await;

    let root = format!("{}/a", base_url);
    let crawler = Crawler::new(create_test_config(&root, 1)).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(10), crawler.run())
        .await
        .expect("Crawl of a cyclic site did not terminate");

    assert_eq!(
        outcome.sitemap.keys().cloned().collect::<Vec<_>>(),
        vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ]
    );
    assert_eq!(outcome.sitemap[&format!("{}/b", base_url)].parent, root);
    assert_eq!(
        outcome.sitemap[&format!("{}/c", base_url)].parent,
        format!("{}/b", base_url)
    );
}

#[tokio::test]
async fn test_dense_graph_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let pages: Vec<String> = (0..12).map(|i| format!("/p{}", i)).collect();
    let all_links: String = pages
        .iter()
        .map(|p| format!(r#"<a href="{}">{}</a>"#, p, p))
        .collect();

    for page in &pages {
        mount_once(&mock_server, page, &all_links).await;
    }

    let root = format!("{}/p0", mock_server.uri());
    let crawler = Crawler::new(create_test_config(&root, 8)).unwrap();
    let outcome = crawler.run().await;

    assert_eq!(outcome.sitemap.len(), pages.len());
    assert!(outcome.deferred.is_empty());
    for page in outcome.sitemap.values() {
        assert_eq!(page.links.len(), pages.len());
    }
}

#[tokio::test]
async fn test_failure_defers_and_retries_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_once(
        &mock_server,
        "/",
        r#"<a href="/fail">Fail</a><a href="/slow">Slow</a>"#,
    )
    .await;

    // Fails in the main pass and again in the retry pass
    Mock::given(method("GET"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    // Already in flight when /fail trips the breaker
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(r#"<a href="/after">After</a>"#).set_delay(Duration::from_millis(400)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Discovered after the breaker tripped: only fetched by the retry pass
    mount_once(&mock_server, "/after", "tail").await;

    let mut config = create_test_config(&base_url, 4);
    config.http.request_delay_ms = 50;
    let crawler = Crawler::new(config).unwrap();
    let outcome = crawler.run().await;

    let root = format!("{}/", base_url);
    let fail = format!("{}/fail", base_url);
    let slow = format!("{}/slow", base_url);
    let after = format!("{}/after", base_url);

    assert!(outcome.sitemap.contains_key(&root));
    assert!(outcome.sitemap.contains_key(&slow));
    assert!(outcome.sitemap.contains_key(&after));
    assert_eq!(outcome.sitemap[&after].parent, slow);

    assert_eq!(outcome.deferred.len(), 1);
    assert_eq!(outcome.deferred[&fail], root);
    assert!(!outcome.sitemap.contains_key(&fail));
    assert_eq!(crawler.state().url_state(&fail), UrlState::Deferred);

    assert_eq!(outcome.report.main_pass.failed, 1);
    assert_eq!(outcome.report.main_pass.skipped, 1);
    assert_eq!(outcome.report.retry.attempted, 2);
    assert_eq!(outcome.report.retry.recovered, 1);
}

#[tokio::test]
async fn test_no_url_in_both_sitemap_and_deferred() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..6).map(|i| format!(r#"<a href="/n{}">n</a>"#, i)).collect();
    mount_once(&mock_server, "/", &links).await;
    for i in 0..6 {
        let status = if i % 2 == 0 { 200 } else { 503 };
        Mock::given(method("GET"))
            .and(path(format!("/n{}", i)))
            .respond_with(ResponseTemplate::new(status).set_body_string("<a href=\"/\">home</a>"))
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(create_test_config(&base_url, 3)).unwrap();
    let outcome = crawler.run().await;

    for url in outcome.deferred.keys() {
        assert!(
            !outcome.sitemap.contains_key(url),
            "{} is both indexed and deferred",
            url
        );
    }
    for i in (1..6).step_by(2) {
        assert!(outcome.deferred.contains_key(&format!("{}/n{}", base_url, i)));
    }
    assert_eq!(crawler.state().counts().in_flight, 0);
}

#[tokio::test]
async fn test_permit_pool_restored_after_run() {
    let mock_server = MockServer::start().await;
    mount_once(&mock_server, "/", r#"<a href="/x">x</a><a href="/y">y</a>"#).await;
    mount_once(&mock_server, "/x", r#"<a href="/y">y</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/y"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    crawler.run().await;

    assert_eq!(crawler.available_permits(), 5);
}

#[tokio::test]
async fn test_concurrency_limit_bounds_throughput() {
    let mock_server = MockServer::start().await;
    let children: String = (0..10).map(|i| format!(r#"<a href="/c{}">c</a>"#, i)).collect();
    mount_once(&mock_server, "/", &children).await;
    for i in 0..10 {
        Mock::given(method("GET"))
            .and(path(format!("/c{}", i)))
            .respond_with(html_page("").set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(create_test_config(&mock_server.uri(), 2)).unwrap();
    let outcome = crawler.run().await;

    assert_eq!(outcome.sitemap.len(), 11);
    // Ten 200ms responses, two at a time
    assert!(
        outcome.report.elapsed >= Duration::from_millis(1000),
        "finished in {:?}, more than 2 requests ran at once",
        outcome.report.elapsed
    );
}

#[tokio::test]
async fn test_retry_pass_is_sequential() {
    let mock_server = MockServer::start().await;
    let links: String = (0..4).map(|i| format!(r#"<a href="/d{}">d</a>"#, i)).collect();
    mount_once(&mock_server, "/", &links).await;
    for i in 0..4 {
        Mock::given(method("GET"))
            .and(path(format!("/d{}", i)))
            .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(250)))
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(create_test_config(&mock_server.uri(), 4)).unwrap();
    crawler.crawl().await;
    assert_eq!(crawler.state().counts().deferred, 4);

    let started = Instant::now();
    let stats = crawler.retry_deferred().await;
    let elapsed = started.elapsed();

    assert_eq!(stats.attempted, 4);
    assert_eq!(stats.recovered, 0);
    // Four 250ms failures, one at a time
    assert!(
        elapsed >= Duration::from_millis(1000),
        "retry pass took {:?}, retries overlapped",
        elapsed
    );
}

#[tokio::test]
async fn test_cooldown_separates_passes() {
    let mock_server = MockServer::start().await;
    mount_once(&mock_server, "/", r#"<a href="/down">down</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.crawler.retry_cooldown_secs = 1;
    let outcome = Crawler::new(config).unwrap().run().await;

    assert_eq!(outcome.report.retry.attempted, 1);
    assert!(outcome.report.elapsed >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_cooldown_skipped_without_failures() {
    let mock_server = MockServer::start().await;
    mount_once(&mock_server, "/", r#"<a href="/up">up</a>"#).await;
    mount_once(&mock_server, "/up", "").await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.crawler.retry_cooldown_secs = 1;
    let outcome = Crawler::new(config).unwrap().run().await;

    assert!(outcome.deferred.is_empty());
    assert_eq!(outcome.report.retry.attempted, 0);
    assert!(
        outcome.report.elapsed < Duration::from_millis(800),
        "run took {:?}, cooldown was not skipped",
        outcome.report.elapsed
    );
}

#[tokio::test]
async fn test_invalid_config_makes_no_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = Crawler::new(create_test_config(&mock_server.uri(), 0));
    assert!(matches!(
        result,
        Err(AtlasError::Config(ConfigError::Validation(_)))
    ));

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.crawler.root = None;
    assert!(matches!(
        Crawler::new(config),
        Err(AtlasError::Config(ConfigError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_run_and_emit_to_directory() {
    let mock_server = MockServer::start().await;
    mount_once(&mock_server, "/", r#"<a href="/about">About</a>"#).await;
    mount_once(&mock_server, "/about", "").await;

    let output_dir = tempfile::TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), 2);
    config.output.directory = Some(output_dir.path().to_path_buf());

    let outcome = crawl(config).await.unwrap();
    assert_eq!(outcome.domain, "127.0.0.1");
    let target = emit_sitemap(&outcome.sitemap, &outcome.domain, Some(output_dir.path())).unwrap();

    let expected = output_dir.path().join("127.0.0.1.json");
    assert_eq!(target, EmitTarget::File(expected.clone()));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(expected).unwrap()).unwrap();
    let root = format!("{}/", mock_server.uri());
    let about = format!("{}/about", mock_server.uri());
    assert_eq!(written[&root]["links"][0], about);
    assert_eq!(written[&about]["parent"], root);
}
