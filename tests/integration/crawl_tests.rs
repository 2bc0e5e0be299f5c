//! Integration tests for the crawl pipeline
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! catalog → detail page → download → JSON cycle end-to-end. Connection
//! failures are simulated with a scripted fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tululu_scraper::config::Config;
use tululu_scraper::crawler::{
    build_http_client, CatalogCrawler, Coordinator, FetchedPage, Fetcher, HttpFetcher, RetryPolicy,
};
use tululu_scraper::storage::load_records;
use tululu_scraper::{FetchError, FetchResult, NotFoundReason};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at `site_url` and writing into `dir`
fn create_test_config(site_url: &str, dir: &Path, start_page: u32, end_page: u32) -> Config {
    let mut config = Config::default();
    config.crawler.site_url = site_url.to_string();
    config.crawler.start_page = start_page;
    config.crawler.end_page = end_page;
    config.crawler.backoff_secs = 1;
    config.crawler.request_timeout_secs = 5;
    config.output.dest_folder = dir.join("Folder");
    config.output.json_path = dir.join("data.json");
    config
}

fn catalog_page(book_ids: &[u32]) -> String {
    let rows: String = book_ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr><td><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></td></tr></table>"#
            )
        })
        .collect();
    format!("<html><body><div id=\"content\">{}</div></body></html>", rows)
}

fn detail_page(id: u32) -> String {
    format!(
        r#"<html><body>
        <h1>Книга {id} &nbsp; :: &nbsp; Автор {id}</h1>
        <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div>
        <span class="d_book">Жанр: <a href="/l55/">Научная фантастика</a></span>
        <div class="texts"><span class="black">Комментарий к {id}</span></div>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn redirect_home() -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("Location", "/")
}

/// Mounts detail page, cover image and text edition of one book
async fn mount_book(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/b{}/", id)))
        .respond_with(html(detail_page(id)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/shots/{}.jpg", id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, id as u8]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("Текст книги {}", id)))
        .mount(server)
        .await;
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

fn http_fetcher() -> HttpFetcher {
    let config = Config::default();
    HttpFetcher::new(build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_full_crawl_two_books() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[1, 2])))
        .mount(&mock_server)
        .await;
    mount_book(&mock_server, 1).await;
    mount_book(&mock_server, 2).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    let coordinator = Coordinator::new(config.clone()).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.books_discovered, 2);
    assert_eq!(summary.books_recorded, 2);
    assert_eq!(summary.texts_written, 2);
    assert_eq!(summary.images_written, 2);

    let records = load_records(&config.output.json_path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Книга 1");
    assert_eq!(records[0].author, "Автор 1");
    assert_eq!(records[0].genres, ["Научная фантастика"]);
    assert_eq!(records[0].comments, ["Комментарий к 1"]);
    assert_eq!(
        records[0].image_url.as_str(),
        format!("{}/shots/1.jpg", mock_server.uri())
    );
    assert_eq!(records[1].title, "Книга 2");

    let books_dir = config.output.books_dir();
    let images_dir = config.output.images_dir();
    assert_eq!(count_files(&books_dir), 2);
    assert_eq!(count_files(&images_dir), 2);
    assert_eq!(
        std::fs::read_to_string(books_dir.join("Книга 1.txt")).unwrap(),
        "Текст книги 1"
    );
    assert_eq!(
        std::fs::read(images_dir.join("2.jpg")).unwrap(),
        [0xFFu8, 0xD8, 2]
    );

    let json = std::fs::read_to_string(&config.output.json_path).unwrap();
    assert!(json.contains("\"genre\""));
    assert!(json.contains("Книга 1"));
}

#[tokio::test]
async fn test_text_redirect_keeps_record() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[4, 5])))
        .mount(&mock_server)
        .await;
    mount_book(&mock_server, 4).await;

    // Book 5 has a detail page and a cover, but no text edition
    Mock::given(method("GET"))
        .and(path("/b5/"))
        .respond_with(html(detail_page(5)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/5.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "5"))
        .respond_with(redirect_home())
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    let summary = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.books_recorded, 2);
    assert_eq!(summary.texts_written, 1);
    assert_eq!(summary.images_written, 2);

    let records = load_records(&config.output.json_path).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Книга 4", "Книга 5"]);

    let books_dir = config.output.books_dir();
    assert!(books_dir.join("Книга 4.txt").exists());
    assert!(!books_dir.join("Книга 5.txt").exists());
}

#[tokio::test]
async fn test_missing_covers_keep_records() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[6, 7])))
        .mount(&mock_server)
        .await;

    // Book 6 has its cover redirected, book 7 has no cover at all
    for id in [6u32, 7] {
        Mock::given(method("GET"))
            .and(path(format!("/b{}/", id)))
            .respond_with(html(detail_page(id)))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/txt.php"))
            .and(query_param("id", id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("Текст книги {}", id)))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/shots/6.jpg"))
        .respond_with(redirect_home())
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/7.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    // Redirects are not followed
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("home".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    let summary = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.books_recorded, 2);
    assert_eq!(summary.images_written, 0);
    assert_eq!(summary.texts_written, 2);
    assert_eq!(count_files(&config.output.images_dir()), 0);

    let records = load_records(&config.output.json_path).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Книга 6", "Книга 7"]);
}

#[tokio::test]
async fn test_redirected_detail_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[1, 9])))
        .mount(&mock_server)
        .await;
    mount_book(&mock_server, 1).await;
    Mock::given(method("GET"))
        .and(path("/b9/"))
        .respond_with(redirect_home())
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    let summary = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.books_discovered, 2);
    assert_eq!(summary.books_recorded, 1);
    assert_eq!(summary.books_skipped, 1);

    let records = load_records(&config.output.json_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Книга 1");
}

#[tokio::test]
async fn test_skip_flags_still_record_metadata() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[3])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b3/"))
        .respond_with(html(detail_page(3)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unused"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    config.output.skip_images = true;
    config.output.skip_text = true;

    let summary = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.books_recorded, 1);
    assert_eq!(summary.texts_written, 0);
    assert_eq!(summary.images_written, 0);
    assert!(!config.output.books_dir().exists());
    assert!(!config.output.images_dir().exists());
    assert_eq!(load_records(&config.output.json_path).unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_counts_rows_and_skips_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(html(catalog_page(&[1, 2, 3])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/l55/2"))
        .respond_with(redirect_home())
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/l55/3"))
        .respond_with(html(catalog_page(&[4, 5])))
        .mount(&mock_server)
        .await;
    // The end of the range is exclusive
    Mock::given(method("GET"))
        .and(path("/l55/4"))
        .respond_with(html(catalog_page(&[6])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = CatalogCrawler::new(mock_server.uri(), "l55");
    let crawl = crawler
        .crawl(&http_fetcher(), &RetryPolicy::default(), 1, 4)
        .await
        .unwrap();

    let ids: Vec<u64> = crawl.entries.iter().map(|e| e.book_id.number()).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
    assert_eq!(crawl.pages_fetched, 2);
    assert_eq!(crawl.pages_skipped, 1);
    assert_eq!(
        crawl.entries[0].detail_url.as_str(),
        format!("{}/b1/", mock_server.uri())
    );
}

#[tokio::test]
async fn test_empty_range_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html(catalog_page(&[1])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 3, 3);
    let summary = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.books_discovered, 0);
    assert!(load_records(&config.output.json_path).unwrap().is_empty());
}

#[tokio::test]
async fn test_http_fetcher_classifies_redirect_as_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b1/"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/b2/"))
        .mount(&mock_server)
        .await;
    // Must never be reached: the redirect is not followed
    Mock::given(method("GET"))
        .and(path("/b2/"))
        .respond_with(html(detail_page(2)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/b1/", mock_server.uri())).unwrap();
    let error = http_fetcher().fetch(&url, &[]).await.unwrap_err();

    match error {
        FetchError::NotFound { reason, .. } => assert_eq!(
            reason,
            NotFoundReason::Redirect {
                status: 301,
                location: Some("/b2/".to_string())
            }
        ),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_classifies_error_status_as_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = http_fetcher();

    let missing = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
    let error = fetcher.fetch(&missing, &[]).await.unwrap_err();
    assert!(matches!(
        error,
        FetchError::NotFound {
            reason: NotFoundReason::Status(404),
            ..
        }
    ));

    let broken = Url::parse(&format!("{}/broken", mock_server.uri())).unwrap();
    let error = fetcher.fetch(&broken, &[]).await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_http_fetcher_sends_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "239"))
        .respond_with(ResponseTemplate::new(200).set_body_string("text"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/txt.php", mock_server.uri())).unwrap();
    let page = http_fetcher().fetch(&url, &[("id", "239")]).await.unwrap();

    assert_eq!(page.status_code, 200);
    assert_eq!(page.text(), "text");
    assert_eq!(page.url.query(), Some("id=239"));
}

#[tokio::test]
async fn test_http_fetcher_connection_refused() {
    // Bind and immediately release a port so nothing listens on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let url = Url::parse(&format!("http://127.0.0.1:{}/l55/1", port)).unwrap();
    let error = http_fetcher().fetch(&url, &[]).await.unwrap_err();

    assert!(error.is_connection_failure(), "got {:?}", error);
}

/// Serves canned responses by URL path; `None` simulates a dropped connection
struct ScriptedFetcher {
    responses: HashMap<String, Option<String>>,
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url, _query: &[(&str, &str)]) -> FetchResult<FetchedPage> {
        match self.responses.get(url.path()) {
            Some(Some(body)) => Ok(FetchedPage {
                url: url.clone(),
                status_code: 200,
                body: Bytes::from(body.clone()),
            }),
            Some(None) => Err(FetchError::ConnectionFailure {
                url: url.to_string(),
                message: "connection reset by peer".to_string(),
            }),
            None => Err(FetchError::NotFound {
                url: url.to_string(),
                reason: NotFoundReason::Status(404),
            }),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_connection_failure_on_one_page_costs_one_backoff() {
    let dir = TempDir::new().unwrap();

    let mut responses = HashMap::new();
    for page in 1..=5u32 {
        if page == 3 {
            responses.insert("/l55/3".to_string(), None);
            continue;
        }
        responses.insert(format!("/l55/{}", page), Some(catalog_page(&[page])));
        responses.insert(format!("/b{}/", page), Some(detail_page(page)));
    }
    let fetcher = ScriptedFetcher { responses };

    let mut config = create_test_config("https://tululu.org", dir.path(), 1, 6);
    config.crawler.backoff_secs = 20;
    config.output.skip_images = true;
    config.output.skip_text = true;

    let start = tokio::time::Instant::now();
    let summary = Coordinator::with_fetcher(config.clone(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(summary.catalog_pages_fetched, 4);
    assert_eq!(summary.catalog_pages_skipped, 1);
    assert_eq!(summary.books_recorded, 4);
    assert!(elapsed >= Duration::from_secs(20), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(40), "elapsed {:?}", elapsed);

    let records = load_records(&config.output.json_path).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Книга 1", "Книга 2", "Книга 4", "Книга 5"]);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_book_is_skipped_after_backoff() {
    let dir = TempDir::new().unwrap();

    let mut responses = HashMap::new();
    responses.insert("/l55/1".to_string(), Some(catalog_page(&[1, 2])));
    responses.insert("/b1/".to_string(), None);
    responses.insert("/b2/".to_string(), Some(detail_page(2)));
    let fetcher = ScriptedFetcher { responses };

    let mut config = create_test_config("https://tululu.org", dir.path(), 1, 2);
    config.crawler.backoff_secs = 20;
    config.output.skip_images = true;
    config.output.skip_text = true;

    let start = tokio::time::Instant::now();
    let summary = Coordinator::with_fetcher(config.clone(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(20));
    assert_eq!(summary.books_skipped, 1);
    assert_eq!(summary.books_recorded, 1);

    let records = load_records(&config.output.json_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Книга 2");
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_cover_costs_one_backoff_and_keeps_record() {
    let dir = TempDir::new().unwrap();

    let mut responses = HashMap::new();
    responses.insert("/l55/1".to_string(), Some(catalog_page(&[1])));
    responses.insert("/b1/".to_string(), Some(detail_page(1)));
    responses.insert("/shots/1.jpg".to_string(), None);
    responses.insert("/txt.php".to_string(), Some("Текст книги 1".to_string()));
    let fetcher = ScriptedFetcher { responses };

    let mut config = create_test_config("https://tululu.org", dir.path(), 1, 2);
    config.crawler.backoff_secs = 20;

    let start = tokio::time::Instant::now();
    let summary = Coordinator::with_fetcher(config.clone(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(20), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(40), "elapsed {:?}", elapsed);
    assert_eq!(summary.books_recorded, 1);
    assert_eq!(summary.images_written, 0);
    assert_eq!(summary.texts_written, 1);
    assert!(config.output.books_dir().join("Книга 1.txt").exists());

    let records = load_records(&config.output.json_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Книга 1");
}

#[tokio::test]
async fn test_malformed_detail_page_aborts_run() {
    let dir = TempDir::new().unwrap();

    let mut responses = HashMap::new();
    responses.insert("/l55/1".to_string(), Some(catalog_page(&[1])));
    responses.insert(
        "/b1/".to_string(),
        Some(r#"<h1>No delimiter here</h1><div class="bookimage"><img src="/x.jpg"></div>"#.to_string()),
    );
    let fetcher = ScriptedFetcher { responses };

    let config = create_test_config("https://tululu.org", dir.path(), 1, 2);
    let result = Coordinator::with_fetcher(config.clone(), fetcher)
        .unwrap()
        .run()
        .await;

    assert!(matches!(
        result,
        Err(tululu_scraper::ScraperError::Parse { .. })
    ));
    assert!(!config.output.json_path.exists());
}
