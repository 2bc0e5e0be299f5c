//! Integration tests for the static site stage
//!
//! These tests render a record set written by the storage layer and serve the
//! result over a real socket.

use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tululu_scraper::config::RenderConfig;
use tululu_scraper::output::{render_site, serve_listener};
use tululu_scraper::storage::{save_records, BookRecord};
use url::Url;

fn records(count: usize) -> Vec<BookRecord> {
    (1..=count)
        .map(|i| BookRecord {
            title: format!("Книга {}", i),
            author: format!("Автор {}", i),
            image_url: Url::parse(&format!("https://tululu.org/shots/{}.jpg", i)).unwrap(),
            genres: vec!["Научная фантастика".to_string()],
            comments: vec![],
        })
        .collect()
}

fn render_config(pages_dir: PathBuf) -> RenderConfig {
    RenderConfig {
        pages_dir,
        ..RenderConfig::default()
    }
}

#[test]
fn test_render_site_pages_of_ten() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("data.json");
    save_records(&json_path, &records(25)).unwrap();

    let config = render_config(dir.path().join("Pages"));
    let written = render_site(&json_path, &config).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["index1.html", "index2.html", "index3.html"]);

    let first = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(first.matches("<div class=\"card\">").count(), 10);
    assert!(first.contains("Книга 1<"));
    assert!(first.contains("page 1 of 3"));

    let last = std::fs::read_to_string(&written[2]).unwrap();
    assert_eq!(last.matches("<div class=\"card\">").count(), 5);
    assert!(last.contains("Книга 25"));
}

#[test]
fn test_render_site_removes_stale_pages() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("data.json");
    let pages_dir = dir.path().join("Pages");
    let config = render_config(pages_dir.clone());

    save_records(&json_path, &records(30)).unwrap();
    render_site(&json_path, &config).unwrap();
    std::fs::write(pages_dir.join("style.css"), "body {}").unwrap();

    save_records(&json_path, &records(5)).unwrap();
    render_site(&json_path, &config).unwrap();

    assert!(pages_dir.join("index1.html").exists());
    assert!(!pages_dir.join("index2.html").exists());
    assert!(!pages_dir.join("index3.html").exists());
    assert!(pages_dir.join("style.css").exists());
}

#[test]
fn test_render_site_missing_record_set() {
    let dir = TempDir::new().unwrap();
    let config = render_config(dir.path().join("Pages"));
    assert!(render_site(&dir.path().join("missing.json"), &config).is_err());
}

#[tokio::test]
async fn test_serve_rendered_pages() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("data.json");
    save_records(&json_path, &records(3)).unwrap();
    render_site(&json_path, &render_config(dir.path().join("Pages"))).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let root = dir.path().to_path_buf();
    let server = tokio::spawn(async move { serve_listener(listener, &root).await });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let response = client
        .get(format!("http://{}/Pages/index1.html", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Книга 3"));

    let missing = client
        .get(format!("http://{}/Pages/index9.html", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    server.abort();
}
