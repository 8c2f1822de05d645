//! Integration tests for the pipeline
//!
//! These tests use wiremock to serve page sets and generated PDFs, and run
//! the full discover/download/merge cycle end-to-end against a temp directory.

use chrono::NaiveDate;
use lopdf::{dictionary, Document, Object};
use paper_trawl::config::{Config, CrawlerConfig, OutputConfig, SiteEntry};
use paper_trawl::document::{DocumentError, DocumentFormat, PdfFormat};
use paper_trawl::runner::run_sites;
use paper_trawl::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and retry delays
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            page_timeout_secs: 5,
            document_timeout_secs: 5,
            workers: 3,
            max_attempts: 3,
            retry_delay_ms: 10,
        },
        ..Config::default()
    }
}

/// Builds a PDF whose pages all carry `width` as their MediaBox width
fn pdf_bytes(pages: usize, width: i64) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }))
        })
        .collect();

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(842),
    ];
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}

/// A minimal page linking to each of `hrefs`
fn html(hrefs: &[&str]) -> String {
    let links: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    format!("<html><body>\n{}</body></html>", links)
}

async fn mount_page(server: &MockServer, route: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(hrefs)))
        .mount(server)
        .await;
}

async fn mount_pdf(server: &MockServer, route: &str, pages: usize, width: i64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_bytes(pages, width)))
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/html/node_1.html", server.uri())).unwrap()
}

/// Widths of every page in the merged file, in page order
fn page_widths(path: &Path) -> Vec<i64> {
    let document = Document::load(path).unwrap();
    document
        .get_pages()
        .into_values()
        .map(|id| {
            let page = document.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_end_to_end_merge_in_discovery_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["node_2.html", "node_3.html"]).await;
    mount_page(&server, "/html/node_2.html", &["../pdf/X.pdf"]).await;
    mount_page(&server, "/html/node_3.html", &["../pdf/Y.pdf"]).await;
    mount_pdf(&server, "/pdf/X.pdf", 3, 301).await;
    mount_pdf(&server, "/pdf/Y.pdf", 5, 302).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.candidates, 2);
    assert!(report.outcome.success);
    assert_eq!(report.total_units(), 8);
    assert_eq!(
        page_widths(&dir.path().join("merged.pdf")),
        vec![301, 301, 301, 302, 302, 302, 302, 302]
    );
    assert_eq!(dir_listing(dir.path()), vec!["merged.pdf"]);
}

#[tokio::test]
async fn test_cyclic_links_visit_each_page_once() {
    let server = MockServer::start().await;

    // one fetch while walking, one while collecting
    Mock::given(method("GET"))
        .and(path("/html/node_1.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(html(&["node_2.html", "node_1.html"])),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html/node_2.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(html(&["node_1.html", "/pdf/A.pdf"])),
        )
        .expect(2)
        .mount(&server)
        .await;
    mount_pdf(&server, "/pdf/A.pdf", 2, 300).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.total_units(), 2);
}

#[tokio::test]
async fn test_unreachable_seed_stages_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/node_1.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline.run(&seed(&server), &output_dir, None).await.unwrap();

    assert_eq!(report.total_units(), 0);
    assert!(!report.outcome.success);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_pages_without_documents_return_zero() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["node_2.html"]).await;
    mount_page(&server, "/html/node_2.html", &["/about.html"]).await;

    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline.run(&seed(&server), &output_dir, None).await.unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.candidates, 0);
    assert_eq!(report.total_units(), 0);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["node_2.html", "node_3.html"]).await;
    Mock::given(method("GET"))
        .and(path("/html/node_2.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/html/node_3.html", &["/pdf/B.pdf"]).await;
    mount_pdf(&server, "/pdf/B.pdf", 4, 300).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.total_units(), 4);
}

#[tokio::test]
async fn test_exhausted_retries_leave_no_staged_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["/pdf/gone.pdf", "/pdf/ok.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/pdf/gone.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    mount_pdf(&server, "/pdf/ok.pdf", 2, 300).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.total_units(), 2);
    assert_eq!(dir_listing(dir.path()), vec!["merged.pdf"]);
}

#[tokio::test]
async fn test_empty_and_invalid_bodies_fail_validation() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["/pdf/empty.pdf", "/pdf/login.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/pdf/empty.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdf/login.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.downloaded, 0);
    assert_eq!(report.total_units(), 0);
    assert!(dir_listing(dir.path()).is_empty());
}

#[tokio::test]
async fn test_merge_order_ignores_completion_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["/pdf/slow.pdf", "/pdf/fast.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/pdf/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf_bytes(1, 401))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_pdf(&server, "/pdf/fast.pdf", 2, 402).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.total_units(), 3);
    assert_eq!(
        page_widths(&report.outcome.output_path),
        vec![401, 402, 402]
    );
}

#[tokio::test]
async fn test_duplicate_document_links_download_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["node_2.html", "/pdf/A.pdf"]).await;
    mount_page(&server, "/html/node_2.html", &["/pdf/A.pdf", "/pdf/A.pdf#page=2"]).await;
    Mock::given(method("GET"))
        .and(path("/pdf/A.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_bytes(3, 300)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert_eq!(report.candidates, 1);
    assert_eq!(report.total_units(), 3);
}

/// Validates like PDF but refuses to merge
struct BrokenMerge;

impl DocumentFormat for BrokenMerge {
    fn extension(&self) -> &str {
        ".pdf"
    }

    fn count_units(&self, path: &Path) -> Result<usize, DocumentError> {
        PdfFormat.count_units(path)
    }

    fn merge(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), DocumentError> {
        Err(DocumentError::Malformed("refusing to merge".to_string()))
    }
}

#[tokio::test]
async fn test_failed_merge_keeps_staged_files() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["/pdf/X.pdf", "/pdf/Y.pdf"]).await;
    mount_pdf(&server, "/pdf/X.pdf", 1, 300).await;
    mount_pdf(&server, "/pdf/Y.pdf", 1, 300).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::with_format(&create_test_config(), Arc::new(BrokenMerge)).unwrap();

    let report = pipeline
        .run(&seed(&server), dir.path(), Some("merged.pdf"))
        .await
        .unwrap();

    assert!(!report.outcome.success);
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.total_units(), 0);
    assert_eq!(
        dir_listing(dir.path()),
        vec!["merged_0000_X.pdf", "merged_0001_Y.pdf"]
    );
}

#[tokio::test]
async fn test_default_output_name_uses_host() {
    let server = MockServer::start().await;
    mount_page(&server, "/html/node_1.html", &["/pdf/A.pdf"]).await;
    mount_pdf(&server, "/pdf/A.pdf", 1, 300).await;

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&create_test_config()).unwrap();

    let report = pipeline.run(&seed(&server), dir.path(), None).await.unwrap();

    assert!(report.outcome.success);
    assert_eq!(dir_listing(dir.path()), vec!["127_0_0_1_merged.pdf"]);
}

#[tokio::test]
async fn test_later_run_keeps_files_of_failed_merge() {
    let server = MockServer::start().await;
    mount_page(&server, "/day1/node_1.html", &["/pdf/A01.pdf"]).await;
    mount_pdf(&server, "/pdf/A01.pdf", 1, 300).await;
    mount_page(&server, "/day2/node_1.html", &["/day2/A01.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/day2/A01.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/day3/node_1.html", &["/day3/A01.pdf"]).await;
    mount_pdf(&server, "/day3/A01.pdf", 2, 500).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config();
    let day = |n: u32| Url::parse(&format!("{}/day{}/node_1.html", server.uri(), n)).unwrap();

    let broken = Pipeline::with_format(&config, Arc::new(BrokenMerge)).unwrap();
    let first = broken.run(&day(1), dir.path(), Some("day1.pdf")).await.unwrap();
    assert!(!first.outcome.success);
    assert_eq!(dir_listing(dir.path()), vec!["day1_0000_A01.pdf"]);

    let pipeline = Pipeline::new(&config).unwrap();
    let second = pipeline.run(&day(2), dir.path(), Some("day2.pdf")).await.unwrap();
    assert_eq!(second.total_units(), 0);

    let third = pipeline.run(&day(3), dir.path(), Some("day3.pdf")).await.unwrap();
    assert_eq!(third.total_units(), 2);

    assert_eq!(dir_listing(dir.path()), vec!["day1_0000_A01.pdf", "day3.pdf"]);
    assert_eq!(page_widths(&dir.path().join("day1_0000_A01.pdf")), vec![300]);
}

#[tokio::test]
async fn test_run_sites_stops_at_page_limit() {
    let server = MockServer::start().await;

    // 2024-01-01 is not mounted: the seed 404s and the site moves on
    mount_page(&server, "/a/2024-01/02/node_1.html", &["/pdf/a2.pdf"]).await;
    mount_pdf(&server, "/pdf/a2.pdf", 2, 300).await;
    mount_page(&server, "/a/2024-01/03/node_1.html", &["/pdf/a3.pdf"]).await;
    mount_pdf(&server, "/pdf/a3.pdf", 2, 300).await;
    Mock::given(method("GET"))
        .and(path("/a/2024-01/04/node_1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(&["/pdf/a4.pdf"])))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        output: OutputConfig {
            page_limit: 4,
            ..OutputConfig::default()
        },
        sites: vec![
            SiteEntry {
                name: "Site A".to_string(),
                url: format!("{}/a/2023-12/31/node_1.html", server.uri()),
            },
            SiteEntry {
                name: "Undated".to_string(),
                url: format!("{}/static/node_1.html", server.uri()),
            },
        ],
        ..create_test_config()
    };

    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&config).unwrap();
    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

    let summaries = run_sites(&pipeline, &config, from, to, dir.path())
        .await
        .unwrap();

    assert_eq!(summaries.len(), 2);

    let site = &summaries[0];
    assert_eq!(site.name, "Site A");
    assert!(site.skipped.is_none());
    assert_eq!(site.runs, 3);
    assert_eq!(site.total_units, 4);
    assert!(site.limit_reached);
    assert_eq!(
        site.outputs,
        vec![
            dir.path().join("Site_A_2024-01-02.pdf"),
            dir.path().join("Site_A_2024-01-03.pdf"),
        ]
    );

    let undated = &summaries[1];
    assert_eq!(undated.name, "Undated");
    assert!(undated.skipped.is_some());
    assert_eq!(undated.runs, 0);
    assert!(undated.outputs.is_empty());

    assert_eq!(
        dir_listing(dir.path()),
        vec!["Site_A_2024-01-02.pdf", "Site_A_2024-01-03.pdf"]
    );
}
